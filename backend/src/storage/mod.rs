//! # Storage Module
//!
//! Handles all persistence for the library catalog.
//!
//! The catalog lives in a single SQLite database reached through a shared
//! connection pool. Repositories translate between rows and the shared
//! entity types; nothing above this module writes SQL.
//!
//! ## Key Responsibilities
//!
//! - **Connection Management**: Opening the database, creating it on first
//!   run, and preparing the schema
//! - **Row Mapping**: Converting between SQLite rows and the shared entities
//! - **Integrity Enforcement**: UNIQUE keys, the copy-count CHECK, and
//!   cascade deletes are declared here and enforced by SQLite itself
//!
//! ## Current Implementation
//!
//! - **Primary Storage**: SQLite with SQLx's async pool
//! - **Derived Values**: Availability and overdue status are computed from
//!   loan rows at read time and never stored
//!
//! ## Design Principles
//!
//! - **Repository Pattern**: One repository per table, no cross-table joins
//! - **Thin Layer**: Repositories hold no business rules; validation and
//!   orchestration live in the domain services

pub mod connection;
pub mod repositories;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::{BookRepository, LoanRepository, MemberRepository};
