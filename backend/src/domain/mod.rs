//! # Domain Module
//!
//! Contains all business logic for the library catalog.
//!
//! This module encapsulates the rules that make the catalog trustworthy:
//! what a valid book or member looks like, when a copy may leave the
//! building, and how availability and overdue status are derived. It knows
//! nothing about any UI and reaches storage only through repositories.
//!
//! ## Module Organization
//!
//! - **book_service**: Catalog CRUD and book validation
//! - **member_service**: Roster CRUD and member validation
//! - **availability_service**: Derives how many copies of a book can be lent
//! - **loan_service**: Borrowing, returning, and overdue reporting
//! - **errors**: The error taxonomy shared by every operation
//!
//! ## Business Rules
//!
//! - A book's ISBN and a member's email are unique
//! - Text fields are trimmed before storage; required ones must be non-blank
//! - A book with N copies can have at most N loans out at once
//! - Availability is `total_copies - active_loans`, floored at zero
//! - A loan is overdue once its due date is strictly before the reference
//!   date; returning it clears the condition
//! - `returned_at` is written exactly once; later returns change nothing
//! - Deleting a book or member deletes their loans with them
//!
//! ## Design Principles
//!
//! - **Derived, Not Stored**: Availability and overdue status are computed
//!   from loan rows on every read
//! - **Validation at the Boundary**: Services validate before anything
//!   touches storage
//! - **Typed Failures**: Every rejected operation names its reason through
//!   [`LibraryError`]

pub mod availability_service;
pub mod book_service;
pub mod errors;
pub mod loan_service;
pub mod member_service;

pub use availability_service::*;
pub use book_service::*;
pub use errors::*;
pub use loan_service::*;
pub use member_service::*;
