//! # Library Tracker Backend
//!
//! Core of the library-catalog manager: a catalog of books, a roster of
//! members, and the loans connecting them, persisted in SQLite.
//!
//! Availability and overdue status are never stored; both are derived from
//! loan rows at read time. The only mutation a loan ever sees after
//! creation is its return.
//!
//! ## Architecture
//!
//! The crate is consumed in-process by whatever presentation layer embeds
//! it, following a layered design:
//!
//! ```text
//! Presentation Layer (embedding application)
//!     ↓
//! Domain Layer (services, validation, error taxonomy)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize the database and assemble the service set
//! - Enforce catalog and roster integrity: unique ISBNs and emails,
//!   non-negative copy counts, loans always tied to a member and a book
//! - Keep availability accounting consistent with the loan table

pub mod domain;
pub mod storage;

use tracing::info;

pub use domain::*;
pub use storage::*;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub book_service: BookService,
    pub member_service: MemberService,
    pub availability_service: AvailabilityService,
    pub loan_service: LoanService,
}

impl AppState {
    /// Assemble the service set over an already-open database.
    ///
    /// Useful for tests and embedders that manage their own database
    /// location; all services share the given connection pool.
    pub fn new(db: DbConnection) -> Self {
        Self {
            book_service: BookService::new(db.clone()),
            member_service: MemberService::new(db.clone()),
            availability_service: AvailabilityService::new(db.clone()),
            loan_service: LoanService::new(db),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend() -> anyhow::Result<AppState> {
    info!("Setting up database");
    let db_conn = DbConnection::init().await?;

    info!("Setting up application state");
    Ok(AppState::new(db_conn))
}
