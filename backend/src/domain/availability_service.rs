//! Availability accounting for the catalog.
//!
//! Availability is never stored. It is derived on demand from a book's copy
//! count and the number of its loans still out, so it cannot drift from the
//! loan table.

use crate::domain::errors::Result;
use crate::storage::{BookRepository, DbConnection, LoanRepository};

/// Service responsible for deriving how many copies of a book can be lent
#[derive(Clone)]
pub struct AvailabilityService {
    book_repository: BookRepository,
    loan_repository: LoanRepository,
}

impl AvailabilityService {
    pub fn new(db: DbConnection) -> Self {
        let book_repository = BookRepository::new(db.clone());
        let loan_repository = LoanRepository::new(db);
        Self {
            book_repository,
            loan_repository,
        }
    }

    /// Copies of `book_id` still on the shelf: total copies minus active
    /// loans. An unknown book has nothing to lend, so it reports 0 rather
    /// than an error.
    pub async fn available_copies(&self, book_id: i64) -> Result<i64> {
        let book = match self.book_repository.get_book(book_id).await? {
            Some(book) => book,
            None => return Ok(0),
        };

        let active = self.loan_repository.count_active_loans(book_id).await?;

        // total_copies can drop below the active count when a book is
        // edited mid-loan; availability floors at zero instead of going
        // negative.
        Ok((book.total_copies - active).max(0))
    }
}
