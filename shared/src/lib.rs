use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A title in the catalog, possibly with multiple physical copies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Unique across the catalog
    pub isbn: String,
    /// Physical copies owned by the library (never negative)
    pub total_copies: i64,
    /// When the book was added to the catalog (UTC)
    pub created_at: DateTime<Utc>,
}

/// A registered library member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    /// Unique across the roster
    pub email: String,
    /// Optional contact number; blank input is stored as None
    pub phone: Option<String>,
    /// When the member joined (UTC)
    pub created_at: DateTime<Utc>,
}

/// One copy of a book checked out by a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub member_id: i64,
    pub book_id: i64,
    /// When the copy left the library (UTC)
    pub borrowed_at: DateTime<Utc>,
    /// Calendar date the copy is expected back
    pub due_date: NaiveDate,
    /// Set exactly once when the copy comes back; None while out
    pub returned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i64,
}

/// Full replacement of a book's fields (creation date is preserved)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub total_copies: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Full replacement of a member's fields (creation date is preserved)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub member_id: i64,
    pub book_id: i64,
    /// Date the copy is expected back; accepted as given, even if already past
    pub due_date: NaiveDate,
}

impl Loan {
    /// A loan is active while the copy has not been returned
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }

    /// An active loan is overdue once its due date is strictly before `as_of`.
    /// A loan due today is not overdue, and a returned loan never is.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.is_active() && self.due_date < as_of
    }
}
