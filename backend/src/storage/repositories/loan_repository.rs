use chrono::{DateTime, NaiveDate, Utc};
use shared::Loan;
use sqlx::Row;

use crate::domain::errors::Result;
use crate::storage::connection::DbConnection;

/// Repository for loan operations
#[derive(Clone)]
pub struct LoanRepository {
    db: DbConnection,
}

impl LoanRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a new loan, returning its assigned id
    pub async fn store_loan(
        &self,
        member_id: i64,
        book_id: i64,
        borrowed_at: DateTime<Utc>,
        due_date: NaiveDate,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO loans (member_id, book_id, borrowed_at, due_date, returned_at)
            VALUES (?, ?, ?, ?, NULL)
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .bind(borrowed_at)
        .bind(due_date)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Count a book's active loans
    pub async fn count_active_loans(&self, book_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM loans
            WHERE book_id = ? AND returned_at IS NULL
            "#,
        )
        .bind(book_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(row.get("count"))
    }

    /// Mark a loan returned, guarding against a second return overwriting
    /// the first. Returns whether a row actually changed.
    pub async fn close_loan(&self, loan_id: i64, returned_at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET returned_at = ?
            WHERE id = ? AND returned_at IS NULL
            "#,
        )
        .bind(returned_at)
        .bind(loan_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List loans, most recent borrowing first, optionally only active ones
    pub async fn list_loans(&self, active_only: bool) -> Result<Vec<Loan>> {
        let query = if active_only {
            sqlx::query(
                r#"
                SELECT id, member_id, book_id, borrowed_at, due_date, returned_at
                FROM loans
                WHERE returned_at IS NULL
                ORDER BY borrowed_at DESC
                "#,
            )
        } else {
            sqlx::query(
                r#"
                SELECT id, member_id, book_id, borrowed_at, due_date, returned_at
                FROM loans
                ORDER BY borrowed_at DESC
                "#,
            )
        };

        let rows = query.fetch_all(self.db.pool()).await?;

        let loans = rows
            .iter()
            .map(|row| Loan {
                id: row.get("id"),
                member_id: row.get("member_id"),
                book_id: row.get("book_id"),
                borrowed_at: row.get("borrowed_at"),
                due_date: row.get("due_date"),
                returned_at: row.get("returned_at"),
            })
            .collect();

        Ok(loans)
    }

    /// List active loans due strictly before `as_of`, soonest due first
    pub async fn list_overdue(&self, as_of: NaiveDate) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, member_id, book_id, borrowed_at, due_date, returned_at
            FROM loans
            WHERE returned_at IS NULL AND due_date < ?
            ORDER BY due_date ASC
            "#,
        )
        .bind(as_of)
        .fetch_all(self.db.pool())
        .await?;

        let loans = rows
            .iter()
            .map(|row| Loan {
                id: row.get("id"),
                member_id: row.get("member_id"),
                book_id: row.get("book_id"),
                borrowed_at: row.get("borrowed_at"),
                due_date: row.get("due_date"),
                returned_at: row.get("returned_at"),
            })
            .collect();

        Ok(loans)
    }
}
