use chrono::{DateTime, Utc};
use shared::Book;
use sqlx::Row;

use crate::domain::errors::Result;
use crate::storage::connection::DbConnection;

/// Repository for catalog operations
#[derive(Clone)]
pub struct BookRepository {
    db: DbConnection,
}

impl BookRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a new book, returning its assigned id
    pub async fn store_book(
        &self,
        title: &str,
        author: &str,
        isbn: &str,
        total_copies: i64,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn, total_copies, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(total_copies)
        .bind(created_at)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get a book by id
    pub async fn get_book(&self, book_id: i64) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, isbn, total_copies, created_at
            FROM books
            WHERE id = ?
            "#,
        )
        .bind(book_id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => Ok(Some(Book {
                id: r.get("id"),
                title: r.get("title"),
                author: r.get("author"),
                isbn: r.get("isbn"),
                total_copies: r.get("total_copies"),
                created_at: r.get("created_at"),
            })),
            None => Ok(None),
        }
    }

    /// List all books ordered by title, case-insensitively
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, isbn, total_copies, created_at
            FROM books
            ORDER BY title COLLATE NOCASE ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let books = rows
            .iter()
            .map(|row| Book {
                id: row.get("id"),
                title: row.get("title"),
                author: row.get("author"),
                isbn: row.get("isbn"),
                total_copies: row.get("total_copies"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(books)
    }

    /// Update a book's fields in place
    pub async fn update_book(&self, book: &Book) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE books
            SET title = ?, author = ?, isbn = ?, total_copies = ?
            WHERE id = ?
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.total_copies)
        .bind(book.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete a book; its loans go with it via ON DELETE CASCADE
    pub async fn delete_book(&self, book_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM books WHERE id = ?
            "#,
        )
        .bind(book_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
