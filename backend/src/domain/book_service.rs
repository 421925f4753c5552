use chrono::Utc;
use tracing::{info, warn};

use crate::domain::errors::{LibraryError, Result};
use crate::storage::{BookRepository, DbConnection};
use shared::{AddBookRequest, Book, UpdateBookRequest};

/// Service for managing the book catalog
#[derive(Clone)]
pub struct BookService {
    book_repository: BookRepository,
}

impl BookService {
    /// Create a new BookService
    pub fn new(db: DbConnection) -> Self {
        let book_repository = BookRepository::new(db);
        Self { book_repository }
    }

    /// Add a book to the catalog
    pub async fn add_book(&self, request: AddBookRequest) -> Result<Book> {
        info!("Adding book: title={}, isbn={}", request.title, request.isbn);

        self.validate_book_fields(
            &request.title,
            &request.author,
            &request.isbn,
            request.total_copies,
        )?;

        let created_at = Utc::now();
        let id = self
            .book_repository
            .store_book(
                request.title.trim(),
                request.author.trim(),
                request.isbn.trim(),
                request.total_copies,
                created_at,
            )
            .await?;

        let book = Book {
            id,
            title: request.title.trim().to_string(),
            author: request.author.trim().to_string(),
            isbn: request.isbn.trim().to_string(),
            total_copies: request.total_copies,
            created_at,
        };

        info!("Added book: {} with id: {}", book.title, book.id);

        Ok(book)
    }

    /// Get a book by id
    pub async fn get_book(&self, book_id: i64) -> Result<Option<Book>> {
        info!("Getting book: {}", book_id);

        let book = self.book_repository.get_book(book_id).await?;

        if book.is_none() {
            warn!("Book not found: {}", book_id);
        }

        Ok(book)
    }

    /// List all books, ordered by title case-insensitively
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        info!("Listing all books");

        let books = self.book_repository.list_books().await?;

        info!("Found {} books", books.len());

        Ok(books)
    }

    /// Update an existing book; the creation date is preserved
    pub async fn update_book(&self, book_id: i64, request: UpdateBookRequest) -> Result<Book> {
        info!("Updating book: {}", book_id);

        // Get the existing book
        let existing = self
            .book_repository
            .get_book(book_id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(format!("Book not found: {}", book_id)))?;

        self.validate_book_fields(
            &request.title,
            &request.author,
            &request.isbn,
            request.total_copies,
        )?;

        let book = Book {
            id: existing.id,
            title: request.title.trim().to_string(),
            author: request.author.trim().to_string(),
            isbn: request.isbn.trim().to_string(),
            total_copies: request.total_copies,
            created_at: existing.created_at,
        };

        self.book_repository.update_book(&book).await?;

        info!("Updated book: {} with id: {}", book.title, book.id);

        Ok(book)
    }

    /// Delete a book; its loan history disappears with it
    pub async fn delete_book(&self, book_id: i64) -> Result<()> {
        info!("Deleting book: {}", book_id);

        // Verify the book exists
        let book = self
            .book_repository
            .get_book(book_id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(format!("Book not found: {}", book_id)))?;

        self.book_repository.delete_book(book_id).await?;

        info!("Deleted book: {} with id: {}", book.title, book.id);

        Ok(())
    }

    /// Validate book fields shared by add and update
    fn validate_book_fields(
        &self,
        title: &str,
        author: &str,
        isbn: &str,
        total_copies: i64,
    ) -> Result<()> {
        if title.trim().is_empty() {
            warn!("Rejected book: empty title");
            return Err(LibraryError::Validation(
                "Book title cannot be empty".to_string(),
            ));
        }

        if author.trim().is_empty() {
            warn!("Rejected book: empty author");
            return Err(LibraryError::Validation(
                "Book author cannot be empty".to_string(),
            ));
        }

        if isbn.trim().is_empty() {
            warn!("Rejected book: empty ISBN");
            return Err(LibraryError::Validation(
                "Book ISBN cannot be empty".to_string(),
            ));
        }

        if total_copies < 0 {
            warn!("Rejected book: negative copy count");
            return Err(LibraryError::Validation(
                "Total copies cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}
