//! Error taxonomy for the catalog's operation surface.
//!
//! Every message is written so a presentation layer can show it to a
//! person without rewording.

use sqlx::error::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// A required field was blank or a value was out of range
    #[error("{0}")]
    Validation(String),

    /// A UNIQUE constraint (book isbn, member email) rejected the write
    #[error("{0}")]
    DuplicateKey(String),

    /// The book has no copies left to lend
    #[error("No copies of book {0} are available")]
    NoCopiesAvailable(i64),

    /// The entity addressed by the operation does not exist
    #[error("{0}")]
    NotFound(String),

    /// Anything else the store reports
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

/// Result type used throughout the domain layer
pub type Result<T> = std::result::Result<T, LibraryError>;

impl From<sqlx::Error> for LibraryError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return LibraryError::DuplicateKey(db_err.message().to_string());
                }
                ErrorKind::ForeignKeyViolation => {
                    return LibraryError::NotFound(
                        "loan references a member or book that does not exist".to_string(),
                    );
                }
                _ => {}
            }
        }
        LibraryError::Database(err)
    }
}
