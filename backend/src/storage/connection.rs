use anyhow::Result;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

// The database URL for the production catalog
const DATABASE_URL: &str = "sqlite:library.db";

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Cascade deletes depend on foreign-key enforcement, which SQLite
        // applies per connection rather than per database.
        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Create books table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                isbn TEXT NOT NULL UNIQUE,
                total_copies INTEGER NOT NULL CHECK (total_copies >= 0),
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for ordering books by title
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_books_title
            ON books(title);
            "#,
        )
        .execute(pool)
        .await?;

        // Create members table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                phone TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for ordering members by name
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_members_name
            ON members(name);
            "#,
        )
        .execute(pool)
        .await?;

        // Create loans table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS loans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                member_id INTEGER NOT NULL,
                book_id INTEGER NOT NULL,
                borrowed_at TEXT NOT NULL,
                due_date TEXT NOT NULL,
                returned_at TEXT,
                FOREIGN KEY (member_id) REFERENCES members (id) ON DELETE CASCADE,
                FOREIGN KEY (book_id) REFERENCES books (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for counting a book's active loans
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_loans_book_id
            ON loans(book_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for member history lookups
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_loans_member_id
            ON loans(member_id);
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for the overdue scan
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_loans_due_date
            ON loans(due_date);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
