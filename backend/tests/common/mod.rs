use library_tracker_backend::{AppState, DbConnection};

/// Build an AppState over a fresh in-memory database unique to this call.
///
/// Every test gets its own database, so tests can run in parallel without
/// seeing each other's rows.
pub async fn create_test_state() -> AppState {
    // Install a subscriber once so test runs surface service logs when
    // RUST_LOG asks for them
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let db_url = format!(
        "file:memdb_{}?mode=memory&cache=shared",
        uuid::Uuid::new_v4()
    );
    let db = DbConnection::new(&db_url)
        .await
        .expect("Failed to create test database");

    AppState::new(db)
}
