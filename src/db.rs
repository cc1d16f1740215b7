use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// connect
///
/// Opens the SQLite pool for `db_url`, creating the database file if it does not
/// exist, and applies the embedded migrations. Every migration statement is
/// `CREATE ... IF NOT EXISTS`, so calling this against an existing database is a no-op
/// apart from opening the pool.
///
/// Connections run in WAL mode with foreign keys enforced and wait up to 30 s on a
/// locked database before failing.
pub async fn connect(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    // Each connection to `:memory:` is its own database.
    let max_connections = if db_url.contains(":memory:") {
        1
    } else {
        MAX_CONNECTIONS
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    tracing::debug!("database ready, migrations applied");

    Ok(pool)
}
