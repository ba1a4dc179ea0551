use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::CoreError;

pub type DbPool = SqlitePool;

/// Opens (creating if missing) the SQLite database at `path` and runs the
/// embedded migrations. Foreign keys are enabled so deleting an assignment
/// cascades to its task instances.
pub async fn establish_connection(path: &str) -> Result<DbPool, CoreError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
