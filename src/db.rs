//! Database bootstrapping: pool creation and embedded migrations.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;

/// Connection pool shared with handlers as `web::Data<DbPool>`.
pub type DbPool = SqlitePool;

/// Opens a pool for `database_url` and brings the schema up to date.
///
/// An in-memory database lives only as long as its connection, so `:memory:` URLs get a
/// single connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<DbPool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options.connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::debug!("database ready at {}", database_url);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_connect_runs_migrations() {
        let pool = connect("sqlite::memory:").await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();

        assert!(names.contains(&"users"));
        assert!(names.contains(&"tasks"));
        assert!(names.contains(&"task_shared_with"));
    }
}
