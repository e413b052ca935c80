use app_state::db_constants;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Creates a Postgres connection pool using the tuning from settings.
pub async fn get_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let constants = db_constants();
    PgPoolOptions::new()
        .max_connections(constants.max_connections)
        .min_connections(constants.min_connection)
        .max_lifetime(Duration::from_secs(constants.max_lifetime))
        .idle_timeout(Duration::from_secs(constants.idle_timeout))
        .acquire_timeout(Duration::from_secs(constants.acquire_timeout))
        .connect(database_url)
        .await
}
