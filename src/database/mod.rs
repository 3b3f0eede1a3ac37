use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxPostgresConnector};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let pool = Database::connect(options).await?;
    Ok(pool)
}

/// Another handle onto the same Postgres pool, one per service.
pub fn share_pool(pool: &DbPool) -> AppResult<DbPool> {
    match pool {
        DatabaseConnection::SqlxPostgresPoolConnection(_) => Ok(
            SqlxPostgresConnector::from_sqlx_postgres_pool(
                pool.get_postgres_connection_pool().clone(),
            ),
        ),
        _ => Err(AppError::ConfigError(
            "Only Postgres connections can be shared".to_string(),
        )),
    }
}

pub async fn run_migrations(pool: &DbPool) -> AppResult<()> {
    Migrator::up(pool, None).await?;
    Ok(())
}
