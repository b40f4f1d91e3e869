pub mod writer;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::{path::Path, time::Duration, time::Instant};
use tracing::{debug, error, info};

pub use writer::{ChildRows, MultiStepWriter, WriteOutcome};

/// Shared handle to the registry database.
pub type DbPool = DatabaseConnection;

/// Pool settings for the registry database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(8),
            idle_timeout: Duration::from_secs(300),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl DbConfig {
    /// Single-connection pool over a SQLite file, created when missing.
    pub fn sqlite_file(path: &Path) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        }
    }

    fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Opens the pool. The maximum is raised to the minimum when configured
/// below it.
pub async fn connect(config: &DbConfig) -> Result<DbPool, ServiceError> {
    let max_connections = config.max_connections.max(config.min_connections);
    if config.is_sqlite() && max_connections > 1 {
        debug!(max_connections, "SQLite pool with several connections");
    }

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    let db_pool = Database::connect(opt).await.map_err(|e| {
        error!("Could not open the registry database: {}", e);
        ServiceError::DatabaseError(e)
    })?;

    info!(backend = ?db_pool.get_database_backend(), max_connections, "Registry database connected");
    Ok(db_pool)
}

/// Opens the pool with the pool settings from `cfg`.
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    connect(&DbConfig::from(cfg)).await
}

/// Brings the schema up to date.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    let start = Instant::now();
    let pending = crate::migrator::Migrator::get_pending_migrations(pool)
        .await
        .map_err(ServiceError::DatabaseError)?
        .len();
    if pending == 0 {
        debug!("Schema already up to date");
        return Ok(());
    }

    info!(pending, "Applying schema migrations");
    crate::migrator::Migrator::up(pool, None).await.map_err(|e| {
        error!("Schema migration failed after {:?}: {}", start.elapsed(), e);
        ServiceError::DatabaseError(e)
    })?;
    info!(pending, elapsed = ?start.elapsed(), "Schema migrations applied");
    Ok(())
}

/// Round-trips a ping; used by the health probe.
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    pool.ping().await.map_err(|e| {
        error!("Database ping failed: {}", e);
        ServiceError::DatabaseError(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let db = connect(&DbConfig::sqlite_file(&dir.path().join("m.db")))
            .await
            .unwrap();
        run_migrations(&db).await.unwrap();
        run_migrations(&db).await.unwrap();
        assert!(check_connection(&db).await.is_ok());
    }

    #[test]
    fn pool_settings_follow_app_config() {
        let mut cfg = AppConfig::new(
            "postgres://localhost/sgq".into(),
            "a9Xk2mQ7vR4tL8wZ3nB6cJ1hF5gD0sPe".into(),
            3600,
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );
        cfg.db_max_connections = 7;
        cfg.db_acquire_timeout_secs = 3;
        let db = DbConfig::from(&cfg);
        assert_eq!(db.max_connections, 7);
        assert_eq!(db.acquire_timeout, Duration::from_secs(3));
        assert!(!db.is_sqlite());
    }
}
