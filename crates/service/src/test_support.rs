#![cfg(test)]
use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;

/// Fresh in-memory database with migrations applied; each call is isolated.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// On-disk SQLite file that several pools can open at once, standing in for
/// separate processes sharing one database. The files go when it drops.
pub struct SharedSqlite {
    path: std::path::PathBuf,
}

impl SharedSqlite {
    /// Create the file and apply migrations once.
    pub async fn create() -> Result<Self, anyhow::Error> {
        let path = std::env::temp_dir().join(format!("canarie-test-{}.db", uuid::Uuid::new_v4()));
        let shared = Self { path };
        let db = shared.connect().await?;
        migration::Migrator::up(&db, None).await?;
        db.close().await?;
        Ok(shared)
    }

    /// A new, independent pool on the shared file.
    pub async fn connect(&self) -> Result<DatabaseConnection, anyhow::Error> {
        let url = format!("sqlite://{}?mode=rwc", self.path.display());
        let cfg = DatabaseConfig { url, ..DatabaseConfig::default() };
        connect_with_config(&cfg).await
    }
}

impl Drop for SharedSqlite {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}
