use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

pub mod accounts;
pub mod channels;
pub mod error;
pub mod friends;
pub mod init;
pub mod messages;
pub mod models;
pub mod posts;
pub mod reports;
pub mod roles;
pub mod servers;

pub use error::{DatabaseError, Result};

pub use accounts::AccountStore;
pub use channels::ChannelStore;
pub use friends::FriendStore;
pub use messages::MessageStore;
pub use models::{
    Account, Channel, Message, NewAccount, NewMessage, Post, Report, Role, Server,
};
pub use posts::PostStore;
pub use reports::ReportStore;
pub use roles::RoleStore;
pub use servers::ServerStore;

// Re-export initialization functions for convenience
pub use init::{initialize_database, DatabaseConfig};

/// Database connection pool
#[derive(Debug)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if missing) the SQLite database at `database_path`
    pub async fn new(database_path: &str) -> Result<Self> {
        // Ensure the data directory exists
        if let Some(parent) = Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Connecting to database at: {}", database_path);

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        debug!("Database connection established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Create any missing tables
    pub async fn migrate(&self) -> Result<()> {
        init::run_migrations(&self.pool).await
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Check if a table exists
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let query = r#"
            SELECT COUNT(*) as count
            FROM sqlite_master
            WHERE type='table' AND name=?
        "#;

        let result: (i32,) = sqlx::query_as(query)
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }
}

/// Generate a new record id
pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// A migrated database in a temporary directory.
    ///
    /// The directory is removed when the returned guard drops.
    pub async fn setup_test_db() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        db.migrate().await.unwrap();

        (temp_dir, db)
    }

    /// Insert an account with predictable fields derived from `handle`
    pub async fn create_account(db: &Database, handle: &str) -> Account {
        AccountStore::new(db)
            .create(NewAccount {
                profile_id: handle.to_string(),
                username: format!("{} name", handle),
                email: format!("{}@example.com", handle),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
    }
}
