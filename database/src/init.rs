use crate::{Database, DatabaseError, Result};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Table definitions, applied in order
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "accounts",
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            profile_id TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            bio TEXT,
            avatar TEXT,
            banner TEXT,
            note TEXT,
            status INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "tokens",
        r#"
        CREATE TABLE IF NOT EXISTS tokens (
            account_id TEXT PRIMARY KEY REFERENCES accounts(id) ON DELETE CASCADE,
            token TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            attachment TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "friend_requests",
        r#"
        CREATE TABLE IF NOT EXISTS friend_requests (
            from_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            to_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            PRIMARY KEY (from_id, to_id)
        )
        "#,
    ),
    (
        "friendships",
        r#"
        CREATE TABLE IF NOT EXISTS friendships (
            account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            friend_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            PRIMARY KEY (account_id, friend_id)
        )
        "#,
    ),
    (
        "servers",
        r#"
        CREATE TABLE IF NOT EXISTS servers (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES accounts(id),
            name TEXT NOT NULL,
            description TEXT,
            icon TEXT,
            invite TEXT NOT NULL UNIQUE,
            invites_disabled INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "server_members",
        r#"
        CREATE TABLE IF NOT EXISTS server_members (
            server_id TEXT NOT NULL REFERENCES servers(id) ON DELETE CASCADE,
            account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            joined_at TEXT NOT NULL,
            PRIMARY KEY (server_id, account_id)
        )
        "#,
    ),
    (
        "channels",
        r#"
        CREATE TABLE IF NOT EXISTS channels (
            id TEXT PRIMARY KEY,
            server_id TEXT NOT NULL REFERENCES servers(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "messages",
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            server_id TEXT NOT NULL REFERENCES servers(id) ON DELETE CASCADE,
            channel_id TEXT NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
            author_id TEXT NOT NULL REFERENCES accounts(id),
            content TEXT NOT NULL,
            reply_id TEXT REFERENCES messages(id) ON DELETE SET NULL,
            edited INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "pinned_messages",
        r#"
        CREATE TABLE IF NOT EXISTS pinned_messages (
            message_id TEXT PRIMARY KEY REFERENCES messages(id) ON DELETE CASCADE,
            channel_id TEXT NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
            server_id TEXT NOT NULL REFERENCES servers(id) ON DELETE CASCADE,
            pinned_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "roles",
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            id TEXT PRIMARY KEY,
            server_id TEXT NOT NULL REFERENCES servers(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            hex_color TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "member_roles",
        r#"
        CREATE TABLE IF NOT EXISTS member_roles (
            role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            account_id TEXT NOT NULL,
            server_id TEXT NOT NULL,
            PRIMARY KEY (role_id, account_id),
            FOREIGN KEY (server_id, account_id)
                REFERENCES server_members(server_id, account_id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "reports",
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            report_name TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    ),
];

/// Database initialization configuration
pub struct DatabaseConfig {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Whether to create tables on initialization
    pub create_tables: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data").join("parley.db"),
            create_tables: true,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with default paths
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom database path
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }

    /// Set whether to create tables on initialization
    pub fn with_create_tables(mut self, create: bool) -> Self {
        self.create_tables = create;
        self
    }
}

/// Initialize the database with the given configuration
pub async fn initialize_database(config: DatabaseConfig) -> Result<Arc<Database>> {
    info!("Initializing database with configuration");

    // Convert path to string for database connection
    let db_path_str = config
        .database_path
        .to_str()
        .ok_or_else(|| DatabaseError::Other("Invalid database path".into()))?;

    let db = Database::new(db_path_str).await?;
    info!("Database connection established");

    if config.create_tables {
        db.migrate().await?;
    }

    Ok(Arc::new(db))
}

/// Create every table that does not exist yet
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations");

    for (table, sql) in MIGRATIONS {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| DatabaseError::Migration(format!("{}: {}", table, e)))?;
    }

    info!("Database migrations completed");
    Ok(())
}
