use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl DatabaseError {
    /// Whether the error is a UNIQUE constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Connection(sqlx::Error::Database(err)) => err.is_unique_violation(),
            _ => false,
        }
    }
}
