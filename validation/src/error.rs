use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown error code: {0}")]
    UnknownCode(u16),

    #[error("Unknown error name: {0}")]
    UnknownName(String),
}
