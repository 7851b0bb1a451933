use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid nation code: {0:?}")]
    InvalidNationCode(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
