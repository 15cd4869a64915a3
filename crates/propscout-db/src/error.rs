use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("listing not found: {0}")]
    NotFound(Uuid),

    #[error("store connection error: {0}")]
    Connection(String),
}

impl From<StoreError> for propscout_common::ScoutError {
    fn from(e: StoreError) -> Self {
        propscout_common::ScoutError::Store(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
