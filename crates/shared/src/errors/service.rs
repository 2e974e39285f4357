use crate::errors::repository::RepositoryError;
use rdkafka::error::KafkaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepositoryError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidBatch(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Kafka error: {0}")]
    Kafka(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<KafkaError> for ServiceError {
    fn from(error: KafkaError) -> Self {
        ServiceError::Kafka(error.to_string())
    }
}
