use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use thiserror::Error;

/// Failure reported back to a message-bus caller.
///
/// Every variant carries a stable, human readable message; [`RpcError::code`]
/// and [`RpcError::kind`] let the caller tell the failures apart without
/// parsing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0}")]
    StoreFailure(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl RpcError {
    pub fn code(&self) -> u16 {
        match self {
            RpcError::NotFound(_) => 404,
            RpcError::ValidationFailed(_)
            | RpcError::BadRequest(_)
            | RpcError::UnknownCommand(_) => 400,
            RpcError::Unavailable(_) => 503,
            RpcError::StoreFailure(_) | RpcError::Internal(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::NotFound(_) => "not_found",
            RpcError::ValidationFailed(_) => "validation_failed",
            RpcError::BadRequest(_) => "bad_request",
            RpcError::UnknownCommand(_) => "unknown_command",
            RpcError::StoreFailure(_) => "store_failure",
            RpcError::Unavailable(_) => "unavailable",
            RpcError::Internal(_) => "internal",
        }
    }
}

impl From<ServiceError> for RpcError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => RpcError::NotFound(msg),
            ServiceError::InvalidBatch(msg) => RpcError::ValidationFailed(msg),
            ServiceError::Validation(errors) => {
                RpcError::BadRequest(format!("Validation failed: {}", errors.join("; ")))
            }
            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => RpcError::NotFound("Product not found".into()),
                RepositoryError::Sqlx(_) => RpcError::StoreFailure("Database error".into()),
                RepositoryError::Custom(msg) => RpcError::Internal(msg),
            },
            ServiceError::Kafka(msg) => RpcError::Unavailable(format!("Kafka error: {msg}")),
            ServiceError::Internal(msg) => RpcError::Internal(msg),
        }
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::BadRequest(format!("Invalid payload: {err}"))
    }
}

impl From<RpcError> for ErrorResponse {
    fn from(err: RpcError) -> Self {
        ErrorResponse {
            code: err.code(),
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_service_message() {
        let err = RpcError::from(ServiceError::NotFound("Product not found".into()));

        assert_eq!(err.code(), 404);
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.to_string(), "Product not found");
    }

    #[test]
    fn repository_not_found_maps_to_product_not_found() {
        let err = RpcError::from(ServiceError::Repo(RepositoryError::NotFound));

        assert_eq!(err, RpcError::NotFound("Product not found".into()));
    }

    #[test]
    fn invalid_batch_is_distinct_from_bad_request() {
        let batch = RpcError::from(ServiceError::InvalidBatch(
            "One or more products are not available".into(),
        ));
        let payload = RpcError::from(ServiceError::Validation(vec![
            "limit: Limit must be a positive integer".into(),
        ]));

        assert_eq!(batch.code(), payload.code());
        assert_ne!(batch.kind(), payload.kind());
        assert_eq!(batch.kind(), "validation_failed");
        assert_eq!(
            payload.to_string(),
            "Validation failed: limit: Limit must be a positive integer"
        );
    }

    #[test]
    fn store_failure_hides_driver_details() {
        let err = RpcError::from(ServiceError::Repo(RepositoryError::Sqlx(
            sqlx::Error::PoolTimedOut,
        )));

        assert_eq!(err.code(), 500);
        assert_eq!(err.kind(), "store_failure");
        assert_eq!(err.to_string(), "Database error");
    }

    #[test]
    fn error_response_carries_code_and_kind() {
        let response = ErrorResponse::from(RpcError::UnknownCommand("drop_table".into()));

        assert_eq!(
            response,
            ErrorResponse {
                code: 400,
                kind: "unknown_command".into(),
                message: "Unknown command: drop_table".into(),
            }
        );
    }
}
