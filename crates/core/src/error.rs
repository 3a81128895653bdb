// Central Error Type for the Broker

use thiserror::Error;

/// Application-level error type
///
/// Every broker operation returns either its success value or exactly one of
/// these kinds. Nothing in core retries or swallows them.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Queue already exists: {0}")]
    AlreadyExists(String),

    #[error("Queue not exists: {0}")]
    NotExists(String),

    #[error("Queue is empty: {0}")]
    Empty(String),

    #[error("No master queue holds a payload")]
    NoneFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid queue name: {0}")]
    InvalidName(#[from] crate::domain::DomainError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable kind label, used for log fields and RPC error data
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::AlreadyExists(_) => "already_exists",
            AppError::NotExists(_) => "not_exists",
            AppError::Empty(_) => "empty",
            AppError::NoneFound => "none_found",
            AppError::Storage(_) => "storage",
            AppError::InvalidName(_) => "invalid_name",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Storage(String)

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_domain_error_converts_to_invalid_name() {
        let err: AppError = DomainError::EmptyName.into();
        assert_eq!(err.kind(), "invalid_name");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_messages_carry_queue_name() {
        assert_eq!(
            AppError::NotExists("orders".to_string()).to_string(),
            "Queue not exists: orders"
        );
        assert_eq!(AppError::NoneFound.kind(), "none_found");
    }
}
