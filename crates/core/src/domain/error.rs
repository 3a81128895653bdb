// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("queue name cannot be empty")]
    EmptyName,

    #[error("queue name too long: {len} bytes (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("queue name contains invalid character {0:?} (allowed: alphanumeric, '_', '-', '.', ':')")]
    InvalidCharacter(char),
}

pub type Result<T> = std::result::Result<T, DomainError>;
