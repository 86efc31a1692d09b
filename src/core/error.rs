// Centralized error handling for the auth and work-data services

use thiserror::Error;

/// Errors surfaced to callers of the auth service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Username already exists.")]
    UsernameTaken,

    #[error("Could not generate a unique Google username.")]
    UsernameGenerationExhausted,
}

/// Storage-layer faults
///
/// These never reach callers of the services: reads recover with an empty
/// mapping and writes are logged and dropped.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Stored value under '{key}' is not valid JSON: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Quota exceeded writing '{key}': {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("Failed to persist store: {0}")]
    Io(String),

    #[error("Failed to serialize value: {0}")]
    Serialize(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid username or password."
        );
        assert_eq!(AuthError::UsernameTaken.to_string(), "Username already exists.");
        assert_eq!(
            AuthError::UsernameGenerationExhausted.to_string(),
            "Could not generate a unique Google username."
        );
    }

    #[test]
    fn test_quota_error_message() {
        let err = StoreError::QuotaExceeded {
            key: "users".to_string(),
            needed: 120,
            quota: 100,
        };
        assert_eq!(
            err.to_string(),
            "Quota exceeded writing 'users': 120 bytes needed, quota is 100"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
