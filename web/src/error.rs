use thiserror::Error;

use crate::utils::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Failures surfaced by an auth service. The `Display` text is what the
/// session manager hands back to the user.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Login failed. Check your username and password.")]
    InvalidCredentials,

    #[error("The username '{0}' is already taken.")]
    UsernameTaken(String),

    #[error("No account matches the information you entered.")]
    AccountNotFound,

    #[error("The verification code does not match.")]
    InvalidVerificationCode,

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Could not secure the password: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Failed to read facility dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse facility dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid facility dataset: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}
