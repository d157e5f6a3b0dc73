//! Signing and credential errors

/// Errors that can occur while loading credentials or signing a request
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Private key could not be decoded or used as an HMAC key
    #[error("Invalid private key: {0}")]
    InvalidCredentials(String),

    /// No secret key was supplied
    #[error("Missing secret key")]
    MissingSecret,

    /// Secret key length is not a multiple of 4
    #[error("Invalid secret key length {0}: must be a multiple of 4")]
    InvalidSecretLength(usize),

    #[error("Missing environment variable {0}")]
    EnvVarNotSet(String),

    /// Body could not be form-url-encoded
    #[error("Encode error: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
