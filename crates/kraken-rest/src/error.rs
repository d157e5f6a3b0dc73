//! Error types for REST API operations

use kraken_auth::AuthError;
use kraken_types::{ApiError, ModelError};

/// A request type is missing a capability it must provide
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// `is_child` was not declared
    #[error("{0} does not declare whether it is a child request")]
    IsChildNotImplemented(&'static str),

    /// No HTTP method for a non-child request
    #[error("{0} does not declare a request method")]
    MethodNotImplemented(&'static str),

    /// No path for a non-child request
    #[error("{0} does not declare a path")]
    PathNotImplemented(&'static str),

    /// No canned response for mock mode
    #[error("{0} has no factory response")]
    FactoryResponseNotImplemented(&'static str),
}

/// Errors that can occur during REST API operations
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// Field validation failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Signing or credential error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The exchange reported an error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request type is incomplete
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Invalid argument passed to the pipeline
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failed without producing a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Non-success status with no exchange error list
    #[error("Request failed: {method} {path} returned {status}")]
    RequestFailed {
        method: String,
        path: String,
        status: u16,
        headers: Vec<(String, String)>,
        query: String,
        body: String,
        response: String,
    },
}

impl RestError {
    /// The classified exchange error, if this is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Check if this error indicates rate limiting
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_rate_limit())
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;
