//! Error types for field validation and model construction

use thiserror::Error;

/// Errors raised while validating or populating a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A value failed a field's type, enum, range or required-ness check
    #[error("Invalid value {value} for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// The field is not declared on the model
    #[error("Unknown field {field} on {model}")]
    UnknownField { model: String, field: String },
}

impl ModelError {
    /// Create an invalid value error
    pub fn invalid(
        field: impl Into<String>,
        value: impl std::fmt::Debug,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: format!("{:?}", value),
            reason: reason.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            model: model.into(),
            field: field.into(),
        }
    }

    /// Name of the field this error refers to
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidValue { field, .. } | Self::UnknownField { field, .. } => field,
        }
    }
}

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
