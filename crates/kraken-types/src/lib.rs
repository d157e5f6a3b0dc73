//! Typed model layer for the Kraken REST API
//!
//! This crate provides the schema-driven request models used by `kraken-rest`.
//! It has minimal dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`FieldSchema`] - Declarative field: kind, location, alias, default, bounds
//! - [`ModelSchema`], [`Model`] - Ordered field table and its validated values
//! - [`Value`] - Raw input and canonical field value
//! - [`ModelError`] - Validation errors
//! - [`ApiError`], [`ApiErrorKind`] - Kraken error registry

pub mod error;
pub mod error_codes;
pub mod field;
pub mod model;
pub mod value;

// Re-export commonly used types
pub use error::*;
pub use error_codes::*;
pub use field::*;
pub use model::*;
pub use value::*;

// Re-export rust_decimal for users
pub use rust_decimal::Decimal;
