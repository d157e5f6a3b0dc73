//! Credentials and request signing for the Kraken REST API
//!
//! Private endpoints require two headers: `API-Key` and `API-Sign`, the
//! latter an HMAC-SHA512 over the endpoint path and a SHA-256 digest of the
//! nonce plus the form-encoded body.
//!
//! # Example
//!
//! ```no_run
//! use kraken_auth::Credentials;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load credentials from environment
//!     let creds = Credentials::from_env()?;
//!
//!     let nonce = Credentials::generate_nonce();
//!     let body = vec![("nonce".to_string(), nonce.clone())];
//!     let signature = creds.sign("/0/private/Balance", &nonce, &body)?;
//!     println!("API-Sign: {}", signature);
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;

pub use credentials::{decode_secret, encode_body, sign, Credentials};
pub use error::{AuthError, AuthResult};
