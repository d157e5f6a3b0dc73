//! Request signing and API credentials
//!
//! A private call carries `API-Key` and `API-Sign`. The signature is
//! `base64(HMAC-SHA512(secret, path || SHA256(nonce || form_body)))`, with
//! the secret base64-decoded first.
//!
//! The decoded secret lives in a [`SecretBox`], so it is wiped on drop and
//! never shows up in `Debug` output.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretBox};
use sha2::{Digest, Sha256, Sha512};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::error::{AuthError, AuthResult};

const API_KEY_VAR: &str = "KRAKEN_API_KEY";
const PRIVATE_KEY_VAR: &str = "KRAKEN_PRIVATE_KEY";

/// Suffix source keeping nonces distinct within one millisecond
static NONCE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Form-url-encode body fields in insertion order
///
/// Spaces become `+`, matching the exchange's form encoding.
pub fn encode_body(body: &[(String, String)]) -> AuthResult<String> {
    Ok(serde_urlencoded::to_string(body)?)
}

/// Decode a base64 secret, padding with `=` up to a multiple of 4
pub fn decode_secret(secret: &str) -> AuthResult<Vec<u8>> {
    let missing = (4 - secret.len() % 4) % 4;
    let padded = format!("{}{}", secret, "=".repeat(missing));
    BASE64
        .decode(padded)
        .map_err(|e| AuthError::InvalidCredentials(format!("secret is not base64: {}", e)))
}

/// Sign a request with a base64 secret key
///
/// The secret must be present and its length a multiple of 4; this is
/// checked before any decoding is attempted.
///
/// # Example
///
/// ```
/// let signature = kraken_auth::sign(Some("bm9uY2U="), "/0/private/Balance", "1", &[]).unwrap();
/// assert_eq!(
///     signature,
///     "+L0q5BsWLUkUoH2ELC5Tr4YF4oqHS5YmXOwzYy8RjySOWC10TyHDHCTBugPWBWXV+mw3hrG+7kXYUkbBF4vXOQ=="
/// );
/// ```
pub fn sign(
    secret: Option<&str>,
    path: &str,
    nonce: &str,
    body: &[(String, String)],
) -> AuthResult<String> {
    let secret = secret.ok_or(AuthError::MissingSecret)?;
    if secret.len() % 4 != 0 {
        return Err(AuthError::InvalidSecretLength(secret.len()));
    }

    debug!(path, nonce, "Signing request");
    let key = decode_secret(secret)?;
    signature(&key, path, nonce, &encode_body(body)?)
}

fn signature(key: &[u8], path: &str, nonce: &str, encoded_body: &str) -> AuthResult<String> {
    let digest = Sha256::new()
        .chain_update(nonce)
        .chain_update(encoded_body)
        .finalize();

    let mac = <Hmac<Sha512> as Mac>::new_from_slice(key)
        .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?
        .chain_update(path.as_bytes())
        .chain_update(digest)
        .finalize();

    Ok(BASE64.encode(mac.into_bytes()))
}

/// Key pair for private endpoints
///
/// # Example
///
/// ```
/// use kraken_auth::Credentials;
///
/// let creds = Credentials::new("my-key", "bm9uY2U=").unwrap();
/// let api_sign = creds.sign("/0/private/Balance", "1", &[]).unwrap();
/// assert!(!api_sign.is_empty());
/// ```
pub struct Credentials {
    api_key: String,
    secret: SecretBox<Vec<u8>>,
}

impl Credentials {
    /// Build from an API key and its base64 private key
    pub fn new(api_key: impl Into<String>, private_key: impl AsRef<str>) -> AuthResult<Self> {
        let secret = decode_secret(private_key.as_ref())?;
        Ok(Self {
            api_key: api_key.into(),
            secret: SecretBox::new(Box::new(secret)),
        })
    }

    /// Read `KRAKEN_API_KEY` and `KRAKEN_PRIVATE_KEY`
    pub fn from_env() -> AuthResult<Self> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| AuthError::EnvVarNotSet(name.to_string()))
        };
        Self::new(read(API_KEY_VAR)?, read(PRIVATE_KEY_VAR)?)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Fresh, increasing nonce: epoch milliseconds followed by a 6-digit sequence
    pub fn generate_nonce() -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let seq = NONCE_SEQ.fetch_add(1, Ordering::Relaxed) % 1_000_000;
        format!("{}{:06}", millis, seq)
    }

    /// `API-Sign` value for form body fields sent to `path`
    pub fn sign(&self, path: &str, nonce: &str, body: &[(String, String)]) -> AuthResult<String> {
        signature(self.secret.expose_secret(), path, nonce, &encode_body(body)?)
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        let secret = self.secret.expose_secret().to_vec();
        Self {
            api_key: self.api_key.clone(),
            secret: SecretBox::new(Box::new(secret)),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.api_key.chars().take(8).collect();
        f.debug_struct("Credentials")
            .field("api_key", &format!("{}...", prefix))
            .field("secret", &"<redacted>")
            .finish()
    }
}
