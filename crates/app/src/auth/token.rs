//! API token generation, parsing and hashing.
//!
//! Tokens look like `trl_<token uuid>_<64 hex chars>`. Only the SHA-256 digest of the full token
//! is persisted.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

/// API token prefix.
pub const API_TOKEN_PREFIX: &str = "trl";

/// Number of random bytes in a token secret.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,
}

/// Random token material, wiped on drop.
#[derive(Clone)]
pub struct ApiTokenSecret {
    bytes: [u8; API_TOKEN_SECRET_BYTES],
}

impl ApiTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; API_TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self { bytes }
    }

    fn to_hex(&self) -> String {
        self.bytes.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// A token split into its parts.
#[derive(Debug, Clone)]
pub struct ParsedApiToken {
    pub token_uuid: Uuid,
    pub secret: ApiTokenSecret,
}

#[must_use]
pub fn format_api_token(token_uuid: Uuid, secret: &ApiTokenSecret) -> String {
    format!(
        "{API_TOKEN_PREFIX}_{}_{}",
        token_uuid.simple(),
        secret.to_hex()
    )
}

/// Split a bearer token into its identifier and secret.
///
/// # Errors
///
/// Returns an [`ApiTokenError`] when the token is not in the expected shape.
pub fn parse_api_token(token: &str) -> Result<ParsedApiToken, ApiTokenError> {
    let mut parts = token.splitn(3, '_');

    let (Some(API_TOKEN_PREFIX), Some(uuid_segment), Some(secret_hex)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(ApiTokenError::InvalidFormat);
    };

    let token_uuid = Uuid::try_parse(uuid_segment).map_err(|_error| ApiTokenError::InvalidFormat)?;

    let secret = decode_secret_hex(secret_hex).ok_or(ApiTokenError::InvalidSecretEncoding)?;

    Ok(ParsedApiToken {
        token_uuid,
        secret: ApiTokenSecret::from_bytes(secret),
    })
}

/// Hex SHA-256 digest of a token, as stored in `api_tokens.token_hash`.
#[must_use]
pub fn hash_api_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn decode_secret_hex(secret_hex: &str) -> Option<[u8; API_TOKEN_SECRET_BYTES]> {
    if secret_hex.len() != API_TOKEN_SECRET_BYTES * 2 {
        return None;
    }

    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

    for (byte, pair) in secret.iter_mut().zip(secret_hex.as_bytes().chunks_exact(2)) {
        let pair = std::str::from_utf8(pair).ok()?;

        *byte = u8::from_str_radix(pair, 16).ok()?;
    }

    Some(secret)
}
