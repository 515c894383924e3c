//! Session tokens and credential verification.
//!
//! Login exchanges an email/password pair for an HS256 session token; the
//! auth middleware validates bearer tokens and attaches an [`Auth`] context
//! to the request. Passwords are stored as SHA-256 digests and compared in
//! constant time, as is the administrative secret.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use time::{Duration, OffsetDateTime};

use crate::errors::auth_error::AuthError;

/// Session token lifetime.
const TOKEN_TTL: Duration = Duration::hours(24);

/// Authenticated caller context, inserted into request extensions by the
/// auth middleware.
#[derive(Debug, Clone)]
pub struct Auth {
    pub user_id: String,
    pub email: String,
}

/// JWT claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
}

/// Hex-encoded SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Constant-time password check against a stored digest.
pub fn verify_password(password: &str, stored_digest: &str) -> bool {
    let candidate = hash_password(password);
    constant_time_eq(&candidate, stored_digest)
}

/// Constant-time string comparison for secrets.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    // ct_eq on unequal lengths short-circuits, but length is not secret here
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Issue a session token for a user.
pub fn issue_token(secret: &str, user_id: &str, email: &str) -> Result<String, AuthError> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (now + TOKEN_TTL).unix_timestamp(),
        iat: now.unix_timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenCreation(e.to_string()))
}

/// Validate a session token and recover the caller context.
pub fn verify_token(secret: &str, token: &str) -> Result<Auth, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;
    Ok(Auth {
        user_id: data.claims.sub,
        email: data.claims.email,
    })
}
