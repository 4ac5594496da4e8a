//! Access and refresh tokens.
//!
//! Access tokens are short-lived HS256 JWTs issued by `pressdesk`. Refresh
//! tokens are opaque random strings; the server keeps only their SHA-256.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pressdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// `iss` claim written into and required from every access token.
pub const TOKEN_ISSUER: &str = "pressdesk";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub iss: String,
    /// Role names at issue time. Authorization never reads these; grants are
    /// loaded per request.
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Reads `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (default 15)
    /// and `JWT_REFRESH_EXPIRY_DAYS` (default 7).
    ///
    /// # Panics
    ///
    /// On a missing or blank secret, or a lifetime that is not a positive integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.trim().is_empty(), "JWT_SECRET must be set and non-empty");

        Self {
            secret,
            access_token_expiry_mins: lifetime_from_env("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: lifetime_from_env("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    /// Seconds an access token stays valid; reported to clients as `expires_in`.
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

fn lifetime_from_env(key: &str, default: i64) -> i64 {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => value,
        _ => panic!("{key} must be a positive integer, got '{raw}'"),
    }
}

pub fn generate_access_token(
    user_id: DbId,
    roles: &[String],
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iss: TOKEN_ISSUER.to_owned(),
        roles: roles.to_vec(),
        exp: issued_at + config.access_token_ttl_secs(),
        iat: issued_at,
        jti: Uuid::new_v4().to_string(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &config.encoding_key())
}

/// Decode an access token, rejecting bad signatures, other issuers, and
/// expired tokens.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    decode::<Claims>(token, &config.decoding_key(), &validation).map(|data| data.claims)
}

/// A new refresh token as `(plaintext, digest)`. Only the plaintext leaves
/// the server; only the digest is stored.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let digest = hash_refresh_token(&plaintext);
    (plaintext, digest)
}

/// Lowercase hex SHA-256 of `token`.
pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
