//! Access token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the account username as the subject.
//! Issuance happens once per successful authentication; every protected
//! request verifies the token signature and expiry.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account username (the authenticated identity)
    pub sub: String,

    /// Issued-at, seconds since the epoch
    pub iat: i64,

    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Sign a token for `username`, valid for `ttl_hours`.
pub fn issue_token(username: &str, secret: &str, ttl_hours: i64) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: username.to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(ttl_hours)).timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify signature and expiry, returning the claims.
///
/// Any decode failure (bad signature, malformed token, expired `exp`)
/// collapses to `InvalidToken`; the caller answers 401 without detail.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips() {
        let token = issue_token("alice", SECRET, 24).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("alice", SECRET, 24).unwrap();
        let err = verify_token(&token, "other-secret").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let mut token = issue_token("alice", SECRET, 24).unwrap();
        token.push('x');
        let err = verify_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        // An expiry a full hour in the past is outside any decode leeway.
        let token = issue_token("alice", SECRET, -1).unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = verify_token("not-a-token", SECRET).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }
}
