//! Session token issuing and verification
//!
//! A session token is a signed claims set (subject id + expiry) proving
//! identity for a bounded time. Sessions last seven days by default and are
//! not renewable; clients log in again once the token lapses.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors verifying a session token
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Signature mismatch or elapsed expiry; the caller cannot tell which
    #[error("session token expired or invalid")]
    ExpiredOrInvalid,
}

/// Signed session claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user id)
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(subject: Uuid, lifetime_days: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: subject,
            iat: now.timestamp(),
            exp: (now + Duration::days(lifetime_days)).timestamp(),
        }
    }

    pub fn encode(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }
}

/// Issue a session token for the given subject
pub fn issue(
    subject: Uuid,
    secret: &str,
    lifetime_days: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    SessionClaims::new(subject, lifetime_days).encode(secret)
}

/// Verify a session token and return its subject id
pub fn verify(token: &str, secret: &str) -> Result<Uuid, SessionError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| SessionError::ExpiredOrInvalid)?;

    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret";

    #[test]
    fn issue_verify_roundtrip() {
        let subject = Uuid::new_v4();
        let token = issue(subject, SECRET, 7).unwrap();
        assert_eq!(verify(&token, SECRET).unwrap(), subject);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = issue(Uuid::new_v4(), SECRET, 7).unwrap();
        assert_eq!(
            verify(&token, "another-secret"),
            Err(SessionError::ExpiredOrInvalid)
        );
    }

    #[test]
    fn verify_rejects_elapsed_expiry() {
        // Hand-build claims whose expiry is already in the past
        let now = Utc::now();
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = claims.encode(SECRET).unwrap();
        assert_eq!(verify(&token, SECRET), Err(SessionError::ExpiredOrInvalid));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert_eq!(
            verify("not.a.token", SECRET),
            Err(SessionError::ExpiredOrInvalid)
        );
    }
}
