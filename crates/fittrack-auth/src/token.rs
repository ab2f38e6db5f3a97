//! Signed session tokens.
//!
//! Tokens are HS256 JWTs signed with the application secret. The session
//! claims are flattened next to the registered `iat`/`exp` claims.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;
use crate::types::SessionToken;

/// Default session lifetime.
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    session: SessionToken,
    iat: i64,
    exp: i64,
}

pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    max_age: Duration,
}

impl SessionCodec {
    pub fn new(secret: &[u8], max_age: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            max_age,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Sign a session token issued now.
    pub fn encode(&self, session: &SessionToken) -> AuthResult<String> {
        self.encode_at(session, OffsetDateTime::now_utc())
    }

    /// Sign a session token issued at `issued_at`.
    pub fn encode_at(&self, session: &SessionToken, issued_at: OffsetDateTime) -> AuthResult<String> {
        let iat = issued_at.unix_timestamp();
        let claims = SessionClaims {
            session: session.clone(),
            iat,
            exp: iat + self.max_age.as_secs() as i64,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::token(format!("failed to sign session: {e}")))
    }

    /// Verify the signature and expiry of a session token.
    ///
    /// # Errors
    ///
    /// Returns `Token` for a bad signature, an expired token or malformed
    /// claims.
    pub fn decode(&self, token: &str) -> AuthResult<SessionToken> {
        let validation = Validation::new(Algorithm::HS256);

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                AuthError::token(e.to_string())
            })?;

        Ok(data.claims.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionToken {
        SessionToken {
            id: "u1".to_string(),
            email: "ana@example.com".to_string(),
            name: Some("Ana".to_string()),
            image: None,
        }
    }

    #[test]
    fn test_encode_decode() {
        let codec = SessionCodec::new(b"test-secret", DEFAULT_SESSION_MAX_AGE);
        let jwt = codec.encode(&session()).unwrap();
        assert_eq!(codec.decode(&jwt).unwrap(), session());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let jwt = SessionCodec::new(b"one", DEFAULT_SESSION_MAX_AGE)
            .encode(&session())
            .unwrap();
        let err = SessionCodec::new(b"two", DEFAULT_SESSION_MAX_AGE)
            .decode(&jwt)
            .unwrap_err();
        assert!(matches!(err, AuthError::Token { .. }));
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = SessionCodec::new(b"test-secret", DEFAULT_SESSION_MAX_AGE);
        let issued = OffsetDateTime::now_utc() - time::Duration::days(31);
        let jwt = codec.encode_at(&session(), issued).unwrap();

        let err = codec.decode(&jwt).unwrap_err();
        assert!(matches!(err, AuthError::Token { .. }));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = SessionCodec::new(b"test-secret", DEFAULT_SESSION_MAX_AGE);
        assert!(codec.decode("not.a.jwt").is_err());
    }
}
