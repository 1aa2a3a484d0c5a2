/// Bearer token handling
///
/// Accounts and login live in an external service that issues HS256 tokens.
/// This module only verifies them (and can mint them for tests and tooling).
use crate::error::{AppError, Result};
use crate::models::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// The acting user of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user: &User, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Identity> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(JWT_ALGORITHM))?;
        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid user ID".to_string()))?;

        Ok(Identity {
            user_id,
            username: data.claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 42,
            username: "leo".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let keys = JwtKeys::new("test-secret");
        let token = keys.issue(&user(), Duration::hours(1)).unwrap();
        let identity = keys.verify(&token).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.username, "leo");
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let keys = JwtKeys::new("test-secret");
        let foreign = JwtKeys::new("other-secret")
            .issue(&user(), Duration::hours(1))
            .unwrap();
        assert!(matches!(keys.verify(&foreign), Err(AppError::Unauthorized(_))));

        let expired = keys.issue(&user(), Duration::hours(-2)).unwrap();
        assert!(keys.verify(&expired).is_err());
        assert!(keys.verify("not-a-token").is_err());
    }
}
