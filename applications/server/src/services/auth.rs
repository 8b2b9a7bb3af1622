/// Authentication service - JWT access tokens
///
/// Identity lookup lives outside this server; a token only asserts a user id.
use crate::error::{Result, ServerError};
use chorus_core::UserId;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

impl AuthService {
    pub fn new(secret: String, access_expiration_hours: u64) -> Self {
        Self {
            secret,
            access_token_expiration: Duration::hours(
                i64::try_from(access_expiration_hours).unwrap_or(i64::MAX / 3600),
            ),
        }
    }

    /// Create an access token
    pub fn create_access_token(&self, user_id: &UserId) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.access_token_expiration;

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify an access token and return its subject
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        if claims.sub.is_empty() {
            return Err(ServerError::Auth("Token has no subject".to_string()));
        }
        Ok(UserId::new(claims.sub))
    }
}
