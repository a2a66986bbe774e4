use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::common::auth::Role;
use crate::common::UserId;
use crate::domains::users::models::User;

/// Session tokens live for 7 days; the cookie gets the same max-age.
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

fn token_ttl() -> chrono::Duration {
    chrono::Duration::seconds(TOKEN_TTL_SECONDS)
}

/// JWT Claims - data stored in the token
///
/// Role and email are snapshots at issuance. Authorization never trusts
/// them; the middleware re-reads the user row on every request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,      // Subject (user id as string)
    pub user_id: UserId,  // User UUID
    pub email: String,    // Email at issuance (for logging/debugging)
    pub role: Role,       // Role at issuance
    pub exp: i64,         // Expiration timestamp
    pub iat: i64,         // Issued at timestamp
    pub iss: String,      // Issuer
}

/// JWT Service - creates and verifies JWT tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtService {
    /// Create new JWT service with secret and issuer
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Create a session token for a user, expiring after [`TOKEN_TTL_SECONDS`].
    pub fn create_token(&self, user: &User) -> Result<String> {
        self.create_token_with_ttl(user, token_ttl())
    }

    /// Create a token with an explicit lifetime. Tests use this to mint
    /// already-expired tokens.
    pub fn create_token_with_ttl(&self, user: &User, ttl: chrono::Duration) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a token
    ///
    /// Returns claims if the signature, expiry and issuer all check out.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::new_parent(
            "Pat".to_string(),
            "pat@example.com".to_string(),
            "hash".to_string(),
        )
    }

    #[test]
    fn test_create_and_verify_token() {
        let service = JwtService::new("test_secret_key", "test_issuer");
        let user = test_user();

        let token = service.create_token(&user).unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, "pat@example.com");
        assert_eq!(claims.role, Role::Parent);
        assert_eq!(claims.iss, "test_issuer");
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::new("test_secret_key", "test_issuer");
        assert!(service.verify_token("invalid_token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new("secret1", "test_issuer");
        let service2 = JwtService::new("secret2", "test_issuer");

        let token = service1.create_token(&test_user()).unwrap();
        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let service1 = JwtService::new("secret", "issuer_a");
        let service2 = JwtService::new("secret", "issuer_b");

        let token = service1.create_token(&test_user()).unwrap();
        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new("secret", "test_issuer");
        let token = service
            .create_token_with_ttl(&test_user(), chrono::Duration::seconds(-120))
            .unwrap();
        assert!(service.verify_token(&token).is_err());
    }
}
