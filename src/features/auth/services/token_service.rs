use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Claims};
use crate::features::users::models::User;

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Issues and validates HS256 access/refresh token pairs
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl_secs: u64,
    refresh_token_ttl_secs: u64,
}

/// A freshly issued token pair
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_token_ttl_secs: config.access_token_ttl.as_secs(),
            refresh_token_ttl_secs: config.refresh_token_ttl.as_secs(),
        }
    }

    /// Issue an access + refresh token pair for a user
    pub fn issue_tokens(&self, user: &User) -> Result<IssuedTokens> {
        let access_token = self.encode(user, TOKEN_TYPE_ACCESS, self.access_token_ttl_secs)?;
        let refresh_token = self.encode(user, TOKEN_TYPE_REFRESH, self.refresh_token_ttl_secs)?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            expires_in: self.access_token_ttl_secs,
        })
    }

    /// Validate an access token and return the authenticated identity
    pub fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.decode(token)?;

        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AppError::Auth("Token is not an access token".to_string()));
        }

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            username: claims.username,
            is_superuser: claims.is_superuser,
        })
    }

    /// Validate a refresh token and return the subject user id
    pub fn verify_refresh_token(&self, token: &str) -> Result<uuid::Uuid> {
        let claims = self.decode(token)?;

        if claims.token_type != TOKEN_TYPE_REFRESH {
            return Err(AppError::Auth("Token is not a refresh token".to_string()));
        }

        Ok(claims.sub)
    }

    fn encode(&self, user: &User, token_type: &str, ttl_secs: u64) -> Result<String> {
        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            token_type: token_type.to_string(),
            is_superuser: user.is_superuser,
            iat: now,
            exp: now + ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Auth(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    fn test_service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            access_token_ttl: Duration::from_secs(1800),
            refresh_token_ttl: Duration::from_secs(86400),
        })
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "x".to_string(),
            full_name: None,
            is_active: true,
            is_superuser: false,
            storage_used_bytes: 0,
            storage_quota_bytes: 0,
            file_count: 0,
            analysis_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let service = test_service();
        let user = test_user();

        let tokens = service.issue_tokens(&user).unwrap();
        assert_eq!(tokens.expires_in, 1800);

        let identity = service.verify_access_token(&tokens.access_token).unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, "alice");
        assert!(!identity.is_superuser);
    }

    #[test]
    fn test_refresh_token_is_rejected_as_access() {
        let service = test_service();
        let tokens = service.issue_tokens(&test_user()).unwrap();

        let err = service
            .verify_access_token(&tokens.refresh_token)
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let service = test_service();
        let user = test_user();
        let tokens = service.issue_tokens(&user).unwrap();

        let sub = service.verify_refresh_token(&tokens.refresh_token).unwrap();
        assert_eq!(sub, user.id);

        assert!(service.verify_refresh_token(&tokens.access_token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = test_service();
        assert!(service.verify_access_token("not-a-jwt").is_err());
    }
}
