// src/domains/auth/services/jwt_service.rs
use crate::shared::errors::AuthError;
use crate::domains::auth::models::jwt::Claims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

/// JWT 서비스
/// JWT Service for token verification (HS256)
///
/// 토큰 발급은 외부 인증 서비스의 몫이고, 여기서는 검증만 합니다.
/// generate_access_token은 로컬 개발과 테스트용입니다.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: i64,
}

impl JwtService {
    /// JWT Service 생성
    /// Create JWT Service
    pub fn new(secret: &str, access_token_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes,
        }
    }

    /// Access Token 발급
    /// Generate Access Token
    pub fn generate_access_token(&self, user_id: &str, email: Option<String>) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, email, self.access_token_minutes);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to generate access token: {}", e)))
    }

    /// Access Token 검증
    /// Verify Access Token
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AuthError::InvalidToken
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let service = JwtService::new("test-secret", 5);
        let token = service
            .generate_access_token("user-1", Some("user@example.com".to_string()))
            .unwrap();

        let claims = service.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = JwtService::new("secret-a", 5);
        let verifier = JwtService::new("secret-b", 5);
        let token = issuer.generate_access_token("user-1", None).unwrap();

        assert!(matches!(verifier.verify_access_token(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        // jsonwebtoken allows 60s of leeway by default
        let service = JwtService::new("secret", -5);
        let token = service.generate_access_token("user-1", None).unwrap();

        assert!(matches!(service.verify_access_token(&token), Err(AuthError::InvalidToken)));
    }
}
