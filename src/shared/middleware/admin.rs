use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use sha2::{Digest, Sha256};
use crate::shared::services::AppState;
use crate::shared::errors::AuthError;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// 운영자 인증 (X-Admin-Key 헤더)
/// Operator access to the admin endpoints
#[derive(Debug, Clone)]
pub struct AdminOperator;

/// 운영자 키 SHA-256 digest
pub fn key_digest(key: &str) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(key.as_bytes()));
    digest
}

#[async_trait]
impl FromRequestParts<AppState> for AdminOperator {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state
            .auth_state
            .operator_key_digest
            .ok_or(AuthError::OperatorDisabled)?;

        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .ok_or(AuthError::OperatorDenied)?;

        let provided = key_digest(provided);
        let matches = provided
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0;

        if !matches {
            tracing::warn!("Rejected admin request with wrong operator key");
            return Err(AuthError::OperatorDenied.into());
        }
        Ok(AdminOperator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable() {
        assert_eq!(key_digest("operator"), key_digest("operator"));
        assert_ne!(key_digest("operator"), key_digest("operator2"));
    }
}
