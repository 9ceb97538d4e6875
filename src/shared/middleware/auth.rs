use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use crate::shared::services::AppState;
use crate::shared::errors::AuthError;

/// 인증된 사용자 정보 (JWT 토큰에서 추출)
/// Authenticated user information (extracted from JWT token)
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
}

/// AuthenticatedUser를 Axum Extractor로 구현
///
/// 사용법:
/// ```rust,ignore
/// pub async fn get_wallets(
///     State(app_state): State<AppState>,
///     authenticated_user: AuthenticatedUser,
/// ) -> Result<...> {
///     let user_id = authenticated_user.user_id;
///     // ...
/// }
/// ```
#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // 1. Authorization 헤더에서 토큰 추출
        let auth_header = parts
            .headers
            .get("Authorization")
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidHeader)?;

        // 2. "Bearer <token>" 형식 파싱
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidHeader)?;

        // 3. 토큰 검증
        let claims = state.auth_state.jwt_service.verify_access_token(token.trim())?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}
