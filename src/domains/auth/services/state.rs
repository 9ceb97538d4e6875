// Auth domain state
// 인증 도메인 상태
use crate::domains::auth::services::JwtService;

/// Auth domain state
/// 인증 도메인에서 필요한 서비스들을 포함하는 상태
#[derive(Clone)]
pub struct AuthState {
    pub jwt_service: JwtService,
    /// 운영자 키의 SHA-256 digest (None이면 관리자 API 비활성)
    pub operator_key_digest: Option<[u8; 32]>,
}

impl AuthState {
    /// AuthState 생성 (JWT 서비스와 운영자 키 필요)
    pub fn new(jwt_service: JwtService, operator_key: &str) -> Self {
        let operator_key = operator_key.trim();
        Self {
            jwt_service,
            operator_key_digest: if operator_key.is_empty() {
                None
            } else {
                Some(crate::shared::middleware::key_digest(operator_key))
            },
        }
    }
}
