use serde::{Deserialize, Serialize};
use chrono::{Duration, Utc};

/// JWT Claims (Access Token 페이로드)
/// 외부 인증 서비스가 발급한 토큰의 payload
/// JWT claims issued by the identity provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// 사용자 ID (subject)
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// 만료 시간 (Unix timestamp)
    pub exp: i64,

    /// 발급 시간 (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// 새 Claims 생성 (ttl_minutes 후 만료)
    pub fn new(user_id: impl Into<String>, email: Option<String>, ttl_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            email,
            exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
            iat: now.timestamp(),
        }
    }
}
