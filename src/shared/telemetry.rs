// 로깅 초기화
// Structured logging setup
//
// RUST_LOG가 설정되어 있으면 그 값을, 아니면 설정 파일의 log.level을 사용합니다.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::shared::config::LogSettings;

/// 전역 tracing subscriber 설치
/// 이미 설치된 경우 (테스트 등) 에러를 무시하지 않고 그대로 돌려줍니다.
pub fn init_logging(settings: &LogSettings) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    }
}
