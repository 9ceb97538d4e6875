use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// 관리자 설정 (싱글톤)
/// Platform-wide settings singleton
///
/// 모든 정산은 이 행의 commission_rate로 수수료를 계산하고,
/// 수수료만큼 total_earnings를 증가시킵니다.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[schema(as = AdminSettings)]
pub struct AdminSettings {
    /// Commission rate as a fraction in [0, 1)
    /// 수수료율 (예: 0.05 = 5%)
    #[schema(value_type = String, example = "0.05")]
    pub commission_rate: Decimal,

    /// 누적 수수료 수익 (전 통화 합계)
    /// Cumulative commission across all currencies
    #[schema(value_type = String, example = "125.40")]
    pub total_earnings: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Accepts rates in `[0, 1)`.
pub fn is_valid_commission_rate(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate < Decimal::ONE
}
