use serde::Serialize;
use utoipa::ToSchema;
use rust_decimal::{Decimal, RoundingStrategy};
use crate::domains::ledger::models::{Currency, WalletTransaction};

/// 수수료 분할 결과
/// Gross amount split into platform commission and the user's net share
///
/// 수수료 = gross * rate (통화 scale로 반올림), net = gross - 수수료.
/// 반올림 후에도 commission + net == gross 가 항상 성립합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CommissionSplit {
    #[schema(value_type = String, example = "100.00")]
    pub gross_amount: Decimal,
    #[schema(value_type = String, example = "0.05")]
    pub commission_rate: Decimal,
    #[schema(value_type = String, example = "5.00")]
    pub commission: Decimal,
    #[schema(value_type = String, example = "95.00")]
    pub net_amount: Decimal,
}

impl CommissionSplit {
    /// # Examples
    /// ```
    /// use rust_decimal::Decimal;
    /// use taskinn_ledger::domains::ledger::models::{CommissionSplit, Currency};
    ///
    /// let split = CommissionSplit::compute(Decimal::new(100, 0), Decimal::new(5, 2), Currency::Usd);
    /// assert_eq!(split.commission, Decimal::new(500, 2));
    /// assert_eq!(split.net_amount, Decimal::new(9500, 2));
    /// ```
    pub fn compute(gross_amount: Decimal, commission_rate: Decimal, currency: Currency) -> Self {
        let commission = (gross_amount * commission_rate)
            .round_dp_with_strategy(currency.scale(), RoundingStrategy::MidpointAwayFromZero);
        Self {
            gross_amount,
            commission_rate,
            commission,
            net_amount: gross_amount - commission,
        }
    }

    /// 기존 입금 기록에서 분할 복원 (중복 정산 응답용)
    /// Rebuild the split of an already settled deposit
    pub fn from_deposit(transaction: &WalletTransaction) -> Self {
        let net_amount = transaction.amount;
        let commission = transaction.commission;
        let gross_amount = net_amount + commission;
        let commission_rate = if gross_amount.is_zero() {
            Decimal::ZERO
        } else {
            (commission / gross_amount).round_dp(5).normalize()
        };
        Self {
            gross_amount,
            commission_rate,
            commission,
            net_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn five_percent_of_hundred() {
        let split = CommissionSplit::compute(dec!(100), dec!(0.05), Currency::Usd);
        assert_eq!(split.commission, dec!(5.00));
        assert_eq!(split.net_amount, dec!(95.00));
    }

    #[test]
    fn rounds_to_currency_scale() {
        // 33.33 * 0.05 = 1.6665 -> 1.67 USD
        let usd = CommissionSplit::compute(dec!(33.33), dec!(0.05), Currency::Usd);
        assert_eq!(usd.commission, dec!(1.67));
        assert_eq!(usd.net_amount, dec!(31.66));
        assert_eq!(usd.commission + usd.net_amount, dec!(33.33));

        // 0.1234567 * 0.02 keeps six places for USDT
        let usdt = CommissionSplit::compute(dec!(10.123456), dec!(0.02), Currency::UsdtTrc20);
        assert_eq!(usdt.commission, dec!(0.202469));
        assert_eq!(usdt.commission + usdt.net_amount, dec!(10.123456));
    }

    #[test]
    fn zero_rate_keeps_everything() {
        let split = CommissionSplit::compute(dec!(42.10), Decimal::ZERO, Currency::Usd);
        assert!(split.commission.is_zero());
        assert_eq!(split.net_amount, dec!(42.10));
    }
}
