use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// =====================================================
// Currency / PaymentRail
// =====================================================
// 역할: 지갑 통화 코드와 입출금 결제 수단
//
// 통화별 소수 자릿수 (scale):
// - USD: 2 (센트 단위)
// - USDT_TRC20: 6 (TRC-20 USDT 최소 단위)
//
// 수수료는 항상 통화의 scale로 반올림됩니다.
// =====================================================

/// 지갑 통화
/// Wallet currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "USDT_TRC20")]
    UsdtTrc20,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::UsdtTrc20];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::UsdtTrc20 => "USDT_TRC20",
        }
    }

    /// Decimal places kept for balances and commissions.
    pub fn scale(&self) -> u32 {
        match self {
            Currency::Usd => 2,
            Currency::UsdtTrc20 => 6,
        }
    }

    /// CoinPayments 통화 코드 (예: "USDT.TRC20")
    /// Currency code used by the crypto rail
    pub fn coinpayments_code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::UsdtTrc20 => "USDT.TRC20",
        }
    }

    pub fn from_coinpayments_code(code: &str) -> Option<Self> {
        match code {
            "USD" => Some(Currency::Usd),
            "USDT.TRC20" => Some(Currency::UsdtTrc20),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::Usd),
            "USDT_TRC20" => Ok(Currency::UsdtTrc20),
            other => Err(format!(
                "Unsupported currency: {} (expected USD or USDT_TRC20)",
                other
            )),
        }
    }
}

/// 결제 수단 (외부 결제 레일)
/// External payment rail that moves money in or out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRail {
    /// 카드/PayPal 레일 (USD)
    PayPal,
    /// 암호화폐 레일 (USDT TRC-20)
    CoinPayments,
}

impl PaymentRail {
    /// 통화별 출금 레일
    /// Rail used to pay out a withdrawal in the given currency
    pub fn for_currency(currency: Currency) -> Self {
        match currency {
            Currency::Usd => PaymentRail::PayPal,
            Currency::UsdtTrc20 => PaymentRail::CoinPayments,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentRail::PayPal => "PayPal",
            PaymentRail::CoinPayments => "CoinPayments",
        }
    }

    /// Crypto payouts wait for an operator; card payouts settle immediately.
    pub fn requires_manual_review(&self) -> bool {
        matches!(self, PaymentRail::CoinPayments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes() {
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("USDT_TRC20".parse::<Currency>().unwrap(), Currency::UsdtTrc20);
        assert!("usd".parse::<Currency>().is_err());
        assert!("BTC".parse::<Currency>().is_err());
    }

    #[test]
    fn maps_coinpayments_codes() {
        assert_eq!(Currency::from_coinpayments_code("USDT.TRC20"), Some(Currency::UsdtTrc20));
        assert_eq!(Currency::UsdtTrc20.coinpayments_code(), "USDT.TRC20");
        assert_eq!(Currency::from_coinpayments_code("LTCT"), None);
    }

    #[test]
    fn crypto_rail_requires_review() {
        assert!(PaymentRail::for_currency(Currency::UsdtTrc20).requires_manual_review());
        assert!(!PaymentRail::for_currency(Currency::Usd).requires_manual_review());
    }
}
