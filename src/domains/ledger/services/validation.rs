// 정산 요청 검증
// DB에 접근하기 전에 걸러내는 입력 검증 (ValidationError)

use rust_decimal::Decimal;
use crate::domains::ledger::models::Currency;
use crate::shared::errors::LedgerError;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const MAX_REFERENCE_LEN: usize = 128;

/// 금액 검증: 0보다 크고 통화 scale 이하의 소수 자릿수
/// Amount must be positive and fit the currency's decimal places
pub fn validate_amount(amount: Decimal, currency: Currency) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation("Amount must be greater than zero"));
    }
    if amount.normalize().scale() > currency.scale() {
        return Err(LedgerError::validation(format!(
            "{} amounts allow at most {} decimal places",
            currency,
            currency.scale()
        )));
    }
    Ok(())
}

pub fn validate_user_id(user_id: &str) -> Result<(), LedgerError> {
    if user_id.trim().is_empty() {
        return Err(LedgerError::validation("User id is required"));
    }
    Ok(())
}

pub fn validate_reference_id(reference_id: &str) -> Result<(), LedgerError> {
    let trimmed = reference_id.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation("External reference id is required"));
    }
    if trimmed.len() > MAX_REFERENCE_LEN {
        return Err(LedgerError::validation("External reference id is too long"));
    }
    Ok(())
}

/// 출금 대상 검증
/// - USD: PayPal 이메일
/// - USDT_TRC20: TRON base58 주소 (T로 시작, 34자)
pub fn validate_payout_target(target: &str, currency: Currency) -> Result<(), LedgerError> {
    let target = target.trim();
    match currency {
        Currency::Usd => {
            if !is_email(target) {
                return Err(LedgerError::validation("A valid PayPal email is required"));
            }
        }
        Currency::UsdtTrc20 => {
            if !is_tron_address(target) {
                return Err(LedgerError::validation(
                    "A valid USDT TRC-20 wallet address is required",
                ));
            }
        }
    }
    Ok(())
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

fn is_tron_address(value: &str) -> bool {
    value.len() == 34
        && value.starts_with('T')
        && value.chars().all(|c| BASE58_ALPHABET.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(validate_amount(dec!(0), Currency::Usd).is_err());
        assert!(validate_amount(dec!(-5), Currency::Usd).is_err());
        assert!(validate_amount(dec!(0.01), Currency::Usd).is_ok());
    }

    #[test]
    fn enforces_currency_scale() {
        assert!(validate_amount(dec!(10.001), Currency::Usd).is_err());
        assert!(validate_amount(dec!(10.100), Currency::Usd).is_ok());
        assert!(validate_amount(dec!(10.000001), Currency::UsdtTrc20).is_ok());
        assert!(validate_amount(dec!(10.0000001), Currency::UsdtTrc20).is_err());
    }

    #[test]
    fn checks_payout_targets() {
        assert!(validate_payout_target("worker@example.com", Currency::Usd).is_ok());
        assert!(validate_payout_target("worker@example", Currency::Usd).is_err());
        assert!(validate_payout_target("", Currency::Usd).is_err());

        let tron = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
        assert!(validate_payout_target(tron, Currency::UsdtTrc20).is_ok());
        assert!(validate_payout_target("0x52908400098527886E0F7030069857D2E4169EE7", Currency::UsdtTrc20).is_err());
        // 'O' is not in the base58 alphabet
        assert!(validate_payout_target("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLjOt", Currency::UsdtTrc20).is_err());
    }

    #[test]
    fn reference_id_required() {
        assert!(validate_reference_id("   ").is_err());
        assert!(validate_reference_id("5O190127TN364715T").is_ok());
    }
}
