use std::sync::Arc;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};
use crate::domains::ledger::models::{
    Currency, DepositReceipt, DepositRequest, PaymentRail, WithdrawalReceipt, WithdrawalRequest,
};
use crate::domains::ledger::services::{validation, LedgerService};
use crate::shared::clients::{CardRail, CreatedOrder, CryptoCheckout, CryptoRail, IpnNotification};
use crate::shared::errors::LedgerError;

/// IPN 처리 결과
/// What happened to a CoinPayments notification
#[derive(Debug, Clone)]
pub enum IpnOutcome {
    /// 새로 정산됨 또는 이미 정산된 입금 (receipt.duplicate로 구분)
    Settled(DepositReceipt),
    /// 아직 완료되지 않았거나 실패한 결제 (잔고 변화 없음)
    Ignored { txn_id: String, status: i64 },
}

/// 결제 서비스
/// Drives the payment rails and hands confirmed money movements to the ledger
///
/// 레일 호출은 항상 정산 트랜잭션 밖에서 합니다.
/// - 입금: 레일 확정 → settle_deposit
/// - 출금: settle_withdrawal 커밋 → (암호화폐만) 레일 출금 요청
#[derive(Clone)]
pub struct PaymentsService {
    ledger: LedgerService,
    card_rail: Arc<dyn CardRail>,
    crypto_rail: Arc<dyn CryptoRail>,
    public_url: String,
}

impl PaymentsService {
    pub fn new(
        ledger: LedgerService,
        card_rail: Arc<dyn CardRail>,
        crypto_rail: Arc<dyn CryptoRail>,
        public_url: &str,
    ) -> Self {
        Self {
            ledger,
            card_rail,
            crypto_rail,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    // =====================================================
    // PayPal (USD)
    // =====================================================

    /// PayPal 주문 생성 (잔고 변화 없음, 주문 소유자 = user_id)
    pub async fn create_paypal_order(&self, user_id: &str, amount: Decimal) -> Result<CreatedOrder, LedgerError> {
        validation::validate_amount(amount, Currency::Usd)?;

        let return_url = format!("{}/dashboard/employer/paypal-return", self.public_url);
        let cancel_url = format!("{}/dashboard/employer/payments?cancelled=true", self.public_url);

        self.card_rail
            .create_order(user_id, amount, &return_url, &cancel_url)
            .await
            .map_err(|e| rail_error(PaymentRail::PayPal, e))
    }

    /// PayPal 주문 캡처 후 입금 정산
    /// Capture an approved order and settle it (order id is the idempotency key)
    pub async fn capture_paypal_order(&self, user_id: &str, order_id: &str) -> Result<DepositReceipt, LedgerError> {
        validation::validate_reference_id(order_id)?;
        let order_id = order_id.trim();

        // 이미 정산된 주문이면 레일을 다시 부르지 않는다
        if let Some(receipt) = self.ledger.settled_deposit(user_id, order_id).await? {
            info!(order_id, "PayPal order already settled");
            return Ok(receipt);
        }

        // 주문을 만든 사용자만 캡처할 수 있다 (캡처 전에 확인)
        let owner = self
            .card_rail
            .order_owner(order_id)
            .await
            .map_err(|e| rail_error(PaymentRail::PayPal, e))?;
        ensure_order_owner(user_id, order_id, owner.as_deref())?;

        let captured = self
            .card_rail
            .capture_order(order_id)
            .await
            .map_err(|e| rail_error(PaymentRail::PayPal, e))?;
        if let Some(custom_id) = captured.custom_id.as_deref() {
            ensure_order_owner(user_id, order_id, Some(custom_id))?;
        }

        if !captured.is_completed() {
            return Err(LedgerError::upstream(
                PaymentRail::PayPal.display_name(),
                format!("capture status is {}", captured.status),
            ));
        }
        if captured.currency_code != Currency::Usd.as_str() {
            return Err(LedgerError::upstream(
                PaymentRail::PayPal.display_name(),
                format!("unexpected capture currency {}", captured.currency_code),
            ));
        }

        self.ledger
            .settle_deposit(DepositRequest {
                user_id: user_id.to_string(),
                currency: Currency::Usd,
                gross_amount: captured.amount,
                reference_id: order_id.to_string(),
                rail: PaymentRail::PayPal,
                transaction_hash: captured.capture_id,
            })
            .await
    }

    // =====================================================
    // CoinPayments (USDT TRC-20)
    // =====================================================

    /// 암호화폐 입금 결제창 생성 (금액은 USD 기준, 잔고 변화 없음)
    pub async fn create_crypto_deposit(
        &self,
        user_id: &str,
        amount_usd: Decimal,
        buyer_email: Option<&str>,
    ) -> Result<CryptoCheckout, LedgerError> {
        validation::validate_amount(amount_usd, Currency::Usd)?;

        self.crypto_rail
            .create_transaction(amount_usd, user_id, Currency::UsdtTrc20, buyer_email)
            .await
            .map_err(|e| rail_error(PaymentRail::CoinPayments, e))
    }

    /// IPN 처리
    /// Verify, classify and settle a CoinPayments notification
    pub async fn handle_ipn(&self, body: &[u8], hmac_header: Option<&str>) -> Result<IpnOutcome, LedgerError> {
        let signature = hmac_header.ok_or(LedgerError::InvalidSignature)?;
        if !self.crypto_rail.verify_ipn(body, signature) {
            warn!("IPN rejected: signature mismatch");
            return Err(LedgerError::InvalidSignature);
        }

        let ipn = IpnNotification::parse(body).map_err(LedgerError::Validation)?;
        if ipn.ipn_mode != "hmac" {
            return Err(LedgerError::validation(format!("Unsupported IPN mode: {}", ipn.ipn_mode)));
        }
        if ipn.merchant != self.crypto_rail.merchant_id() {
            warn!(merchant = %ipn.merchant, "IPN rejected: merchant mismatch");
            return Err(LedgerError::InvalidSignature);
        }

        if ipn.is_failed() || !ipn.is_complete() {
            info!(txn_id = %ipn.txn_id, status = ipn.status, status_text = %ipn.status_text, "IPN acknowledged without settlement");
            return Ok(IpnOutcome::Ignored {
                txn_id: ipn.txn_id,
                status: ipn.status,
            });
        }

        let user_id = ipn
            .user_id()
            .ok_or_else(|| LedgerError::validation("IPN custom field does not identify a user"))?
            .to_string();
        let currency = Currency::from_coinpayments_code(&ipn.currency2).ok_or_else(|| {
            LedgerError::validation(format!("Unsupported IPN currency: {}", ipn.currency2))
        })?;

        // 레일은 8자리까지 보내므로 통화 scale로 버림
        let gross_amount = ipn
            .amount2
            .round_dp_with_strategy(currency.scale(), RoundingStrategy::ToZero);
        if gross_amount.is_zero() {
            // 최소 단위 미만: 정산하지 않고 수신 확인만 (재전송 방지)
            warn!(txn_id = %ipn.txn_id, amount2 = %ipn.amount2, "IPN amount below currency precision; not settled");
            return Ok(IpnOutcome::Ignored {
                txn_id: ipn.txn_id,
                status: ipn.status,
            });
        }

        let receipt = self
            .ledger
            .settle_deposit(DepositRequest {
                user_id,
                currency,
                gross_amount,
                reference_id: ipn.txn_id.clone(),
                rail: PaymentRail::CoinPayments,
                transaction_hash: Some(ipn.txn_id),
            })
            .await?;

        Ok(IpnOutcome::Settled(receipt))
    }

    // =====================================================
    // 출금
    // =====================================================

    /// 출금 정산 후 레일에 지급 요청
    ///
    /// 암호화폐 출금은 Pending으로 커밋된 뒤 CoinPayments에 요청합니다 (auto_confirm=0).
    /// 레일 요청이 실패해도 원장 기록은 그대로 두고 운영자 검토에 맡깁니다.
    pub async fn withdraw(&self, request: WithdrawalRequest) -> Result<WithdrawalReceipt, LedgerError> {
        let payout_target = request.payout_target.trim().to_string();
        let receipt = self.ledger.settle_withdrawal(request).await?;

        if receipt.rail == PaymentRail::CoinPayments {
            match self
                .crypto_rail
                .create_withdrawal(
                    receipt.payout_amount(),
                    &payout_target,
                    receipt.transaction.currency,
                    &receipt.reference_id,
                )
                .await
            {
                Ok(payout) => info!(
                    reference_id = %receipt.reference_id,
                    payout_id = %payout.id,
                    "Crypto payout requested"
                ),
                Err(e) => warn!(
                    reference_id = %receipt.reference_id,
                    error = %e,
                    "Crypto payout request failed; withdrawal left pending for operator review"
                ),
            }
        }

        Ok(receipt)
    }
}

fn ensure_order_owner(user_id: &str, order_id: &str, owner: Option<&str>) -> Result<(), LedgerError> {
    if owner == Some(user_id) {
        return Ok(());
    }
    warn!(order_id, user_id, owner = ?owner, "PayPal capture rejected: order owned by another user");
    Err(LedgerError::validation("PayPal order was not created by this user"))
}

fn rail_error(rail: PaymentRail, err: anyhow::Error) -> LedgerError {
    warn!(rail = rail.display_name(), error = ?err, "Payment rail call failed");
    LedgerError::upstream(rail.display_name(), err)
}
