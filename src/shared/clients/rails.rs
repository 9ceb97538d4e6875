// 결제 레일 인터페이스
// Payment rail seams
//
// 정산 엔진은 레일을 모릅니다. 핸들러가 레일로 결제를 확정한 뒤 엔진을 호출합니다.
// 테스트에서는 stub 구현으로 교체합니다.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use crate::domains::ledger::models::Currency;

/// 생성된 카드 결제 주문
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedOrder {
    pub order_id: String,
    pub status: String,
    /// 사용자를 보낼 승인 페이지
    pub approval_url: Option<String>,
}

/// 캡처된 카드 결제
/// Order captured by the card rail
#[derive(Debug, Clone)]
pub struct CapturedOrder {
    pub order_id: String,
    /// "COMPLETED" when funds moved
    pub status: String,
    pub amount: Decimal,
    pub currency_code: String,
    pub capture_id: Option<String>,
    /// 주문 생성 시 기록한 소유자 (purchase unit custom_id)
    pub custom_id: Option<String>,
}

impl CapturedOrder {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("COMPLETED")
    }
}

/// 암호화폐 입금 결제창
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CryptoCheckout {
    pub txn_id: String,
    pub address: String,
    /// Amount to send, in the crypto currency
    pub amount: String,
    pub checkout_url: String,
    pub status_url: String,
    pub qrcode_url: String,
    /// seconds
    pub timeout: u64,
}

/// 요청된 암호화폐 출금
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CryptoPayout {
    pub id: String,
    pub status: i64,
}

/// 카드 레일 (PayPal)
#[async_trait]
pub trait CardRail: Send + Sync {
    /// 주문 생성 (user_id는 custom_id로 주문에 기록)
    async fn create_order(
        &self,
        user_id: &str,
        amount: Decimal,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<CreatedOrder>;

    /// 주문 소유자 조회 (custom_id, 없으면 None)
    async fn order_owner(&self, order_id: &str) -> Result<Option<String>>;

    async fn capture_order(&self, order_id: &str) -> Result<CapturedOrder>;
}

/// 암호화폐 레일 (CoinPayments)
#[async_trait]
pub trait CryptoRail: Send + Sync {
    async fn create_transaction(
        &self,
        amount: Decimal,
        user_id: &str,
        currency: Currency,
        buyer_email: Option<&str>,
    ) -> Result<CryptoCheckout>;

    /// 출금 요청 (auto_confirm=0, 운영자 승인 필요)
    async fn create_withdrawal(
        &self,
        amount: Decimal,
        address: &str,
        currency: Currency,
        note: &str,
    ) -> Result<CryptoPayout>;

    /// IPN 본문 서명 검증
    /// Checks the HMAC header of an IPN body
    fn verify_ipn(&self, body: &[u8], hmac_hex: &str) -> bool;

    fn merchant_id(&self) -> &str;
}
