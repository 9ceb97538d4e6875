use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use rust_decimal::Decimal;
use crate::domains::ledger::models::{
    DepositReceipt, TransactionStatus, WalletTransaction, WithdrawalReceipt,
};
use crate::shared::clients::CryptoCheckout;

/// PayPal 주문 생성 요청
/// Create PayPal order request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = CreatePayPalOrderRequest)]
pub struct CreatePayPalOrderRequest {
    /// 입금 금액 (USD)
    #[schema(value_type = String, example = "100.00")]
    pub amount: Decimal,
}

/// PayPal 주문 생성 응답
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = CreatePayPalOrderResponse)]
pub struct CreatePayPalOrderResponse {
    pub success: bool,
    #[schema(example = "5O190127TN364715T")]
    pub order_id: String,
    #[schema(example = "CREATED")]
    pub status: String,
    /// 사용자가 결제를 승인할 PayPal 페이지
    pub approval_url: Option<String>,
}

/// PayPal 주문 캡처 요청
/// Capture PayPal order request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = CapturePayPalOrderRequest)]
pub struct CapturePayPalOrderRequest {
    #[serde(alias = "orderId")]
    #[schema(example = "5O190127TN364715T")]
    pub order_id: String,
}

/// 입금 정산 응답
/// Deposit settlement response
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = DepositResponse)]
pub struct DepositResponse {
    pub success: bool,
    pub message: String,
    /// 이미 정산된 참조 ID였는지 여부
    pub duplicate: bool,
    #[schema(value_type = String, example = "95.00")]
    pub new_balance: Decimal,
    #[schema(value_type = String, example = "100.00")]
    pub gross_amount: Decimal,
    #[schema(value_type = String, example = "5.00")]
    pub commission: Decimal,
    #[schema(value_type = String, example = "95.00")]
    pub net_amount: Decimal,
    #[schema(value_type = String, example = "0.05")]
    pub commission_rate: Decimal,
    pub transaction: WalletTransaction,
}

impl From<DepositReceipt> for DepositResponse {
    fn from(receipt: DepositReceipt) -> Self {
        let message = if receipt.duplicate {
            "Deposit was already settled".to_string()
        } else {
            format!(
                "Deposited {} {} (commission {})",
                receipt.split.net_amount, receipt.wallet.currency, receipt.split.commission
            )
        };
        Self {
            success: true,
            message,
            duplicate: receipt.duplicate,
            new_balance: receipt.wallet.balance,
            gross_amount: receipt.split.gross_amount,
            commission: receipt.split.commission,
            net_amount: receipt.split.net_amount,
            commission_rate: receipt.split.commission_rate,
            transaction: receipt.transaction,
        }
    }
}

/// PayPal 출금 요청
/// PayPal payout request (USD)
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = PayPalWithdrawRequest)]
pub struct PayPalWithdrawRequest {
    #[schema(value_type = String, example = "50.00")]
    pub amount: Decimal,
    #[serde(alias = "paypalEmail")]
    #[schema(example = "worker@example.com")]
    pub paypal_email: String,
}

/// 출금 정산 응답
/// Withdrawal settlement response
#[derive(Debug, Serialize, ToSchema)]
#[schema(as = WithdrawResponse)]
pub struct WithdrawResponse {
    pub success: bool,
    pub message: String,
    #[schema(example = "WD-3f1c2a9be0c84f6e9a53b1a1f0f1c2d3")]
    pub reference_id: String,
    #[schema(value_type = String, example = "0.00")]
    pub new_balance: Decimal,
    #[schema(value_type = String, example = "50.00")]
    pub gross_amount: Decimal,
    #[schema(value_type = String, example = "2.50")]
    pub commission: Decimal,
    /// 실제 지급 금액
    #[schema(value_type = String, example = "47.50")]
    pub net_amount: Decimal,
    pub status: TransactionStatus,
    pub transaction: WalletTransaction,
}

impl From<WithdrawalReceipt> for WithdrawResponse {
    fn from(receipt: WithdrawalReceipt) -> Self {
        let message = match receipt.status {
            TransactionStatus::Pending => "Withdrawal submitted for review".to_string(),
            _ => "Withdrawal processed successfully".to_string(),
        };
        Self {
            success: true,
            message,
            new_balance: receipt.wallet.balance,
            gross_amount: receipt.split.gross_amount,
            commission: receipt.split.commission,
            net_amount: receipt.payout_amount(),
            status: receipt.status,
            reference_id: receipt.reference_id,
            transaction: receipt.transaction,
        }
    }
}

/// 암호화폐 입금 생성 요청
/// Create a USDT TRC-20 deposit checkout
#[derive(Debug, Deserialize, ToSchema)]
#[schema(as = CryptoDepositRequest)]
pub struct CryptoDepositRequest {
    /// 금액 (USD 기준)
    #[schema(value_type = String, example = "25.00")]
    pub amount: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(as = CryptoDepositResponse)]
pub struct CryptoDepositResponse {
    pub success: bool,
    pub checkout: CryptoCheckout,
}
