use std::collections::HashMap;
use std::str::FromStr;
use anyhow::{Context, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::Sha512;
use crate::domains::ledger::models::Currency;
use crate::shared::clients::{CryptoCheckout, CryptoPayout, CryptoRail};
use crate::shared::config::CoinPaymentsSettings;

type HmacSha512 = Hmac<Sha512>;

const API_URL: &str = "https://www.coinpayments.net/api.php";
const CUSTOM_PREFIX: &str = "TaskInn-";

// CoinPayments API 클라이언트
// 모든 요청은 form-urlencoded POST + HMAC 헤더 (private key로 서명한 SHA-512)
// CoinPayments API client for the crypto rail
#[derive(Clone)]
pub struct CoinPaymentsClient {
    http_client: reqwest::Client,
    public_key: String,
    private_key: String,
    ipn_secret: String,
    merchant_id: String,
    ipn_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    error: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct TransactionResult {
    amount: String,
    txn_id: String,
    address: String,
    timeout: u64,
    checkout_url: String,
    status_url: String,
    qrcode_url: String,
}

#[derive(Debug, Deserialize)]
struct WithdrawalResult {
    id: String,
    status: i64,
}

impl CoinPaymentsClient {
    // 클라이언트 생성
    // public_url은 IPN 콜백 주소를 만들 때 사용
    pub fn new(settings: &CoinPaymentsSettings, public_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            public_key: settings.public_key.clone(),
            private_key: settings.private_key.clone(),
            ipn_secret: settings.ipn_secret.clone(),
            merchant_id: settings.merchant_id.clone(),
            ipn_url: format!(
                "{}/api/payments/coinpayments/ipn",
                public_url.trim_end_matches('/')
            ),
        })
    }

    // API 호출
    // version/cmd/key/format 공통 파라미터 + 명령별 파라미터
    async fn make_request<T: DeserializeOwned>(&self, cmd: &str, params: &[(&str, String)]) -> Result<T> {
        // Serializer는 Send가 아니므로 await 전에 drop
        let body = {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            serializer
                .append_pair("version", "1")
                .append_pair("cmd", cmd)
                .append_pair("key", &self.public_key)
                .append_pair("format", "json");
            for (key, value) in params {
                serializer.append_pair(key, value);
            }
            serializer.finish()
        };
        let signature = sign(&self.private_key, body.as_bytes())?;

        let response = self
            .http_client
            .post(API_URL)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("HMAC", signature)
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to CoinPayments", cmd))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CoinPayments API returned error: {} - {}", status, body);
        }

        let parsed: ApiResponse<T> = response
            .json()
            .await
            .context("Failed to parse CoinPayments response")?;

        if parsed.error != "ok" {
            anyhow::bail!("CoinPayments {} failed: {}", cmd, parsed.error);
        }
        parsed
            .result
            .with_context(|| format!("CoinPayments {} returned no result", cmd))
    }
}

#[async_trait]
impl CryptoRail for CoinPaymentsClient {
    async fn create_transaction(
        &self,
        amount: Decimal,
        user_id: &str,
        currency: Currency,
        buyer_email: Option<&str>,
    ) -> Result<CryptoCheckout> {
        let result: TransactionResult = self
            .make_request(
                "create_transaction",
                &[
                    ("amount", amount.to_string()),
                    ("currency1", "USD".to_string()),
                    ("currency2", currency.coinpayments_code().to_string()),
                    ("buyer_email", buyer_email.unwrap_or_default().to_string()),
                    ("item_name", "Wallet Deposit".to_string()),
                    ("ipn_url", self.ipn_url.clone()),
                    ("custom", format!("{}{}", CUSTOM_PREFIX, user_id)),
                ],
            )
            .await?;

        tracing::debug!(txn_id = %result.txn_id, "CoinPayments transaction created");

        Ok(CryptoCheckout {
            txn_id: result.txn_id,
            address: result.address,
            amount: result.amount,
            checkout_url: result.checkout_url,
            status_url: result.status_url,
            qrcode_url: result.qrcode_url,
            timeout: result.timeout,
        })
    }

    async fn create_withdrawal(
        &self,
        amount: Decimal,
        address: &str,
        currency: Currency,
        note: &str,
    ) -> Result<CryptoPayout> {
        let result: WithdrawalResult = self
            .make_request(
                "create_withdrawal",
                &[
                    ("amount", amount.to_string()),
                    ("currency", currency.coinpayments_code().to_string()),
                    ("address", address.to_string()),
                    ("auto_confirm", "0".to_string()),
                    ("note", note.to_string()),
                ],
            )
            .await?;

        Ok(CryptoPayout {
            id: result.id,
            status: result.status,
        })
    }

    fn verify_ipn(&self, body: &[u8], hmac_hex: &str) -> bool {
        verify_signature(&self.ipn_secret, body, hmac_hex)
    }

    fn merchant_id(&self) -> &str {
        &self.merchant_id
    }
}

/// hex(HMAC-SHA512(key, body))
pub fn sign(key: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha512::new_from_slice(key.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid HMAC key: {}", e))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// 상수 시간 비교로 서명 검증
/// An empty secret never verifies
pub fn verify_signature(secret: &str, body: &[u8], hmac_hex: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Ok(expected) = hex::decode(hmac_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// CoinPayments IPN 알림
/// Parsed instant payment notification
#[derive(Debug, Clone, PartialEq)]
pub struct IpnNotification {
    pub ipn_mode: String,
    pub ipn_type: String,
    pub merchant: String,
    pub txn_id: String,
    pub status: i64,
    pub status_text: String,
    pub amount2: Decimal,
    pub currency2: String,
    pub custom: Option<String>,
}

impl IpnNotification {
    /// form-urlencoded 본문 파싱
    pub fn parse(body: &[u8]) -> Result<Self, String> {
        let fields: HashMap<String, String> = url::form_urlencoded::parse(body)
            .into_owned()
            .collect();

        let required = |name: &str| -> Result<String, String> {
            fields
                .get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("IPN field '{}' is missing", name))
        };

        let status = required("status")?
            .parse::<i64>()
            .map_err(|_| "IPN field 'status' is not an integer".to_string())?;
        let amount2 = Decimal::from_str(&required("amount2")?)
            .map_err(|_| "IPN field 'amount2' is not a decimal".to_string())?;

        Ok(Self {
            ipn_mode: required("ipn_mode")?,
            ipn_type: fields.get("ipn_type").cloned().unwrap_or_default(),
            merchant: required("merchant")?,
            txn_id: required("txn_id")?,
            status,
            status_text: fields.get("status_text").cloned().unwrap_or_default(),
            amount2,
            currency2: required("currency2")?,
            custom: fields.get("custom").cloned().filter(|v| !v.is_empty()),
        })
    }

    /// 100 이상 또는 2 (queued for nightly payout) 이면 입금 완료
    pub fn is_complete(&self) -> bool {
        self.status >= 100 || self.status == 2
    }

    pub fn is_failed(&self) -> bool {
        self.status < 0
    }

    /// custom = "TaskInn-<userId>"
    pub fn user_id(&self) -> Option<&str> {
        self.custom
            .as_deref()
            .and_then(|custom| custom.strip_prefix(CUSTOM_PREFIX))
            .filter(|id| !id.is_empty())
    }
}
