use std::str::FromStr;
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use crate::shared::clients::{CapturedOrder, CardRail, CreatedOrder};
use crate::shared::config::PayPalSettings;

const SANDBOX_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
const LIVE_BASE_URL: &str = "https://api-m.paypal.com";

// PayPal REST 클라이언트
// 역할: 주문 생성 / 캡처 (OAuth2 client credentials)
// PayPal REST client for the card rail
#[derive(Clone)]
pub struct PayPalClient {
    http_client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct OrderDetails {
    #[serde(default)]
    purchase_units: Vec<OrderUnit>,
}

#[derive(Debug, Deserialize)]
struct OrderUnit {
    custom_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    id: String,
    status: String,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct PurchaseUnit {
    custom_id: Option<String>,
    payments: Option<Payments>,
}

#[derive(Debug, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    id: String,
    custom_id: Option<String>,
    amount: Money,
}

#[derive(Debug, Deserialize)]
struct Money {
    currency_code: String,
    value: String,
}

impl PayPalClient {
    // 클라이언트 생성
    // Create new PayPal client (mode: "sandbox" | "live")
    pub fn new(settings: &PayPalSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = if settings.mode.eq_ignore_ascii_case("live") {
            LIVE_BASE_URL
        } else {
            SANDBOX_BASE_URL
        };

        Ok(Self {
            http_client,
            base_url: base_url.to_string(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
        })
    }

    // Access Token 발급
    async fn access_token(&self) -> Result<String> {
        let credentials = general_purpose::STANDARD
            .encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http_client
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .header("Authorization", format!("Basic {}", credentials))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .context("Failed to request PayPal access token")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("PayPal token endpoint returned error: {} - {}", status, body);
        }

        let token: AccessToken = response
            .json()
            .await
            .context("Failed to parse PayPal token response")?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl CardRail for PayPalClient {
    async fn create_order(
        &self,
        user_id: &str,
        amount: Decimal,
        return_url: &str,
        cancel_url: &str,
    ) -> Result<CreatedOrder> {
        let access_token = self.access_token().await?;

        let order = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": "USD",
                    "value": amount.round_dp(2).to_string(),
                },
                "description": "TaskInn Wallet Deposit",
                "custom_id": user_id,
            }],
            "application_context": {
                "return_url": return_url,
                "cancel_url": cancel_url,
                "brand_name": "TaskInn",
                "user_action": "PAY_NOW",
            },
        });

        let response = self
            .http_client
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(&access_token)
            .json(&order)
            .send()
            .await
            .context("Failed to send create-order request to PayPal")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("PayPal create order returned error: {} - {}", status, body);
        }

        let order: OrderResponse = response
            .json()
            .await
            .context("Failed to parse PayPal order response")?;

        tracing::debug!(order_id = %order.id, status = %order.status, "PayPal order created");

        let approval_url = order
            .links
            .into_iter()
            .find(|link| link.rel == "approve")
            .map(|link| link.href);

        Ok(CreatedOrder {
            order_id: order.id,
            status: order.status,
            approval_url,
        })
    }

    async fn order_owner(&self, order_id: &str) -> Result<Option<String>> {
        let access_token = self.access_token().await?;

        let response = self
            .http_client
            .get(format!("{}/v2/checkout/orders/{}", self.base_url, order_id))
            .bearer_auth(&access_token)
            .send()
            .await
            .context("Failed to send order lookup request to PayPal")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("PayPal order lookup returned error: {} - {}", status, body);
        }

        let order: OrderDetails = response
            .json()
            .await
            .context("Failed to parse PayPal order details")?;

        Ok(order.purchase_units.into_iter().find_map(|unit| unit.custom_id))
    }

    async fn capture_order(&self, order_id: &str) -> Result<CapturedOrder> {
        let access_token = self.access_token().await?;

        let response = self
            .http_client
            .post(format!("{}/v2/checkout/orders/{}/capture", self.base_url, order_id))
            .bearer_auth(&access_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("Failed to send capture request to PayPal")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("PayPal capture returned error: {} - {}", status, body);
        }

        let capture: CaptureResponse = response
            .json()
            .await
            .context("Failed to parse PayPal capture response")?;

        captured_order(capture)
    }
}

// 캡처 응답에서 금액 추출 (float 변환 없이 문자열 → Decimal)
fn captured_order(capture: CaptureResponse) -> Result<CapturedOrder> {
    let unit = capture
        .purchase_units
        .into_iter()
        .find(|unit| unit.payments.as_ref().is_some_and(|p| !p.captures.is_empty()))
        .context("PayPal capture response has no capture")?;
    let unit_custom_id = unit.custom_id;
    let first = unit
        .payments
        .and_then(|payments| payments.captures.into_iter().next())
        .context("PayPal capture response has no capture")?;

    let amount = Decimal::from_str(&first.amount.value)
        .with_context(|| format!("Invalid PayPal amount: {}", first.amount.value))?;

    Ok(CapturedOrder {
        order_id: capture.id,
        status: capture.status,
        amount,
        currency_code: first.amount.currency_code,
        capture_id: Some(first.id),
        custom_id: first.custom_id.or(unit_custom_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_capture_amount_as_decimal() {
        let body = r#"{
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "payments": {
                    "captures": [{
                        "id": "3C679366HH908993F",
                        "custom_id": "user-42",
                        "amount": { "currency_code": "USD", "value": "100.10" }
                    }]
                }
            }]
        }"#;
        let capture: CaptureResponse = serde_json::from_str(body).unwrap();
        let order = captured_order(capture).unwrap();

        assert!(order.is_completed());
        assert_eq!(order.amount, Decimal::new(10010, 2));
        assert_eq!(order.currency_code, "USD");
        assert_eq!(order.capture_id.as_deref(), Some("3C679366HH908993F"));
        assert_eq!(order.custom_id.as_deref(), Some("user-42"));
    }

    #[test]
    fn order_owner_is_read_from_purchase_unit() {
        let order: OrderDetails = serde_json::from_str(
            r#"{"id":"5O190127TN364715T","purchase_units":[{"custom_id":"user-42","amount":{"currency_code":"USD","value":"10.00"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            order.purchase_units.into_iter().find_map(|unit| unit.custom_id).as_deref(),
            Some("user-42")
        );
    }

    #[test]
    fn capture_without_units_is_an_error() {
        let capture: CaptureResponse =
            serde_json::from_str(r#"{"id":"X","status":"COMPLETED"}"#).unwrap();
        assert!(captured_order(capture).is_err());
    }
}
