//! Payment gateway integration via the Stripe REST API (no SDK dependency).
//!
//! Amounts are always computed server-side from the pricing engine's output
//! and passed in minor units; nothing client-supplied reaches the gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use badgekit_core::OrderId;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway request failed: {0}")]
    Request(String),

    #[error("payment gateway returned an unexpected response: {0}")]
    Malformed(String),
}

/// A payment intent as the gateway reports it.
///
/// `status` carries the gateway's own vocabulary (`requires_payment_method`,
/// `succeeded`, ...); the order state machine is driven by our statuses, not
/// these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for `amount_minor` minor units (cents).
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        order_id: OrderId,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Fetch the current state of an intent.
    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError>;
}

#[async_trait]
impl<G> PaymentGateway for Arc<G>
where
    G: PaymentGateway + ?Sized,
{
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        order_id: OrderId,
    ) -> Result<PaymentIntent, GatewayError> {
        (**self).create_intent(amount_minor, currency, order_id).await
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        (**self).retrieve_intent(intent_id).await
    }
}

/// Stripe-backed gateway.
///
/// Talks to the REST API directly with form-encoded requests and basic auth,
/// with the secret key injected at construction.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: STRIPE_API_BASE.to_string(),
        }
    }

    /// Point at a different endpoint (stripe-mock, test doubles).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn intent_from_response(resp: &serde_json::Value) -> Result<PaymentIntent, GatewayError> {
        let id = resp["id"]
            .as_str()
            .ok_or_else(|| GatewayError::Malformed(format!("missing intent id: {resp}")))?;
        let status = resp["status"]
            .as_str()
            .ok_or_else(|| GatewayError::Malformed(format!("missing intent status: {resp}")))?;
        Ok(PaymentIntent {
            id: id.to_string(),
            client_secret: resp["client_secret"].as_str().map(String::from),
            status: status.to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        order_id: OrderId,
    ) -> Result<PaymentIntent, GatewayError> {
        let amount = amount_minor.to_string();
        let order_id = order_id.to_string();
        let resp: serde_json::Value = self
            .http
            .post(format!("{}/payment_intents", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", currency),
                ("metadata[order_id]", order_id.as_str()),
                ("automatic_payment_methods[enabled]", "true"),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Self::intent_from_response(&resp)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        let resp: serde_json::Value = self
            .http
            .get(format!("{}/payment_intents/{intent_id}", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        Self::intent_from_response(&resp)
    }
}

/// Gateway double for tests/dev: hands out sequential intent ids and
/// remembers what it created.
#[derive(Debug, Default)]
pub struct MockPaymentGateway {
    counter: AtomicU64,
    intents: Mutex<HashMap<String, PaymentIntent>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a created intent to `succeeded`, as a confirmed card payment would.
    pub fn settle_intent(&self, intent_id: &str) {
        if let Ok(mut intents) = self.intents.lock() {
            if let Some(intent) = intents.get_mut(intent_id) {
                intent.status = "succeeded".to_string();
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_intent(
        &self,
        _amount_minor: i64,
        _currency: &str,
        _order_id: OrderId,
    ) -> Result<PaymentIntent, GatewayError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let intent = PaymentIntent {
            id: format!("pi_mock_{n}"),
            client_secret: Some(format!("pi_mock_{n}_secret")),
            status: "requires_payment_method".to_string(),
        };
        self.intents
            .lock()
            .map_err(|_| GatewayError::Request("lock poisoned".to_string()))?
            .insert(intent.id.clone(), intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, GatewayError> {
        self.intents
            .lock()
            .map_err(|_| GatewayError::Request("lock poisoned".to_string()))?
            .get(intent_id)
            .cloned()
            .ok_or_else(|| GatewayError::Malformed(format!("unknown intent '{intent_id}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_gateway_issues_and_settles_intents() {
        let gateway = MockPaymentGateway::new();
        let intent = gateway
            .create_intent(58_172, "aud", OrderId::new())
            .await
            .unwrap();
        assert_eq!(intent.status, "requires_payment_method");
        assert!(intent.client_secret.is_some());

        gateway.settle_intent(&intent.id);
        let settled = gateway.retrieve_intent(&intent.id).await.unwrap();
        assert_eq!(settled.status, "succeeded");
    }

    #[tokio::test]
    async fn unknown_intent_is_malformed() {
        let gateway = MockPaymentGateway::new();
        assert!(matches!(
            gateway.retrieve_intent("pi_nope").await,
            Err(GatewayError::Malformed(_))
        ));
    }

    #[test]
    fn stripe_response_parsing() {
        let resp = serde_json::json!({
            "id": "pi_123",
            "client_secret": "pi_123_secret",
            "status": "requires_payment_method"
        });
        let intent = StripeGateway::intent_from_response(&resp).unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret"));

        let error_resp = serde_json::json!({
            "error": { "message": "Invalid API Key provided" }
        });
        assert!(StripeGateway::intent_from_response(&error_resp).is_err());
    }
}
