use crate::error::LimitterError;
use crate::models::CheckoutSession;
use serde::Deserialize;

/// Thin adapter over the payment gateway's REST API. Both operations are
/// single round trips with no retries; a failure is terminal for the request.
pub struct StripeGateway {
    client: reqwest::Client,
    api_url: String,
    secret_key: String,
}

#[derive(Deserialize)]
struct IntentCreated {
    client_secret: String,
}

#[derive(Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Deserialize)]
struct GatewayErrorDetail {
    message: String,
}

impl StripeGateway {
    pub fn new(api_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        }
    }

    /// Converts a major-unit amount to minor units the way the gateway
    /// expects: multiply by 100 and round to the nearest integer.
    pub fn to_minor_units(amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }

    /// Creates a payment intent with automatic payment-method detection and
    /// the purchase context attached as opaque metadata. Returns the client
    /// secret the browser uses to confirm the charge. Intentionally carries
    /// no idempotency key: two identical calls create two distinct intents.
    pub async fn create_payment_intent(
        &self,
        amount: f64,
        payment_type: &str,
        quantity: Option<u32>,
        plan: Option<&str>,
    ) -> Result<String, LimitterError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(LimitterError::Validation(
                "Amount must be a positive number".to_string(),
            ));
        }

        let minor_units = Self::to_minor_units(amount);
        let quantity = quantity.unwrap_or(1);

        let mut form: Vec<(String, String)> = vec![
            ("amount".to_string(), minor_units.to_string()),
            ("currency".to_string(), "usd".to_string()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
            (
                "metadata[paymentType]".to_string(),
                payment_type.to_string(),
            ),
            ("metadata[quantity]".to_string(), quantity.to_string()),
        ];
        if let Some(plan) = plan {
            form.push(("metadata[plan]".to_string(), plan.to_string()));
        }

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| LimitterError::PaymentGateway(e.to_string()))?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            return Err(LimitterError::PaymentGateway(message));
        }

        let intent: IntentCreated = response
            .json()
            .await
            .map_err(|e| LimitterError::PaymentGateway(e.to_string()))?;

        tracing::info!(minor_units, payment_type, "Payment intent created");
        Ok(intent.client_secret)
    }

    /// Retrieves a checkout session with the nested payment intent, setup
    /// intent, and their payment methods expanded in one round trip. Gateway
    /// error detail is logged, not surfaced, so gateway internals never reach
    /// the caller.
    pub async fn get_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, LimitterError> {
        if session_id.trim().is_empty() {
            return Err(LimitterError::Validation(
                "Session ID is required".to_string(),
            ));
        }

        let expand = [
            ("expand[]", "payment_intent"),
            ("expand[]", "payment_intent.payment_method"),
            ("expand[]", "setup_intent"),
            ("expand[]", "setup_intent.payment_method"),
        ];

        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.api_url, session_id
            ))
            .bearer_auth(&self.secret_key)
            .query(&expand)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Session retrieval failed: {}", e);
                LimitterError::PaymentGateway("Failed to retrieve session".to_string())
            })?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            tracing::error!("Session retrieval rejected: {}", message);
            return Err(LimitterError::PaymentGateway(
                "Failed to retrieve session".to_string(),
            ));
        }

        response.json().await.map_err(|e| {
            tracing::error!("Malformed session payload: {}", e);
            LimitterError::PaymentGateway("Failed to retrieve session".to_string())
        })
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<GatewayErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("Gateway returned {}", status),
        }
    }
}
