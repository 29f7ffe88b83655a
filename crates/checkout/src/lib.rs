//! Stripe Checkout session creation.
//!
//! One fixed-price line item per session; on success the caller redirects
//! the client to the hosted checkout URL. Provider failures surface verbatim
//! to the caller with no retry and no local fallback. Talks to Stripe's REST
//! API directly (form-encoded, bearer-authenticated).

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckoutError>;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_DOMAIN: &str = "http://localhost:5000";
pub const PRODUCT_NAME: &str = "Big 5 Detailed Archetype Report";

/// $0.99, in cents.
pub const UNIT_AMOUNT_CENTS: u64 = 99;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("STRIPE_SECRET_KEY is not configured")]
    MissingSecretKey,

    #[error("invalid redirect URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment provider rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("payment provider returned no checkout URL")]
    MissingSessionUrl,
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Stripe secret key. Empty means checkout is unavailable.
    pub secret_key: String,
    /// Externally visible base URL embedded in redirect targets.
    pub domain: String,
    /// Provider endpoint; overridden in tests.
    pub api_base: String,
}

impl CheckoutConfig {
    #[must_use]
    pub fn new(secret_key: String, domain: String) -> Self {
        Self {
            secret_key,
            domain,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

pub struct CheckoutGateway {
    client: reqwest::Client,
    config: CheckoutConfig,
}

impl CheckoutGateway {
    pub fn new(config: CheckoutConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Create a checkout session for one report and return the hosted URL.
    pub async fn create_session(&self, trait_code: &str) -> Result<String> {
        if self.config.secret_key.is_empty() {
            return Err(CheckoutError::MissingSecretKey);
        }

        let form = self.session_form(trait_code)?;
        let endpoint = format!("{}/v1/checkout/sessions", self.config.api_base);
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = provider_message(&body);
            log::error!("Stripe session creation failed ({status}): {message}");
            return Err(CheckoutError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: SessionEnvelope = serde_json::from_str(&body)
            .map_err(|_| CheckoutError::MissingSessionUrl)?;
        envelope.url.ok_or(CheckoutError::MissingSessionUrl)
    }

    fn session_form(&self, trait_code: &str) -> Result<Vec<(String, String)>> {
        let amount = UNIT_AMOUNT_CENTS.to_string();
        Ok(vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                "usd".to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                PRODUCT_NAME.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                amount,
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "success_url".to_string(),
                success_url(&self.config.domain, trait_code)?,
            ),
            ("cancel_url".to_string(), format!("{}/", self.config.domain)),
        ])
    }
}

/// Success destination carrying the code and the paid-confirmation flag.
fn success_url(domain: &str, trait_code: &str) -> Result<String> {
    let mut target = url::Url::parse(&format!("{domain}/api/render-report"))?;
    target
        .query_pairs_mut()
        .append_pair("code", trait_code)
        .append_pair("paid", "true");
    Ok(target.to_string())
}

fn provider_message(body: &str) -> String {
    match serde_json::from_str::<ProviderErrorEnvelope>(body) {
        Ok(envelope) => envelope
            .error
            .and_then(|e| e.message)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}
