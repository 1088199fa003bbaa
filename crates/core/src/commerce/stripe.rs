//! Stripe Connect client.
//!
//! Talks to the Stripe HTTP API with form-encoded requests. Product and
//! link operations run as direct charges on the creator's connected
//! account via the `Stripe-Account` header; account operations run on the
//! platform account.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::commerce::processor::PaymentProcessor;
use crate::commerce::types::{CommerceError, ProductSpec, ProvisionedProduct};
use crate::config::PaymentsConfig;
use crate::metrics;

const CONNECTED_ACCOUNT_HEADER: &str = "Stripe-Account";
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";
const CURRENCY: &str = "usd";

pub struct StripeConnectClient {
    client: Client,
    config: PaymentsConfig,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    id: String,
    default_price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct LinkResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    id: String,
    #[serde(default)]
    requirements: Option<AccountRequirements>,
}

#[derive(Debug, Deserialize, Default)]
struct AccountRequirements {
    #[serde(default)]
    currently_due: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Platform cut withheld from one sale, in minor units.
fn fee_amount(price_cents: i64, percent: f64) -> i64 {
    (price_cents as f64 * percent / 100.0).round() as i64
}

fn product_params(spec: &ProductSpec) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("name", spec.name.clone()),
        ("default_price_data[currency]", CURRENCY.to_string()),
        (
            "default_price_data[unit_amount]",
            spec.price_cents.to_string(),
        ),
        ("images[0]", spec.cover_url.clone()),
        // Binds the product to its deliverable for fulfillment and
        // reconciliation lookups.
        ("metadata[storage_key]", spec.identity_key.clone()),
    ];
    if let Some(description) = &spec.description {
        params.push(("description", description.clone()));
    }
    params
}

impl StripeConnectClient {
    pub fn new(config: PaymentsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn post_form(
        &self,
        path: &str,
        account: Option<&str>,
        idempotency_key: Option<&str>,
        params: &[(&'static str, String)],
    ) -> Result<Response, CommerceError> {
        metrics::EXTERNAL_REQUESTS
            .with_label_values(&["payments"])
            .inc();

        let idempotency = idempotency_key
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut request = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .header(IDEMPOTENCY_HEADER, idempotency)
            .form(params);

        if let Some(account) = account {
            request = request.header(CONNECTED_ACCOUNT_HEADER, account);
        }

        let response = request.send().await.map_err(map_network_error)?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        Ok(response)
    }

    async fn get(&self, path: &str) -> Result<Response, CommerceError> {
        metrics::EXTERNAL_REQUESTS
            .with_label_values(&["payments"])
            .inc();

        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(map_network_error)?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        Ok(response)
    }
}

fn map_network_error(e: reqwest::Error) -> CommerceError {
    if e.is_timeout() {
        CommerceError::Timeout
    } else if e.is_connect() {
        CommerceError::ConnectionFailed(e.to_string())
    } else {
        CommerceError::ApiError(e.to_string())
    }
}

async fn read_error(response: Response) -> CommerceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => CommerceError::ApiError(format!("{}: {}", status, parsed.error.message)),
        Err(_) => CommerceError::ApiError(format!(
            "{}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )),
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, CommerceError> {
    response
        .json()
        .await
        .map_err(|e| CommerceError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl PaymentProcessor for StripeConnectClient {
    async fn create_product(
        &self,
        account: &str,
        spec: &ProductSpec,
    ) -> Result<ProvisionedProduct, CommerceError> {
        debug!(account, name = %spec.name, "Creating product");

        // The identity key is fresh per publication attempt, so a retried
        // request within one attempt dedupes while retried attempts do not.
        let response = self
            .post_form(
                "products",
                Some(account),
                Some(&spec.identity_key),
                &product_params(spec),
            )
            .await?;
        let product: ProductResponse = parse_json(response).await?;

        let price_id = product.default_price.ok_or_else(|| {
            CommerceError::InvalidResponse(format!(
                "Product {} created without a default price",
                product.id
            ))
        })?;

        Ok(ProvisionedProduct {
            product_id: product.id,
            price_id,
        })
    }

    async fn create_payment_link(
        &self,
        account: &str,
        price_id: &str,
        price_cents: i64,
    ) -> Result<String, CommerceError> {
        debug!(account, price_id, "Creating payment link");

        let mut params = vec![
            ("line_items[0][price]", price_id.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
        ];
        let fee = fee_amount(price_cents, self.config.application_fee_percent);
        if fee > 0 {
            params.push((
                "payment_intent_data[application_fee_amount]",
                fee.to_string(),
            ));
        }

        let response = self
            .post_form("payment_links", Some(account), None, &params)
            .await?;
        let link: LinkResponse = parse_json(response).await?;

        Ok(link.url)
    }

    async fn update_product(
        &self,
        account: &str,
        product_id: &str,
        spec: &ProductSpec,
    ) -> Result<ProvisionedProduct, CommerceError> {
        debug!(account, product_id, "Updating product");

        // Prices are immutable, so mint a replacement and make it the default.
        let price_params = vec![
            ("currency", CURRENCY.to_string()),
            ("unit_amount", spec.price_cents.to_string()),
            ("product", product_id.to_string()),
        ];
        let response = self
            .post_form("prices", Some(account), None, &price_params)
            .await?;
        let price: PriceResponse = parse_json(response).await?;

        let mut params = vec![
            ("name", spec.name.clone()),
            ("default_price", price.id.clone()),
        ];
        if let Some(description) = &spec.description {
            params.push(("description", description.clone()));
        }
        self.post_form(
            &format!("products/{}", product_id),
            Some(account),
            None,
            &params,
        )
        .await?;

        Ok(ProvisionedProduct {
            product_id: product_id.to_string(),
            price_id: price.id,
        })
    }

    async fn create_connected_account(&self) -> Result<String, CommerceError> {
        let params = vec![
            ("controller[stripe_dashboard][type]", "express".to_string()),
            ("controller[fees][payer]", "application".to_string()),
            ("controller[losses][payments]", "application".to_string()),
        ];

        let response = self.post_form("accounts", None, None, &params).await?;
        let created: AccountResponse = parse_json(response).await?;

        Ok(created.id)
    }

    async fn create_onboarding_link(
        &self,
        account: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<String, CommerceError> {
        let params = vec![
            ("account", account.to_string()),
            ("refresh_url", refresh_url.to_string()),
            ("return_url", return_url.to_string()),
            ("type", "account_onboarding".to_string()),
        ];

        let response = self.post_form("account_links", None, None, &params).await?;
        let link: LinkResponse = parse_json(response).await?;

        Ok(link.url)
    }

    async fn requirements_due(&self, account: &str) -> Result<Vec<String>, CommerceError> {
        let response = self.get(&format!("accounts/{}", account)).await?;
        let fetched: AccountResponse = parse_json(response).await?;

        Ok(fetched
            .requirements
            .map(|r| r.currently_due)
            .unwrap_or_default())
    }
}
