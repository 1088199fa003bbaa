//! Types for commerce provisioning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What to sell: the product a pack is listed as.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSpec {
    pub name: String,
    pub description: Option<String>,
    /// Price in minor units (cents). Zero means a free pack.
    pub price_cents: i64,
    /// Public cover image shown on the provider-hosted product page.
    pub cover_url: String,
    /// Stable key binding the product to its deliverable, reused as the
    /// idempotency key when the product is first created.
    pub identity_key: String,
}

/// Identifiers minted by the payment provider for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedProduct {
    pub product_id: String,
    pub price_id: String,
}

/// Errors from the payment provider.
#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Payment provider error: {0}")]
    ApiError(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}
