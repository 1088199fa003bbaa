//! Payment processor abstraction.

use async_trait::async_trait;

use crate::commerce::types::{CommerceError, ProductSpec, ProvisionedProduct};

/// Provisions products, prices and payment links on a creator's connected
/// account, and manages the account's onboarding lifecycle.
///
/// All product operations are charged against the connected account given
/// by `account`; the platform account only brokers them.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a product with an attached default price.
    async fn create_product(
        &self,
        account: &str,
        spec: &ProductSpec,
    ) -> Result<ProvisionedProduct, CommerceError>;

    /// Mint a shareable checkout link for an existing price.
    async fn create_payment_link(
        &self,
        account: &str,
        price_id: &str,
        price_cents: i64,
    ) -> Result<String, CommerceError>;

    /// Update a product's listing and attach a fresh default price.
    /// Prices are immutable at the provider, so every update mints a new one.
    async fn update_product(
        &self,
        account: &str,
        product_id: &str,
        spec: &ProductSpec,
    ) -> Result<ProvisionedProduct, CommerceError>;

    /// Create a connected account for a creator. Returns the account id.
    async fn create_connected_account(&self) -> Result<String, CommerceError>;

    /// Mint a hosted onboarding link for a connected account.
    async fn create_onboarding_link(
        &self,
        account: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<String, CommerceError>;

    /// Requirements the account must still satisfy before it can take
    /// payments. Empty means onboarding is complete.
    async fn requirements_due(&self, account: &str) -> Result<Vec<String>, CommerceError>;
}
