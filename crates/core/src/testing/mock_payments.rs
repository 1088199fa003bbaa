//! Mock payment processor for testing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::commerce::{CommerceError, PaymentProcessor, ProductSpec, ProvisionedProduct};

/// Mock implementation of the PaymentProcessor trait.
///
/// Mints deterministic identifiers and records every provisioning call.
/// Individual operations can be primed to fail once, which is how pipeline
/// tests drive the saga into its failure branches.
pub struct MockPaymentProcessor {
    counter: AtomicU64,
    account_counter: AtomicU64,
    products: Mutex<Vec<(String, ProductSpec)>>,
    linked_prices: Mutex<Vec<String>>,
    updates: Mutex<Vec<(String, ProductSpec)>>,
    accounts: Mutex<Vec<String>>,
    requirements: Mutex<Vec<String>>,
    fail_product: Mutex<Option<CommerceError>>,
    fail_link: Mutex<Option<CommerceError>>,
    fail_update: Mutex<Option<CommerceError>>,
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPaymentProcessor {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            account_counter: AtomicU64::new(0),
            products: Mutex::new(Vec::new()),
            linked_prices: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            accounts: Mutex::new(Vec::new()),
            requirements: Mutex::new(Vec::new()),
            fail_product: Mutex::new(None),
            fail_link: Mutex::new(None),
            fail_update: Mutex::new(None),
        }
    }

    /// Fail the next create_product call.
    pub fn fail_next_product(&self, error: CommerceError) {
        *self.fail_product.lock().unwrap() = Some(error);
    }

    /// Fail the next create_payment_link call.
    pub fn fail_next_link(&self, error: CommerceError) {
        *self.fail_link.lock().unwrap() = Some(error);
    }

    /// Fail the next update_product call.
    pub fn fail_next_update(&self, error: CommerceError) {
        *self.fail_update.lock().unwrap() = Some(error);
    }

    /// Requirements reported for every account until changed.
    pub fn set_requirements_due(&self, due: Vec<String>) {
        *self.requirements.lock().unwrap() = due;
    }

    /// Every (account, spec) pair passed to create_product, in call order.
    pub fn created_products(&self) -> Vec<(String, ProductSpec)> {
        self.products.lock().unwrap().clone()
    }

    pub fn created_product_count(&self) -> usize {
        self.products.lock().unwrap().len()
    }

    /// Price ids payment links were minted for, in call order.
    pub fn linked_price_ids(&self) -> Vec<String> {
        self.linked_prices.lock().unwrap().clone()
    }

    /// Every (product_id, spec) pair passed to update_product.
    pub fn updated_products(&self) -> Vec<(String, ProductSpec)> {
        self.updates.lock().unwrap().clone()
    }

    /// Connected accounts created so far.
    pub fn created_accounts(&self) -> Vec<String> {
        self.accounts.lock().unwrap().clone()
    }

    fn next_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_product(
        &self,
        account: &str,
        spec: &ProductSpec,
    ) -> Result<ProvisionedProduct, CommerceError> {
        if let Some(err) = self.fail_product.lock().unwrap().take() {
            return Err(err);
        }

        let n = self.next_id();
        self.products
            .lock()
            .unwrap()
            .push((account.to_string(), spec.clone()));

        Ok(ProvisionedProduct {
            product_id: format!("prod_mock_{}", n),
            price_id: format!("price_mock_{}", n),
        })
    }

    async fn create_payment_link(
        &self,
        _account: &str,
        price_id: &str,
        _price_cents: i64,
    ) -> Result<String, CommerceError> {
        if let Some(err) = self.fail_link.lock().unwrap().take() {
            return Err(err);
        }

        self.linked_prices.lock().unwrap().push(price_id.to_string());
        Ok(format!("https://pay.test/link/{}", price_id))
    }

    async fn update_product(
        &self,
        _account: &str,
        product_id: &str,
        spec: &ProductSpec,
    ) -> Result<ProvisionedProduct, CommerceError> {
        if let Some(err) = self.fail_update.lock().unwrap().take() {
            return Err(err);
        }

        let n = self.next_id();
        self.updates
            .lock()
            .unwrap()
            .push((product_id.to_string(), spec.clone()));

        Ok(ProvisionedProduct {
            product_id: product_id.to_string(),
            price_id: format!("price_mock_{}", n),
        })
    }

    async fn create_connected_account(&self) -> Result<String, CommerceError> {
        // Accounts number independently of products so onboarding in a test
        // does not shift the product ids a later publish mints.
        let n = self.account_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let account = format!("acct_mock_{}", n);
        self.accounts.lock().unwrap().push(account.clone());
        Ok(account)
    }

    async fn create_onboarding_link(
        &self,
        account: &str,
        _refresh_url: &str,
        _return_url: &str,
    ) -> Result<String, CommerceError> {
        Ok(format!("https://onboard.test/{}", account))
    }

    async fn requirements_due(&self, _account: &str) -> Result<Vec<String>, CommerceError> {
        Ok(self.requirements.lock().unwrap().clone())
    }
}
