//! Commerce provisioning against the payment provider.
//!
//! Products, prices and payment links live on each creator's connected
//! account. This module also covers the account onboarding lifecycle.

mod processor;
mod stripe;
mod types;

pub use processor::PaymentProcessor;
pub use stripe::StripeConnectClient;
pub use types::{CommerceError, ProductSpec, ProvisionedProduct};
