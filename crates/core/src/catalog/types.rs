//! Catalog data model: creators, packs, samples.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// A selling identity. `id` is the external identity reference from the
/// identity provider; `connected_account_id` stays null until payment
/// onboarding completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub display_name: String,
    pub username: String,
    pub connected_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Creator {
    /// Whether products can be provisioned on this creator's behalf.
    pub fn has_connected_account(&self) -> bool {
        self.connected_account_id
            .as_ref()
            .is_some_and(|id| !id.is_empty())
    }
}

/// Request to register a new creator.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCreator {
    pub id: String,
    pub display_name: String,
    pub username: String,
}

/// A published sellable bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pack {
    pub id: i64,
    pub creator_id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    /// Price in currency minor units (cents).
    pub price_cents: i64,
    pub cover_url: String,
    pub archive_url: String,
    pub archive_key: String,
    pub product_id: String,
    pub payment_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A preview asset attached to a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: i64,
    pub pack_id: i64,
    pub url: String,
    pub title: String,
}

/// Fully provisioned pack data, ready for the single durable write.
/// All URLs and processor identifiers must already be resolved.
#[derive(Debug, Clone)]
pub struct NewPack {
    pub creator_id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cover_url: String,
    pub archive_url: String,
    pub archive_key: String,
    pub product_id: String,
    pub payment_link: String,
}

/// Sample descriptor persisted alongside its pack.
#[derive(Debug, Clone)]
pub struct NewSample {
    pub url: String,
    pub title: String,
}

/// Fields rewritten when a pack's commerce terms change. The slug is
/// re-derived from the new title by the caller; the payment link is always
/// a freshly minted one (links are immutable at the processor).
#[derive(Debug, Clone)]
pub struct PackUpdate {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub payment_link: String,
}

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Derive the URL-safe slug for a pack title. Deterministic: the same title
/// always yields the same slug.
pub fn derive_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let hyphenated = NON_SLUG_CHARS.replace_all(&lowered, "-");
    hyphenated.trim_matches('-').to_string()
}
