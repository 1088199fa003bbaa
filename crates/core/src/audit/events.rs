use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    // System events
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    // Creator lifecycle
    CreatorRegistered {
        creator_id: String,
        username: String,
    },
    /// A connected account was created and a hosted onboarding link minted.
    OnboardingStarted {
        creator_id: String,
        account_id: String,
    },

    // Publication pipeline
    /// A publication attempt passed validation and entered the pipeline.
    PublicationStarted {
        creator_id: String,
        pack_slug: String,
        title: String,
        sample_count: u32,
    },
    /// Write credentials were minted for every asset slot of an attempt.
    CredentialsIssued {
        creator_id: String,
        pack_slug: String,
        storage_keys: Vec<String>,
    },
    /// Every asset of an attempt landed in object storage.
    AssetsUploaded {
        creator_id: String,
        pack_slug: String,
        asset_count: u32,
    },
    /// Product and payment link were provisioned on the connected account.
    CommerceProvisioned {
        creator_id: String,
        pack_slug: String,
        product_id: String,
        payment_link: String,
    },
    /// The pack and its samples were committed to the catalog.
    PackPublished {
        creator_id: String,
        pack_slug: String,
        pack_id: i64,
        price_cents: i64,
    },
    /// A publication attempt failed. External objects created before the
    /// failing stage are listed so they can be reconciled by hand.
    PublicationFailed {
        creator_id: String,
        pack_slug: String,
        stage: String,
        reason: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        orphaned_keys: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        orphaned_product_id: Option<String>,
    },

    // Catalog changes after publication
    PackUpdated {
        creator_id: String,
        old_slug: String,
        new_slug: String,
        product_id: String,
        /// Payment link replaced by this update. The provider never mutates
        /// links, so the old one stays live until reconciled.
        superseded_link: String,
    },
    /// Catalog rows are gone; the listed storage objects and the product
    /// remain at their providers until reconciled.
    PackDeleted {
        creator_id: String,
        pack_slug: String,
        product_id: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        orphaned_keys: Vec<String>,
    },
}

impl AuditEvent {
    /// Returns the event type as a string for storage
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::CreatorRegistered { .. } => "creator_registered",
            Self::OnboardingStarted { .. } => "onboarding_started",
            Self::PublicationStarted { .. } => "publication_started",
            Self::CredentialsIssued { .. } => "credentials_issued",
            Self::AssetsUploaded { .. } => "assets_uploaded",
            Self::CommerceProvisioned { .. } => "commerce_provisioned",
            Self::PackPublished { .. } => "pack_published",
            Self::PublicationFailed { .. } => "publication_failed",
            Self::PackUpdated { .. } => "pack_updated",
            Self::PackDeleted { .. } => "pack_deleted",
        }
    }

    /// Extract creator_id if this event is creator-scoped
    pub fn creator_id(&self) -> Option<&str> {
        match self {
            Self::CreatorRegistered { creator_id, .. }
            | Self::OnboardingStarted { creator_id, .. }
            | Self::PublicationStarted { creator_id, .. }
            | Self::CredentialsIssued { creator_id, .. }
            | Self::AssetsUploaded { creator_id, .. }
            | Self::CommerceProvisioned { creator_id, .. }
            | Self::PackPublished { creator_id, .. }
            | Self::PublicationFailed { creator_id, .. }
            | Self::PackUpdated { creator_id, .. }
            | Self::PackDeleted { creator_id, .. } => Some(creator_id),
            Self::ServiceStarted { .. } | Self::ServiceStopped { .. } => None,
        }
    }

    /// Extract pack_slug if this event is tied to one pack
    pub fn pack_slug(&self) -> Option<&str> {
        match self {
            Self::PublicationStarted { pack_slug, .. }
            | Self::CredentialsIssued { pack_slug, .. }
            | Self::AssetsUploaded { pack_slug, .. }
            | Self::CommerceProvisioned { pack_slug, .. }
            | Self::PackPublished { pack_slug, .. }
            | Self::PublicationFailed { pack_slug, .. }
            | Self::PackDeleted { pack_slug, .. } => Some(pack_slug),
            Self::PackUpdated { new_slug, .. } => Some(new_slug),
            _ => None,
        }
    }
}

/// A stored audit record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub creator_id: Option<String>,
    pub pack_slug: Option<String>,
    pub data: AuditEvent,
}
