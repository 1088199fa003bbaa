//! Request and result types for the publication pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::storage::AssetFile;

/// A complete publication submission: pack metadata plus every asset file.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub title: String,
    pub description: Option<String>,
    /// Price in major currency units as submitted, e.g. 9.99.
    pub price: f64,
    pub cover: AssetFile,
    pub archive: AssetFile,
    pub samples: Vec<AssetFile>,
}

/// Metadata-only changes to an already published pack.
///
/// Assets are never re-uploaded on update. The slug is re-derived from the
/// new title and a fresh payment link is always minted, because payment
/// links are immutable at the processor.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
}

/// Returned to the caller when a publication run reaches the persisted state.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedPack {
    pub slug: String,
    pub pack_id: i64,
    pub payment_link: String,
}

/// Returned when an update run completes. The slug may differ from the one
/// the caller addressed if the title changed.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedPack {
    pub slug: String,
    pub payment_link: String,
}

/// Returned when a pack is deleted from the catalog.
///
/// The listed storage keys and the product id still exist externally and
/// need out-of-band cleanup.
#[derive(Debug, Clone, Serialize)]
pub struct DeletedPack {
    pub slug: String,
    pub product_id: String,
    pub orphaned_keys: Vec<String>,
}

/// A freshly minted onboarding session at the payment processor.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingLink {
    pub account_id: String,
    pub url: String,
}

/// Where a creator stands with payment onboarding.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardingStatus {
    pub account_id: Option<String>,
    pub onboarding_complete: bool,
    pub requirements_due: Vec<String>,
}

/// Stages of a publication run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStage {
    CredentialIssuance,
    AssetUpload,
    CommerceProvisioning,
    Persistence,
}

impl PublishStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStage::CredentialIssuance => "credential_issuance",
            PublishStage::AssetUpload => "asset_upload",
            PublishStage::CommerceProvisioning => "commerce_provisioning",
            PublishStage::Persistence => "persistence",
        }
    }
}

/// Errors from the publication pipeline.
///
/// There is no automatic compensation: a stage failure leaves the side
/// effects of earlier stages in place, so the later variants carry the
/// identifiers of everything already created externally. Those identifiers
/// are also written to the audit log, which serves as the reconciliation
/// feed for manual cleanup.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Creator has no completed payment onboarding")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Credential issuance failed: {reason}")]
    CredentialIssuanceFailed { reason: String },

    #[error("Asset upload failed: {reason}")]
    AssetUploadFailed {
        reason: String,
        orphaned_keys: Vec<String>,
    },

    #[error("Product creation failed: {reason}")]
    ProductCreationFailed {
        reason: String,
        orphaned_keys: Vec<String>,
    },

    #[error("Payment link creation failed: {reason}")]
    PaymentLinkCreationFailed {
        reason: String,
        orphaned_keys: Vec<String>,
        orphaned_product_id: Option<String>,
    },

    #[error("Persistence failed: {reason}")]
    PersistenceFailed {
        reason: String,
        orphaned_keys: Vec<String>,
        orphaned_product_id: Option<String>,
    },

    #[error("Onboarding failed: {0}")]
    OnboardingFailed(String),
}

impl PublishError {
    /// The pipeline stage this error belongs to. `None` for rejections that
    /// happen before any side effect (validation, authorization, lookups).
    pub fn stage(&self) -> Option<PublishStage> {
        match self {
            PublishError::CredentialIssuanceFailed { .. } => {
                Some(PublishStage::CredentialIssuance)
            }
            PublishError::AssetUploadFailed { .. } => Some(PublishStage::AssetUpload),
            PublishError::ProductCreationFailed { .. }
            | PublishError::PaymentLinkCreationFailed { .. } => {
                Some(PublishStage::CommerceProvisioning)
            }
            PublishError::PersistenceFailed { .. } => Some(PublishStage::Persistence),
            _ => None,
        }
    }

    /// Storage keys of objects that were written before the failure.
    pub fn orphaned_keys(&self) -> &[String] {
        match self {
            PublishError::AssetUploadFailed { orphaned_keys, .. }
            | PublishError::ProductCreationFailed { orphaned_keys, .. }
            | PublishError::PaymentLinkCreationFailed { orphaned_keys, .. }
            | PublishError::PersistenceFailed { orphaned_keys, .. } => orphaned_keys,
            _ => &[],
        }
    }

    /// Processor product id created before the failure, if any.
    pub fn orphaned_product_id(&self) -> Option<&str> {
        match self {
            PublishError::PaymentLinkCreationFailed {
                orphaned_product_id,
                ..
            }
            | PublishError::PersistenceFailed {
                orphaned_product_id,
                ..
            } => orphaned_product_id.as_deref(),
            _ => None,
        }
    }

    /// Message safe to return to the caller. Internal detail stays in the
    /// logs and the audit trail.
    pub fn public_message(&self) -> &'static str {
        match self {
            PublishError::ValidationFailed(_) => "Invalid request",
            PublishError::Unauthorized => "A completed payment onboarding is required",
            PublishError::NotFound(_) => "Not found",
            PublishError::CredentialIssuanceFailed { .. } => "Could not prepare the upload",
            PublishError::AssetUploadFailed { .. } => "Asset upload did not complete",
            PublishError::ProductCreationFailed { .. } => "Could not create the product listing",
            PublishError::PaymentLinkCreationFailed { .. } => {
                "Could not create the checkout link"
            }
            PublishError::PersistenceFailed { .. } => "Could not save the pack",
            PublishError::OnboardingFailed(_) => "Could not start payment onboarding",
        }
    }
}
