//! Pack publication: the orchestration that turns an upload request into a
//! sellable catalog entry.
//!
//! A publication run walks four stages in strict order: credential
//! issuance, asset upload, commerce provisioning, catalog persistence.
//! Each stage depends on identifiers minted by the previous one, and
//! nothing is rolled back on failure; the audit trail carries what was
//! left behind.

mod pipeline;
mod types;
mod validate;

pub use pipeline::PackPublisher;
pub use types::{
    DeletedPack, OnboardingLink, OnboardingStatus, PublishError, PublishRequest, PublishStage,
    PublishedPack, UpdateRequest, UpdatedPack,
};
pub use validate::{
    ValidatedPack, DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, TITLE_MAX_CHARS, TITLE_MIN_CHARS,
};
