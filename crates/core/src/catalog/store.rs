//! Catalog storage traits.

use std::fmt;

use crate::catalog::{Creator, NewCreator, NewPack, NewSample, Pack, PackUpdate, Sample};

/// Error type for catalog operations.
#[derive(Debug)]
pub enum CatalogError {
    /// No pack or creator matched the lookup.
    NotFound(String),
    /// A pack with this slug already exists for the creator.
    DuplicateSlug { creator_id: String, slug: String },
    /// A creator with this id or username already exists.
    DuplicateCreator(String),
    /// Database error.
    Database(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::NotFound(what) => write!(f, "Not found: {}", what),
            CatalogError::DuplicateSlug { creator_id, slug } => write!(
                f,
                "Pack slug already taken for creator {}: {}",
                creator_id, slug
            ),
            CatalogError::DuplicateCreator(id) => {
                write!(f, "Creator already registered: {}", id)
            }
            CatalogError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Storage backend for creators.
pub trait CreatorStore: Send + Sync {
    /// Register a new creator. The connected account id starts out null.
    fn create_creator(&self, request: NewCreator) -> Result<Creator, CatalogError>;

    /// Fetch a creator by external identity reference.
    fn get_creator(&self, id: &str) -> Result<Option<Creator>, CatalogError>;

    /// Fetch a creator by username.
    fn get_creator_by_username(&self, username: &str) -> Result<Option<Creator>, CatalogError>;

    /// Record the processor connected-account id once onboarding has started.
    fn set_connected_account(&self, id: &str, account_id: &str) -> Result<Creator, CatalogError>;
}

/// Storage backend for packs and their samples.
///
/// `create_pack` and `delete_pack` are the two transactional writes: a pack
/// and its samples become visible, or disappear, as one unit.
pub trait PackStore: Send + Sync {
    /// Insert the pack row and all sample rows atomically. Enforces slug
    /// uniqueness per creator; a late-arriving duplicate fails with
    /// [`CatalogError::DuplicateSlug`] and writes nothing.
    fn create_pack(&self, pack: NewPack, samples: Vec<NewSample>) -> Result<Pack, CatalogError>;

    /// Fetch a pack by creator and slug.
    fn get_pack(&self, creator_id: &str, slug: &str) -> Result<Option<Pack>, CatalogError>;

    /// Fetch a pack and its samples by creator and slug.
    fn get_pack_with_samples(
        &self,
        creator_id: &str,
        slug: &str,
    ) -> Result<Option<(Pack, Vec<Sample>)>, CatalogError>;

    /// List a creator's packs, newest first.
    fn list_packs(&self, creator_id: &str) -> Result<Vec<Pack>, CatalogError>;

    /// Rewrite a pack's title, description, price, slug and payment link.
    fn update_pack(
        &self,
        creator_id: &str,
        slug: &str,
        update: PackUpdate,
    ) -> Result<Pack, CatalogError>;

    /// Delete the pack and all its samples in one transaction. Returns the
    /// deleted pack so callers can record the orphaned external identifiers.
    fn delete_pack(&self, creator_id: &str, slug: &str) -> Result<Pack, CatalogError>;

    /// Total number of packs in the catalog.
    fn count_packs(&self) -> Result<i64, CatalogError>;
}
