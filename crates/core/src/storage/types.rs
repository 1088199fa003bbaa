//! Types for object storage credentials and uploads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which bucket an asset lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketScope {
    /// World-readable through the CDN.
    Public,
    /// Readable only through the purchase flow.
    Private,
}

/// The asset slots a publication consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Cover,
    Archive,
    Sample,
}

impl AssetKind {
    /// Storage key namespace for this kind.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            AssetKind::Cover => "covers",
            AssetKind::Archive => "archives",
            AssetKind::Sample => "samples",
        }
    }

    /// Deliverable archives are private; everything else is served publicly.
    pub fn bucket_scope(&self) -> BucketScope {
        match self {
            AssetKind::Archive => BucketScope::Private,
            AssetKind::Cover | AssetKind::Sample => BucketScope::Public,
        }
    }
}

/// A time-bounded single-object write credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteCredential {
    /// Storage key the credential writes to.
    pub key: String,
    /// Signed write URL, valid until the provider-enforced expiry.
    pub url: String,
}

/// One credential per asset slot for a single publication attempt.
/// Created fresh per attempt, consumed once, never persisted.
#[derive(Debug, Clone)]
pub struct UploadCredentialSet {
    pub cover: WriteCredential,
    pub archive: WriteCredential,
    pub samples: Vec<WriteCredential>,
}

impl UploadCredentialSet {
    /// Every storage key in the set, for orphan bookkeeping.
    pub fn storage_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.samples.len() + 2);
        keys.push(self.cover.key.clone());
        keys.push(self.archive.key.clone());
        keys.extend(self.samples.iter().map(|c| c.key.clone()));
        keys
    }
}

/// An in-memory file payload handed to the upload coordinator.
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Resolve the public URL a storage key is served under.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Recover the storage key a public URL was built from. Returns `None`
/// when the URL does not live under the given base.
pub fn key_from_public_url<'a>(base: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(base.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|key| !key.is_empty())
}

/// The durable object URL behind a signed URL, with the signature query
/// stripped. This is what gets persisted; the signed form expires.
pub fn object_url(signed_url: &str) -> &str {
    signed_url
        .split_once('?')
        .map_or(signed_url, |(base, _)| base)
}

/// Errors from the signing service and object uploads.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Signing service error: {0}")]
    ApiError(String),

    #[error("Upload rejected with HTTP {0}")]
    PutRejected(u16),

    #[error("Credential set has {expected} sample slots, got {actual} sample files")]
    SlotMismatch { expected: usize, actual: usize },

    #[error("{} upload(s) failed", failed.len())]
    UploadIncomplete {
        /// Slot label and reason for each failed upload.
        failed: Vec<(String, String)>,
        /// Keys of the slots whose upload completed; these objects are now
        /// orphans unless the attempt is retried to completion.
        uploaded_keys: Vec<String>,
    },
}
