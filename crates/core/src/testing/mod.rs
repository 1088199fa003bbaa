//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service
//! traits (signing service, object storage, payment provider), allowing
//! full pipeline tests without real infrastructure. Catalog and audit
//! tests use the in-memory SQLite stores directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use cratedig_core::testing::{fixtures, MockCredentialSigner, MockObjectUploader, MockPaymentProcessor};
//!
//! let signer = MockCredentialSigner::new();
//! let uploader = MockObjectUploader::new();
//! let payments = MockPaymentProcessor::new();
//!
//! // Prime a failure
//! payments.fail_next_link(CommerceError::Timeout);
//!
//! // Use in a PackPublisher...
//! ```

mod mock_payments;
mod mock_signer;
mod mock_uploader;

pub use mock_payments::MockPaymentProcessor;
pub use mock_signer::MockCredentialSigner;
pub use mock_uploader::{MockObjectUploader, RecordedPut};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::NewCreator;
    use crate::publisher::PublishRequest;
    use crate::storage::AssetFile;

    /// Create a small in-memory asset file.
    pub fn asset_file(name: &str, content_type: &str) -> AssetFile {
        AssetFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0xAB; 64],
        }
    }

    /// Cover image for a publication attempt.
    pub fn cover_file() -> AssetFile {
        asset_file("cover.png", "image/png")
    }

    /// Deliverable archive for a publication attempt.
    pub fn archive_file() -> AssetFile {
        asset_file("pack.zip", "application/zip")
    }

    /// Preview audio files for a publication attempt.
    pub fn sample_files(count: usize) -> Vec<AssetFile> {
        (1..=count)
            .map(|i| asset_file(&format!("sample-{}.mp3", i), "audio/mpeg"))
            .collect()
    }

    /// Create a test creator registration.
    pub fn new_creator(id: &str, username: &str) -> NewCreator {
        NewCreator {
            id: id.to_string(),
            display_name: username.to_string(),
            username: username.to_string(),
        }
    }

    /// Create a complete publish request with reasonable defaults.
    pub fn publish_request(title: &str, price: f64, sample_count: usize) -> PublishRequest {
        PublishRequest {
            title: title.to_string(),
            description: Some("Dusty drum breaks and one-shots.".to_string()),
            price,
            cover: cover_file(),
            archive: archive_file(),
            samples: sample_files(sample_count),
        }
    }
}
