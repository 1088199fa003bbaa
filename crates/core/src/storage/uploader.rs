//! Upload coordinator: pushes asset bytes through signed write URLs.
//!
//! Uploads for one attempt run in parallel. A failing slot never cancels
//! its siblings; the coordinator waits for every transfer and reports which
//! keys made it so the caller can account for orphaned objects.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use crate::metrics;
use crate::storage::types::{AssetFile, StorageError, UploadCredentialSet, WriteCredential};

/// Writes one object through a signed URL.
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    async fn put(
        &self,
        credential: &WriteCredential,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError>;
}

/// Uploader performing plain HTTP PUTs against signed URLs.
pub struct HttpObjectUploader {
    client: Client,
}

impl HttpObjectUploader {
    pub fn new(timeout_secs: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl ObjectUploader for HttpObjectUploader {
    async fn put(
        &self,
        credential: &WriteCredential,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        metrics::EXTERNAL_REQUESTS
            .with_label_values(&["storage"])
            .inc();

        let response = self
            .client
            .put(&credential.url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StorageError::Timeout
                } else if e.is_connect() {
                    StorageError::ConnectionFailed(e.to_string())
                } else {
                    StorageError::ApiError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(StorageError::PutRejected(response.status().as_u16()));
        }

        metrics::UPLOAD_BYTES.inc_by(bytes.len() as u64);
        Ok(())
    }
}

/// Upload every asset of one attempt through its matching credential.
///
/// Transfers run concurrently and all of them are awaited. On any failure
/// the attempt fails with the keys that did complete, since those objects
/// now sit in storage without a catalog row pointing at them.
pub async fn upload_assets(
    uploader: &dyn ObjectUploader,
    credentials: &UploadCredentialSet,
    cover: &AssetFile,
    archive: &AssetFile,
    samples: &[AssetFile],
) -> Result<(), StorageError> {
    if credentials.samples.len() != samples.len() {
        return Err(StorageError::SlotMismatch {
            expected: credentials.samples.len(),
            actual: samples.len(),
        });
    }

    let mut transfers: Vec<(String, &WriteCredential, &AssetFile)> = vec![
        ("cover".to_string(), &credentials.cover, cover),
        ("archive".to_string(), &credentials.archive, archive),
    ];
    for (i, (credential, file)) in credentials.samples.iter().zip(samples).enumerate() {
        transfers.push((format!("sample-{}", i), credential, file));
    }

    let results = join_all(transfers.into_iter().map(|(slot, credential, file)| async move {
        let result = uploader
            .put(credential, &file.content_type, &file.bytes)
            .await;
        (slot, credential.key.clone(), result)
    }))
    .await;

    let mut failed = Vec::new();
    let mut uploaded_keys = Vec::new();
    for (slot, key, result) in results {
        match result {
            Ok(()) => {
                debug!(slot, key, "Asset uploaded");
                uploaded_keys.push(key);
            }
            Err(e) => {
                warn!(slot, key, error = %e, "Asset upload failed");
                failed.push((slot, e.to_string()));
            }
        }
    }

    if !failed.is_empty() {
        return Err(StorageError::UploadIncomplete {
            failed,
            uploaded_keys,
        });
    }

    Ok(())
}
