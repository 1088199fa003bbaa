//! Credential issuer backed by the storage signing service.
//!
//! Each publication attempt asks the signing service for one time-bounded
//! write credential per asset slot. Credentials are minted fresh per attempt
//! and never reused across attempts.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::metrics;
use crate::storage::types::{
    AssetKind, BucketScope, StorageError, UploadCredentialSet, WriteCredential,
};

/// Issues single-object write credentials.
#[async_trait]
pub trait CredentialSigner: Send + Sync {
    /// Mint one write credential for an asset of the given kind.
    async fn sign_write(&self, kind: AssetKind) -> Result<WriteCredential, StorageError>;
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    bucket: &'a str,
    kind: AssetKind,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    key: String,
    url: String,
}

/// Signer client speaking the signing service's HTTP API.
pub struct HttpCredentialSigner {
    client: Client,
    config: StorageConfig,
}

impl HttpCredentialSigner {
    pub fn new(config: StorageConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn bucket_name(&self, scope: BucketScope) -> &str {
        match scope {
            BucketScope::Public => &self.config.public_bucket,
            BucketScope::Private => &self.config.private_bucket,
        }
    }
}

#[async_trait]
impl CredentialSigner for HttpCredentialSigner {
    async fn sign_write(&self, kind: AssetKind) -> Result<WriteCredential, StorageError> {
        let key = format!("{}/{}", kind.key_prefix(), Uuid::new_v4());
        let bucket = self.bucket_name(kind.bucket_scope());
        let url = format!("{}/sign", self.config.signer_url.trim_end_matches('/'));

        debug!(bucket, key, "Requesting write credential");
        metrics::EXTERNAL_REQUESTS
            .with_label_values(&["signer"])
            .inc();

        let response = self
            .client
            .post(&url)
            .json(&SignRequest {
                bucket,
                kind,
                key: &key,
            })
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
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::ApiError(format!(
                "Signing service returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ApiError(format!("Invalid sign response: {}", e)))?;

        // The service may rewrite the key; the returned one is authoritative.
        Ok(WriteCredential {
            key: signed.key,
            url: signed.url,
        })
    }
}

/// Mint the full credential set for one publication attempt: one cover,
/// one archive and one credential per sample slot. All requests run
/// concurrently; if any fails the whole issuance fails.
pub async fn issue_credential_set(
    signer: &dyn CredentialSigner,
    sample_slots: usize,
) -> Result<UploadCredentialSet, StorageError> {
    let sample_futs = (0..sample_slots).map(|_| signer.sign_write(AssetKind::Sample));

    let (cover, archive, samples) = futures::join!(
        signer.sign_write(AssetKind::Cover),
        signer.sign_write(AssetKind::Archive),
        join_all(sample_futs),
    );

    let samples = samples.into_iter().collect::<Result<Vec<_>, _>>()?;

    Ok(UploadCredentialSet {
        cover: cover?,
        archive: archive?,
        samples,
    })
}
