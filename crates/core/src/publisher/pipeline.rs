//! The publication pipeline: credential issuance, asset upload, commerce
//! provisioning, catalog persistence.
//!
//! The four stages run strictly in order and there is no automatic
//! compensation. When a stage fails, whatever earlier stages created
//! externally stays where it is; the error and the audit record carry those
//! identifiers so reconciliation can clean up out of band. A retried
//! attempt always starts over with a fresh credential set.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::audit::{AuditEvent, AuditHandle};
use crate::catalog::{
    CatalogError, Creator, CreatorStore, NewPack, NewSample, Pack, PackStore, PackUpdate,
};
use crate::commerce::{PaymentProcessor, ProductSpec};
use crate::metrics;
use crate::storage::{
    issue_credential_set, key_from_public_url, object_url, public_url, upload_assets, AssetFile,
    CredentialSigner, ObjectUploader, StorageError, UploadCredentialSet,
};

use super::types::{
    DeletedPack, OnboardingLink, OnboardingStatus, PublishError, PublishRequest, PublishedPack,
    UpdateRequest, UpdatedPack,
};
use super::validate::{validate_request, validate_update, ValidatedPack};

pub struct PackPublisher {
    signer: Arc<dyn CredentialSigner>,
    uploader: Arc<dyn ObjectUploader>,
    payments: Arc<dyn PaymentProcessor>,
    creators: Arc<dyn CreatorStore>,
    packs: Arc<dyn PackStore>,
    public_base_url: String,
    audit: Option<AuditHandle>,
}

impl PackPublisher {
    pub fn new(
        signer: Arc<dyn CredentialSigner>,
        uploader: Arc<dyn ObjectUploader>,
        payments: Arc<dyn PaymentProcessor>,
        creators: Arc<dyn CreatorStore>,
        packs: Arc<dyn PackStore>,
        public_base_url: String,
    ) -> Self {
        Self {
            signer,
            uploader,
            payments,
            creators,
            packs,
            public_base_url,
            audit: None,
        }
    }

    /// Attach an audit handle for event emission.
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Run a full publication. Validation and the onboarding check happen
    /// before any side effect; after that, a failure names the stage and
    /// carries the identifiers of everything already created externally.
    pub async fn publish(
        &self,
        creator_id: &str,
        request: PublishRequest,
    ) -> Result<PublishedPack, PublishError> {
        let started = Instant::now();

        let validated = match validate_request(&request) {
            Ok(validated) => validated,
            Err(error) => {
                metrics::PUBLICATIONS_TOTAL
                    .with_label_values(&["rejected"])
                    .inc();
                return Err(error);
            }
        };
        let account = match self.connected_account(creator_id) {
            Ok(account) => account,
            Err(error) => {
                let result = if error.stage().is_some() {
                    "failed"
                } else {
                    "rejected"
                };
                metrics::PUBLICATIONS_TOTAL.with_label_values(&[result]).inc();
                return Err(error);
            }
        };
        if let Err(error) = self.require_completed_onboarding(creator_id, &account).await {
            metrics::PUBLICATIONS_TOTAL
                .with_label_values(&["rejected"])
                .inc();
            return Err(error);
        }

        info!(
            creator_id,
            slug = %validated.slug,
            samples = request.samples.len(),
            "Publication started"
        );
        self.emit(AuditEvent::PublicationStarted {
            creator_id: creator_id.to_string(),
            pack_slug: validated.slug.clone(),
            title: validated.title.clone(),
            sample_count: request.samples.len() as u32,
        })
        .await;

        match self
            .run_stages(creator_id, &account, &validated, &request)
            .await
        {
            Ok(published) => {
                metrics::PUBLICATIONS_TOTAL
                    .with_label_values(&["published"])
                    .inc();
                metrics::PUBLICATION_DURATION
                    .with_label_values(&["published"])
                    .observe(started.elapsed().as_secs_f64());
                metrics::SAMPLES_PER_PACK.observe(request.samples.len() as f64);
                info!(
                    creator_id,
                    slug = %published.slug,
                    pack_id = published.pack_id,
                    "Publication complete"
                );
                self.emit(AuditEvent::PackPublished {
                    creator_id: creator_id.to_string(),
                    pack_slug: published.slug.clone(),
                    pack_id: published.pack_id,
                    price_cents: validated.price_cents,
                })
                .await;
                Ok(published)
            }
            Err(error) => {
                metrics::PUBLICATIONS_TOTAL
                    .with_label_values(&["failed"])
                    .inc();
                metrics::PUBLICATION_DURATION
                    .with_label_values(&["failed"])
                    .observe(started.elapsed().as_secs_f64());
                self.record_failure(creator_id, &validated.slug, &error)
                    .await;
                Err(error)
            }
        }
    }

    async fn run_stages(
        &self,
        creator_id: &str,
        account: &str,
        validated: &ValidatedPack,
        request: &PublishRequest,
    ) -> Result<PublishedPack, PublishError> {
        // Stage 1: a fresh write credential for every asset slot.
        let stage_started = Instant::now();
        let credentials = issue_credential_set(self.signer.as_ref(), request.samples.len())
            .await
            .map_err(|e| PublishError::CredentialIssuanceFailed {
                reason: e.to_string(),
            })?;
        metrics::STAGE_DURATION
            .with_label_values(&["credential_issuance"])
            .observe(stage_started.elapsed().as_secs_f64());

        self.emit(AuditEvent::CredentialsIssued {
            creator_id: creator_id.to_string(),
            pack_slug: validated.slug.clone(),
            storage_keys: credentials.storage_keys(),
        })
        .await;

        // Stage 2: push every asset through its credential, in parallel.
        let stage_started = Instant::now();
        upload_assets(
            self.uploader.as_ref(),
            &credentials,
            &request.cover,
            &request.archive,
            &request.samples,
        )
        .await
        .map_err(|e| match e {
            StorageError::UploadIncomplete {
                ref uploaded_keys, ..
            } => PublishError::AssetUploadFailed {
                reason: e.to_string(),
                orphaned_keys: uploaded_keys.clone(),
            },
            other => PublishError::AssetUploadFailed {
                reason: other.to_string(),
                orphaned_keys: vec![],
            },
        })?;
        metrics::STAGE_DURATION
            .with_label_values(&["asset_upload"])
            .observe(stage_started.elapsed().as_secs_f64());

        self.emit(AuditEvent::AssetsUploaded {
            creator_id: creator_id.to_string(),
            pack_slug: validated.slug.clone(),
            asset_count: (request.samples.len() + 2) as u32,
        })
        .await;

        // Every object written above is a potential orphan from here on.
        let all_keys = credentials.storage_keys();

        // Stage 3: the product first, then the link bound to its price.
        let stage_started = Instant::now();
        let cover_url = public_url(&self.public_base_url, &credentials.cover.key);
        let spec = ProductSpec {
            name: validated.title.clone(),
            description: validated.description.clone(),
            price_cents: validated.price_cents,
            cover_url: cover_url.clone(),
            identity_key: credentials.archive.key.clone(),
        };
        let product = self
            .payments
            .create_product(account, &spec)
            .await
            .map_err(|e| PublishError::ProductCreationFailed {
                reason: e.to_string(),
                orphaned_keys: all_keys.clone(),
            })?;
        let payment_link = self
            .payments
            .create_payment_link(account, &product.price_id, validated.price_cents)
            .await
            .map_err(|e| PublishError::PaymentLinkCreationFailed {
                reason: e.to_string(),
                orphaned_keys: all_keys.clone(),
                orphaned_product_id: Some(product.product_id.clone()),
            })?;
        metrics::STAGE_DURATION
            .with_label_values(&["commerce_provisioning"])
            .observe(stage_started.elapsed().as_secs_f64());

        self.emit(AuditEvent::CommerceProvisioned {
            creator_id: creator_id.to_string(),
            pack_slug: validated.slug.clone(),
            product_id: product.product_id.clone(),
            payment_link: payment_link.clone(),
        })
        .await;

        // Stage 4: one transactional write for the pack and its samples.
        let stage_started = Instant::now();
        let pack = NewPack {
            creator_id: creator_id.to_string(),
            slug: validated.slug.clone(),
            title: validated.title.clone(),
            description: validated.description.clone(),
            price_cents: validated.price_cents,
            cover_url,
            archive_url: object_url(&credentials.archive.url).to_string(),
            archive_key: credentials.archive.key.clone(),
            product_id: product.product_id.clone(),
            payment_link: payment_link.clone(),
        };
        let samples = sample_rows(&self.public_base_url, &credentials, &request.samples);
        let created = self.packs.create_pack(pack, samples).map_err(|e| {
            PublishError::PersistenceFailed {
                reason: e.to_string(),
                orphaned_keys: all_keys.clone(),
                orphaned_product_id: Some(product.product_id.clone()),
            }
        })?;
        metrics::STAGE_DURATION
            .with_label_values(&["persistence"])
            .observe(stage_started.elapsed().as_secs_f64());

        Ok(PublishedPack {
            slug: created.slug,
            pack_id: created.id,
            payment_link,
        })
    }

    /// Update a pack's metadata and commerce terms. The slug is re-derived
    /// from the new title, and because payment links are immutable at the
    /// provider a fresh one is minted every time. Assets are untouched.
    pub async fn update(
        &self,
        creator_id: &str,
        slug: &str,
        request: UpdateRequest,
    ) -> Result<UpdatedPack, PublishError> {
        let validated = validate_update(&request)?;
        let account = self.connected_account(creator_id)?;
        let current = self.get_pack(creator_id, slug)?;

        let spec = ProductSpec {
            name: validated.title.clone(),
            description: validated.description.clone(),
            price_cents: validated.price_cents,
            cover_url: current.cover_url.clone(),
            identity_key: current.archive_key.clone(),
        };
        let product = self
            .payments
            .update_product(&account, &current.product_id, &spec)
            .await
            .map_err(|e| PublishError::ProductCreationFailed {
                reason: e.to_string(),
                orphaned_keys: vec![],
            })?;
        let payment_link = self
            .payments
            .create_payment_link(&account, &product.price_id, validated.price_cents)
            .await
            .map_err(|e| PublishError::PaymentLinkCreationFailed {
                reason: e.to_string(),
                orphaned_keys: vec![],
                orphaned_product_id: None,
            })?;

        let update = PackUpdate {
            slug: validated.slug.clone(),
            title: validated.title.clone(),
            description: validated.description.clone(),
            price_cents: validated.price_cents,
            payment_link: payment_link.clone(),
        };
        let updated = self
            .packs
            .update_pack(creator_id, slug, update)
            .map_err(|e| match e {
                CatalogError::NotFound(_) => PublishError::NotFound(format!("Pack '{}'", slug)),
                other => PublishError::PersistenceFailed {
                    reason: other.to_string(),
                    orphaned_keys: vec![],
                    orphaned_product_id: None,
                },
            })?;

        metrics::PACK_UPDATES.inc();
        info!(creator_id, old_slug = slug, new_slug = %updated.slug, "Pack updated");
        self.emit(AuditEvent::PackUpdated {
            creator_id: creator_id.to_string(),
            old_slug: slug.to_string(),
            new_slug: updated.slug.clone(),
            product_id: current.product_id,
            superseded_link: current.payment_link,
        })
        .await;

        Ok(UpdatedPack {
            slug: updated.slug,
            payment_link,
        })
    }

    /// Delete a pack and its samples from the catalog. The storage objects
    /// and the provider product stay behind; the returned value and the
    /// audit record carry their identifiers for out-of-band cleanup.
    pub async fn delete(&self, creator_id: &str, slug: &str) -> Result<DeletedPack, PublishError> {
        let (pack, samples) = match self.packs.get_pack_with_samples(creator_id, slug) {
            Ok(Some(found)) => found,
            Ok(None) => return Err(PublishError::NotFound(format!("Pack '{}'", slug))),
            Err(e) => {
                return Err(PublishError::PersistenceFailed {
                    reason: e.to_string(),
                    orphaned_keys: vec![],
                    orphaned_product_id: None,
                })
            }
        };

        self.packs
            .delete_pack(creator_id, slug)
            .map_err(|e| match e {
                CatalogError::NotFound(_) => PublishError::NotFound(format!("Pack '{}'", slug)),
                other => PublishError::PersistenceFailed {
                    reason: other.to_string(),
                    orphaned_keys: vec![],
                    orphaned_product_id: None,
                },
            })?;

        let mut orphaned_keys = Vec::with_capacity(samples.len() + 2);
        if let Some(key) = key_from_public_url(&self.public_base_url, &pack.cover_url) {
            orphaned_keys.push(key.to_string());
        }
        orphaned_keys.push(pack.archive_key.clone());
        for sample in &samples {
            if let Some(key) = key_from_public_url(&self.public_base_url, &sample.url) {
                orphaned_keys.push(key.to_string());
            }
        }

        metrics::PACK_DELETIONS.inc();
        metrics::ORPHANED_OBJECTS
            .with_label_values(&["storage_object"])
            .inc_by(orphaned_keys.len() as u64);
        metrics::ORPHANED_OBJECTS
            .with_label_values(&["product"])
            .inc();
        info!(creator_id, slug, product_id = %pack.product_id, "Pack deleted");
        self.emit(AuditEvent::PackDeleted {
            creator_id: creator_id.to_string(),
            pack_slug: slug.to_string(),
            product_id: pack.product_id.clone(),
            orphaned_keys: orphaned_keys.clone(),
        })
        .await;

        Ok(DeletedPack {
            slug: slug.to_string(),
            product_id: pack.product_id,
            orphaned_keys,
        })
    }

    /// Begin or resume payment onboarding. The connected account is created
    /// on first use; a fresh onboarding link is minted on every call because
    /// the provider expires them quickly.
    pub async fn start_onboarding(
        &self,
        creator_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<OnboardingLink, PublishError> {
        let creator = self.get_creator(creator_id)?;

        let account_id = match creator.connected_account_id.filter(|id| !id.is_empty()) {
            Some(account_id) => account_id,
            None => {
                let account_id = self
                    .payments
                    .create_connected_account()
                    .await
                    .map_err(|e| PublishError::OnboardingFailed(e.to_string()))?;
                // Audit before persisting the mapping, so the account id is
                // on record even if the write below fails.
                self.emit(AuditEvent::OnboardingStarted {
                    creator_id: creator_id.to_string(),
                    account_id: account_id.clone(),
                })
                .await;
                self.creators
                    .set_connected_account(creator_id, &account_id)
                    .map_err(|e| PublishError::PersistenceFailed {
                        reason: e.to_string(),
                        orphaned_keys: vec![],
                        orphaned_product_id: None,
                    })?;
                info!(creator_id, account_id = %account_id, "Connected account created");
                account_id
            }
        };

        let url = self
            .payments
            .create_onboarding_link(&account_id, refresh_url, return_url)
            .await
            .map_err(|e| PublishError::OnboardingFailed(e.to_string()))?;

        metrics::ONBOARDING_LINKS.inc();
        Ok(OnboardingLink { account_id, url })
    }

    /// Where the creator stands with onboarding. Complete means the provider
    /// reports nothing currently due for the connected account.
    pub async fn onboarding_status(
        &self,
        creator_id: &str,
    ) -> Result<OnboardingStatus, PublishError> {
        let creator = self.get_creator(creator_id)?;

        let account_id = match creator.connected_account_id.filter(|id| !id.is_empty()) {
            Some(account_id) => account_id,
            None => {
                return Ok(OnboardingStatus {
                    account_id: None,
                    onboarding_complete: false,
                    requirements_due: vec![],
                })
            }
        };

        let requirements_due = self
            .payments
            .requirements_due(&account_id)
            .await
            .map_err(|e| PublishError::OnboardingFailed(e.to_string()))?;

        Ok(OnboardingStatus {
            onboarding_complete: requirements_due.is_empty(),
            account_id: Some(account_id),
            requirements_due,
        })
    }

    /// Selling requires onboarding to be finished, not merely started. An
    /// account with outstanding requirements cannot take charges yet.
    async fn require_completed_onboarding(
        &self,
        creator_id: &str,
        account_id: &str,
    ) -> Result<(), PublishError> {
        let requirements_due = self
            .payments
            .requirements_due(account_id)
            .await
            .map_err(|e| PublishError::OnboardingFailed(e.to_string()))?;

        if requirements_due.is_empty() {
            Ok(())
        } else {
            warn!(
                creator_id,
                account_id,
                outstanding = requirements_due.len(),
                "Publication blocked by incomplete onboarding"
            );
            Err(PublishError::Unauthorized)
        }
    }

    /// The creator's connected account id, or `Unauthorized` if the creator
    /// is unknown or has never completed onboarding.
    fn connected_account(&self, creator_id: &str) -> Result<String, PublishError> {
        let creator = match self.creators.get_creator(creator_id) {
            Ok(Some(creator)) => creator,
            Ok(None) => return Err(PublishError::Unauthorized),
            Err(e) => {
                return Err(PublishError::PersistenceFailed {
                    reason: e.to_string(),
                    orphaned_keys: vec![],
                    orphaned_product_id: None,
                })
            }
        };
        creator
            .connected_account_id
            .filter(|id| !id.is_empty())
            .ok_or(PublishError::Unauthorized)
    }

    fn get_creator(&self, creator_id: &str) -> Result<Creator, PublishError> {
        match self.creators.get_creator(creator_id) {
            Ok(Some(creator)) => Ok(creator),
            Ok(None) => Err(PublishError::NotFound(format!(
                "Creator '{}'",
                creator_id
            ))),
            Err(e) => Err(PublishError::PersistenceFailed {
                reason: e.to_string(),
                orphaned_keys: vec![],
                orphaned_product_id: None,
            }),
        }
    }

    fn get_pack(&self, creator_id: &str, slug: &str) -> Result<Pack, PublishError> {
        match self.packs.get_pack(creator_id, slug) {
            Ok(Some(pack)) => Ok(pack),
            Ok(None) => Err(PublishError::NotFound(format!("Pack '{}'", slug))),
            Err(e) => Err(PublishError::PersistenceFailed {
                reason: e.to_string(),
                orphaned_keys: vec![],
                orphaned_product_id: None,
            }),
        }
    }

    async fn record_failure(&self, creator_id: &str, slug: &str, error: &PublishError) {
        let stage = error.stage().map(|s| s.as_str()).unwrap_or("unknown");
        warn!(
            creator_id,
            slug,
            stage,
            error = %error,
            orphaned_keys = error.orphaned_keys().len(),
            "Publication failed"
        );
        metrics::STAGE_FAILURES.with_label_values(&[stage]).inc();
        metrics::ORPHANED_OBJECTS
            .with_label_values(&["storage_object"])
            .inc_by(error.orphaned_keys().len() as u64);
        if error.orphaned_product_id().is_some() {
            metrics::ORPHANED_OBJECTS
                .with_label_values(&["product"])
                .inc();
        }
        self.emit(AuditEvent::PublicationFailed {
            creator_id: creator_id.to_string(),
            pack_slug: slug.to_string(),
            stage: stage.to_string(),
            reason: error.to_string(),
            orphaned_keys: error.orphaned_keys().to_vec(),
            orphaned_product_id: error.orphaned_product_id().map(String::from),
        })
        .await;
    }

    async fn emit(&self, event: AuditEvent) {
        if let Some(ref audit) = self.audit {
            audit.emit(event).await;
        }
    }
}

fn sample_rows(
    base_url: &str,
    credentials: &UploadCredentialSet,
    files: &[AssetFile],
) -> Vec<NewSample> {
    credentials
        .samples
        .iter()
        .zip(files)
        .map(|(credential, file)| NewSample {
            url: public_url(base_url, &credential.key),
            title: display_title(&file.file_name),
        })
        .collect()
}

/// Sample display title: the file name with its extension dropped.
fn display_title(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}
