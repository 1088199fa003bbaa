use std::sync::Arc;

use cratedig_core::audit::{AuditHandle, AuditStore};
use cratedig_core::catalog::{CreatorStore, PackStore};
use cratedig_core::{Authenticator, Config, PackPublisher, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    audit: AuditHandle,
    audit_store: Arc<dyn AuditStore>,
    creators: Arc<dyn CreatorStore>,
    packs: Arc<dyn PackStore>,
    publisher: Arc<PackPublisher>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        audit: AuditHandle,
        audit_store: Arc<dyn AuditStore>,
        creators: Arc<dyn CreatorStore>,
        packs: Arc<dyn PackStore>,
        publisher: Arc<PackPublisher>,
    ) -> Self {
        Self {
            config,
            authenticator,
            audit,
            audit_store,
            creators,
            packs,
            publisher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    /// Handle for emitting audit events from handlers.
    pub fn audit(&self) -> &AuditHandle {
        &self.audit
    }

    /// Read side of the audit trail, for the query endpoint.
    pub fn audit_store(&self) -> &dyn AuditStore {
        self.audit_store.as_ref()
    }

    pub fn creators(&self) -> &dyn CreatorStore {
        self.creators.as_ref()
    }

    pub fn packs(&self) -> &dyn PackStore {
        self.packs.as_ref()
    }

    /// The publication pipeline behind the mutating pack endpoints.
    pub fn publisher(&self) -> &PackPublisher {
        self.publisher.as_ref()
    }
}
