pub mod audit;
pub mod auth;
pub mod catalog;
pub mod commerce;
pub mod config;
pub mod metrics;
pub mod publisher;
pub mod storage;
pub mod testing;

pub use audit::{
    create_audit_system, AuditError, AuditEvent, AuditFilter, AuditHandle, AuditRecord, AuditStore,
    AuditWriter, SqliteAuditStore,
};
pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use catalog::{
    CatalogError, Creator, CreatorStore, NewCreator, NewPack, NewSample, Pack, PackStore,
    PackUpdate, Sample, SqliteCatalog,
};
pub use commerce::{PaymentProcessor, StripeConnectClient};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, DatabaseConfig, PaymentsConfig, SanitizedConfig, ServerConfig, StorageConfig,
};
pub use publisher::{
    PackPublisher, PublishError, PublishRequest, PublishStage, PublishedPack, UpdateRequest,
};
pub use storage::{CredentialSigner, HttpCredentialSigner, HttpObjectUploader, ObjectUploader};
