//! Asset storage: credential issuance and parallel uploads.
//!
//! Publication assets never pass through this service's disk. The signing
//! service mints time-bounded write credentials and the coordinator pushes
//! the bytes straight to object storage through them.

mod signer;
mod types;
mod uploader;

pub use signer::{issue_credential_set, CredentialSigner, HttpCredentialSigner};
pub use types::{
    key_from_public_url, object_url, public_url, AssetFile, AssetKind, BucketScope, StorageError,
    UploadCredentialSet, WriteCredential,
};
pub use uploader::{upload_assets, HttpObjectUploader, ObjectUploader};
