//! Mock credential signer for testing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::storage::{AssetKind, CredentialSigner, StorageError, WriteCredential};

/// Mock implementation of the CredentialSigner trait.
///
/// Mints deterministic credentials with unique keys per call and records
/// every issued credential for assertions. A single injected error fails
/// exactly one subsequent signing call.
pub struct MockCredentialSigner {
    counter: AtomicU64,
    issued: Mutex<Vec<WriteCredential>>,
    next_error: Mutex<Option<StorageError>>,
}

impl Default for MockCredentialSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCredentialSigner {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            issued: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
        }
    }

    /// Fail one subsequent signing call with the given error.
    pub fn fail_next(&self, error: StorageError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Number of credentials issued so far.
    pub fn issued_count(&self) -> usize {
        self.issued.lock().unwrap().len()
    }

    /// Keys of every credential issued so far, in issue order.
    pub fn issued_keys(&self) -> Vec<String> {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.key.clone())
            .collect()
    }
}

#[async_trait]
impl CredentialSigner for MockCredentialSigner {
    async fn sign_write(&self, kind: AssetKind) -> Result<WriteCredential, StorageError> {
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let key = format!("{}/mock-{}", kind.key_prefix(), n);
        let credential = WriteCredential {
            url: format!("https://signed.test/{}", key),
            key,
        };

        self.issued.lock().unwrap().push(credential.clone());
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keys_are_unique_and_namespaced() {
        let signer = MockCredentialSigner::new();

        let a = signer.sign_write(AssetKind::Cover).await.unwrap();
        let b = signer.sign_write(AssetKind::Cover).await.unwrap();
        let c = signer.sign_write(AssetKind::Archive).await.unwrap();

        assert_ne!(a.key, b.key);
        assert!(a.key.starts_with("covers/"));
        assert!(c.key.starts_with("archives/"));
        assert_eq!(signer.issued_count(), 3);
    }

    #[tokio::test]
    async fn test_injected_error_is_consumed() {
        let signer = MockCredentialSigner::new();
        signer.fail_next(StorageError::Timeout);

        let first = signer.sign_write(AssetKind::Sample).await;
        assert!(matches!(first, Err(StorageError::Timeout)));

        let second = signer.sign_write(AssetKind::Sample).await;
        assert!(second.is_ok());
    }
}
