//! Mock object uploader for testing.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::storage::{ObjectUploader, StorageError, WriteCredential};

/// One recorded upload attempt.
#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

/// Mock implementation of the ObjectUploader trait.
///
/// Records every attempted put. Individual keys can be marked rejected to
/// simulate storage refusing one slot while siblings succeed.
pub struct MockObjectUploader {
    puts: Mutex<Vec<RecordedPut>>,
    rejected_keys: Mutex<HashSet<String>>,
    next_error: Mutex<Option<StorageError>>,
}

impl Default for MockObjectUploader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockObjectUploader {
    pub fn new() -> Self {
        Self {
            puts: Mutex::new(Vec::new()),
            rejected_keys: Mutex::new(HashSet::new()),
            next_error: Mutex::new(None),
        }
    }

    /// Reject every put against this storage key with HTTP 503.
    pub fn reject_key(&self, key: impl Into<String>) {
        self.rejected_keys.lock().unwrap().insert(key.into());
    }

    /// Fail one subsequent put with the given error.
    pub fn fail_next(&self, error: StorageError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Number of upload attempts, including rejected ones.
    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    /// Every recorded upload attempt, in attempt order.
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectUploader for MockObjectUploader {
    async fn put(
        &self,
        credential: &WriteCredential,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), StorageError> {
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }

        self.puts.lock().unwrap().push(RecordedPut {
            key: credential.key.clone(),
            content_type: content_type.to_string(),
            size: bytes.len(),
        });

        if self.rejected_keys.lock().unwrap().contains(&credential.key) {
            return Err(StorageError::PutRejected(503));
        }

        Ok(())
    }
}
