//! Object store that fails uploads for selected filenames
//!
//! Wraps the in-memory store; used to exercise partial upload failures.

use async_trait::async_trait;
use post_service::storage::{InMemoryObjectStore, ObjectStore, StorageError, StorageResult};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct FlakyObjectStore {
    inner: Arc<InMemoryObjectStore>,
    /// Uploads whose key ends with one of these names fail
    failing: Arc<Vec<String>>,
    /// Number of rejected uploads
    rejected: Arc<Mutex<usize>>,
}

impl FlakyObjectStore {
    pub fn new(bucket: &str, failing: &[&str]) -> Self {
        Self {
            inner: Arc::new(InMemoryObjectStore::new(bucket)),
            failing: Arc::new(failing.iter().map(|s| s.to_string()).collect()),
            rejected: Arc::new(Mutex::new(0)),
        }
    }

    pub fn rejected_count(&self) -> usize {
        *self.rejected.lock().unwrap()
    }
}

#[async_trait]
impl ObjectStore for FlakyObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> StorageResult<String> {
        if self.failing.iter().any(|name| key.ends_with(name.as_str())) {
            *self.rejected.lock().unwrap() += 1;
            return Err(StorageError::ObjectStore(format!("upload of {} rejected", key)));
        }
        self.inner.put_object(key, body, content_type).await
    }

    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list_keys(prefix).await
    }

    async fn delete_keys(&self, keys: &[String]) -> StorageResult<()> {
        self.inner.delete_keys(keys).await
    }
}
