/// Storage ports and adapters
///
/// Two independent, non-transactional backends hold a post's state:
/// - `RecordStore`: one record per post, keyed by post id (DynamoDB)
/// - `ObjectStore`: image blobs keyed `{post_id}/{filename}` (S3)
///
/// Each port has an AWS adapter and an in-memory adapter. The in-memory
/// adapters back local development (`STORAGE_BACKEND=memory`) and tests.
use crate::models::{Post, PostChanges};
use async_trait::async_trait;
use thiserror::Error;

pub mod dynamodb;
pub mod memory;
pub mod s3;

pub use dynamodb::DynamoRecordStore;
pub use memory::{InMemoryObjectStore, InMemoryRecordStore};
pub use s3::S3ObjectStore;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Failure of an underlying store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store error: {0}")]
    ObjectStore(String),

    #[error("record store error: {0}")]
    RecordStore(String),

    #[error("malformed record: {0}")]
    MalformedItem(String),
}

impl From<s3_utils::S3Error> for StorageError {
    fn from(err: s3_utils::S3Error) -> Self {
        StorageError::ObjectStore(err.to_string())
    }
}

/// Key-value store holding one record per post
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record; `None` when the id is absent
    async fn get(&self, id: &str) -> StorageResult<Option<Post>>;

    /// Unconditional insert or overwrite
    async fn put(&self, post: &Post) -> StorageResult<()>;

    /// Apply every assignment in `changes` in one atomic write and return the
    /// full record as stored afterwards
    async fn update(&self, id: &str, changes: &PostChanges) -> StorageResult<Post>;

    /// Unconditional delete; an absent id is not an error
    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// Every record, in no particular order
    async fn scan_all(&self) -> StorageResult<Vec<Post>>;
}

/// Blob store with prefix listing and batch deletion
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key` and return the public URL it is served at
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str)
        -> StorageResult<String>;

    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete the given keys; an empty slice is a no-op
    async fn delete_keys(&self, keys: &[String]) -> StorageResult<()>;
}
