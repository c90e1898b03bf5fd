/// In-memory storage adapters
use super::{ObjectStore, RecordStore, StorageResult};
use crate::models::{Post, PostChanges};
use async_trait::async_trait;
use s3_utils::encode_key;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Record store backed by a map
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, Post>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, id: &str) -> StorageResult<Option<Post>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn put(&self, post: &Post) -> StorageResult<()> {
        self.records
            .write()
            .await
            .insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn update(&self, id: &str, changes: &PostChanges) -> StorageResult<Post> {
        let mut records = self.records.write().await;
        // Same upsert behaviour as an unconditional DynamoDB UpdateItem.
        let post = records.entry(id.to_string()).or_insert_with(|| Post {
            id: id.to_string(),
            title: String::new(),
            content: String::new(),
            images: Vec::new(),
        });
        changes.apply_to(post);
        Ok(post.clone())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn scan_all(&self) -> StorageResult<Vec<Post>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
    bytes: Vec<u8>,
}

/// Object store backed by an ordered map so prefix listing is a range scan
pub struct InMemoryObjectStore {
    bucket: String,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Stored bytes and content type of an object
    pub async fn object(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| (o.content_type.clone(), o.bytes.clone()))
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes: body,
            },
        );
        Ok(format!("https://{}/{}", self.bucket, encode_key(key)))
    }

    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let objects = self.objects.read().await;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn delete_keys(&self, keys: &[String]) -> StorageResult<()> {
        let mut objects = self.objects.write().await;
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            title: "title".to_string(),
            content: "content".to_string(),
            images: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_record_round_trip_and_delete() {
        let store = InMemoryRecordStore::new();
        store.put(&post("a")).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(post("a")));

        store.delete("a").await.unwrap();
        store.delete("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_returns_full_record() {
        let store = InMemoryRecordStore::new();
        store.put(&post("a")).await.unwrap();

        let updated = store
            .update(
                "a",
                &PostChanges {
                    title: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.content, "content");
    }

    #[tokio::test]
    async fn test_list_keys_respects_prefix_boundary() {
        let store = InMemoryObjectStore::new("bucket");
        for key in ["a/1.png", "a/2.png", "ab/3.png", "b/4.png"] {
            store.put_object(key, vec![0], "image/png").await.unwrap();
        }

        assert_eq!(
            store.list_keys("a/").await.unwrap(),
            vec!["a/1.png".to_string(), "a/2.png".to_string()]
        );
        assert!(store.list_keys("c/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_object_returns_encoded_url() {
        let store = InMemoryObjectStore::new("bucket");
        let url = store
            .put_object("a/my photo#1.png", vec![0], "image/png")
            .await
            .unwrap();

        assert_eq!(url, "https://bucket/a/my%20photo%231.png");
        assert!(store.object("a/my photo#1.png").await.is_some());
    }

    #[tokio::test]
    async fn test_delete_keys_with_empty_slice_is_noop() {
        let store = InMemoryObjectStore::new("bucket");
        store.put_object("a/1.png", vec![0], "image/png").await.unwrap();

        store.delete_keys(&[]).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
