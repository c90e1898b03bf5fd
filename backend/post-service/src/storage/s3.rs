/// S3 object store adapter
use super::{ObjectStore, StorageResult};
use async_trait::async_trait;
use s3_utils::{S3Client, S3Operations};

pub struct S3ObjectStore {
    ops: S3Operations,
}

impl S3ObjectStore {
    pub fn new(client: &S3Client) -> Self {
        Self {
            ops: client.operations(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        Ok(self.ops.upload_file(key, body, content_type).await?)
    }

    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        Ok(self.ops.list_objects(prefix).await?)
    }

    async fn delete_keys(&self, keys: &[String]) -> StorageResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        Ok(self.ops.delete_objects(keys).await?)
    }
}
