/// S3 operations for object upload, prefix listing, and batch deletion
use crate::config::S3Config;
use crate::{S3Error, S3Result};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use std::sync::Arc;

/// DeleteObjects accepts at most this many keys per request
pub const MAX_DELETE_BATCH: usize = 1000;

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Upload an object and return its public URL
    pub async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> S3Result<String> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Upload {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(self.config.object_url(key))
    }

    /// List every object key under a prefix, following continuation tokens
    pub async fn list_objects(&self, prefix: &str) -> S3Result<Vec<String>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.config.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| S3Error::List {
                prefix: prefix.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(|k| k.to_string())),
            );
        }

        Ok(keys)
    }

    /// Delete objects in batches of at most [`MAX_DELETE_BATCH`] keys
    pub async fn delete_objects(&self, keys: &[String]) -> S3Result<()> {
        for batch in keys.chunks(MAX_DELETE_BATCH) {
            let objects = batch
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| S3Error::Request(e.to_string()))?;

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| S3Error::Request(e.to_string()))?;

            let output = self
                .client
                .delete_objects()
                .bucket(&self.config.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| S3Error::Delete(DisplayErrorContext(&e).to_string()))?;

            let failed = output.errors();
            if !failed.is_empty() {
                let first = failed
                    .first()
                    .and_then(|err| err.key())
                    .unwrap_or("<unknown>");
                return Err(S3Error::Delete(format!(
                    "{} of {} objects not deleted (first: {})",
                    failed.len(),
                    batch.len(),
                    first
                )));
            }

            tracing::debug!(count = batch.len(), "deleted S3 object batch");
        }

        Ok(())
    }
}
