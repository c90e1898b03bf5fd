/// Image gateway - stores a post's images under its id prefix
///
/// Every object belonging to a post lives under `{post_id}/`, so the whole
/// set can be removed with one prefix listing and a batch delete.
use crate::models::ImageUpload;
use crate::storage::{ObjectStore, StorageResult};
use futures::future::join_all;
use std::sync::Arc;

/// Result of storing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { filename: String, url: String },
    /// No usable filename; nothing was stored
    Skipped,
    Failed { filename: String, reason: String },
}

/// Per-file outcomes of one batch, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl UploadReport {
    /// URLs of the files that were stored
    pub fn urls(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                UploadOutcome::Uploaded { url, .. } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            UploadOutcome::Failed { filename, reason } => Some((filename.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn uploaded_any(&self) -> bool {
        self.outcomes
            .iter()
            .any(|outcome| matches!(outcome, UploadOutcome::Uploaded { .. }))
    }
}

#[derive(Clone)]
pub struct ImageGateway {
    store: Arc<dyn ObjectStore>,
}

impl ImageGateway {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    fn prefix(post_id: &str) -> String {
        format!("{}/", post_id)
    }

    /// Store every file under `{post_id}/{filename}`.
    ///
    /// Best effort: a failed file is logged and reported, the rest of the
    /// batch still uploads, and nothing already stored is rolled back.
    pub async fn upload_all(&self, post_id: &str, files: Vec<ImageUpload>) -> UploadReport {
        let uploads = files.into_iter().map(|file| self.upload_one(post_id, file));
        UploadReport {
            outcomes: join_all(uploads).await,
        }
    }

    async fn upload_one(&self, post_id: &str, file: ImageUpload) -> UploadOutcome {
        let name = object_name(&file.filename);
        if name.is_empty() {
            tracing::debug!(
                %post_id,
                filename = %file.filename,
                "skipping file part without a usable filename"
            );
            return UploadOutcome::Skipped;
        }

        let key = format!("{}{}", Self::prefix(post_id), name);
        match self
            .store
            .put_object(&key, file.bytes, &file.content_type)
            .await
        {
            Ok(url) => UploadOutcome::Uploaded {
                url,
                filename: file.filename,
            },
            Err(err) => {
                tracing::warn!(%post_id, %key, error = %err, "image upload failed");
                UploadOutcome::Failed {
                    filename: file.filename,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Remove every object under the post's prefix. No objects is a no-op.
    pub async fn delete_all(&self, post_id: &str) -> StorageResult<()> {
        let keys = self.store.list_keys(&Self::prefix(post_id)).await?;
        if keys.is_empty() {
            return Ok(());
        }

        self.store.delete_keys(&keys).await?;
        tracing::info!(%post_id, count = keys.len(), "deleted post images");
        Ok(())
    }

    /// Keys currently stored under the post's prefix
    pub async fn list(&self, post_id: &str) -> StorageResult<Vec<String>> {
        self.store.list_keys(&Self::prefix(post_id)).await
    }
}

/// Last path segment of a client filename, so every key stays directly under
/// the post prefix. `.` and `..` yield an empty name.
fn object_name(filename: &str) -> &str {
    match filename.rsplit(['/', '\\']).next().unwrap_or_default() {
        "." | ".." => "",
        name => name,
    }
}
