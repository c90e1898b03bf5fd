/// Post service - post lifecycle across the record store and the image store
///
/// The two stores are not transactional. Mutations run as a best-effort
/// two-phase sequence:
/// - create: upload images, then write the record
/// - update: delete old images (when replacing), upload new ones, then write
/// - delete: delete images, then the record
///
/// When the record write fails after images were uploaded, the uploads are
/// removed again before the error is returned.
use crate::error::{AppError, Result};
use crate::models::{CreatePost, Post, PostChanges, UpdatePost};
use crate::services::images::{ImageGateway, UploadReport};
use crate::storage::{ObjectStore, RecordStore};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// A stored post together with the outcome of any image uploads
#[derive(Debug, Clone)]
pub struct PostWrite {
    pub post: Post,
    pub uploads: UploadReport,
}

#[derive(Clone)]
pub struct PostService {
    records: Arc<dyn RecordStore>,
    images: ImageGateway,
}

impl PostService {
    pub fn new(records: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            records,
            images: ImageGateway::new(objects),
        }
    }

    pub fn images(&self) -> &ImageGateway {
        &self.images
    }

    /// Create a new post
    pub async fn create_post(&self, input: CreatePost) -> Result<PostWrite> {
        input.validate()?;

        let id = Uuid::new_v4().to_string();
        let uploads = if input.images.is_empty() {
            UploadReport::default()
        } else {
            self.images.upload_all(&id, input.images).await
        };

        let post = Post {
            id,
            title: input.title,
            content: input.content,
            images: uploads.urls(),
        };

        if let Err(err) = self.records.put(&post).await {
            if uploads.uploaded_any() {
                self.discard_images(&post.id).await;
            }
            return Err(err.into());
        }

        tracing::info!(
            post_id = %post.id,
            images = post.images.len(),
            failed_uploads = uploads.failure_count(),
            "post created"
        );

        Ok(PostWrite { post, uploads })
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        self.records
            .get(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(post_id.to_string()))
    }

    /// Partially update a post. Supplied text fields overwrite the stored
    /// values; images are only touched when `replace_images` is set, and then
    /// the whole set is replaced. A missing post is reported before invalid
    /// input.
    pub async fn update_post(&self, post_id: &str, input: UpdatePost) -> Result<PostWrite> {
        let existing = self.get_post(post_id).await?;
        input.validate()?;

        let mut changes = PostChanges {
            title: input.title,
            content: input.content,
            images: None,
        };

        let mut uploads = UploadReport::default();
        if input.replace_images {
            if existing.has_images() {
                self.images.delete_all(post_id).await?;
            }
            if !input.images.is_empty() {
                uploads = self.images.upload_all(post_id, input.images).await;
            }
            changes.images = Some(uploads.urls());
        }

        if changes.is_empty() {
            tracing::debug!(%post_id, "update without changes");
            return Ok(PostWrite {
                post: existing,
                uploads,
            });
        }

        let post = match self.records.update(post_id, &changes).await {
            Ok(post) => post,
            Err(err) => {
                if uploads.uploaded_any() {
                    self.discard_images(post_id).await;
                }
                return Err(err.into());
            }
        };

        tracing::info!(
            %post_id,
            replaced_images = input.replace_images,
            failed_uploads = uploads.failure_count(),
            "post updated"
        );

        Ok(PostWrite { post, uploads })
    }

    /// Delete a post and all of its images
    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        let existing = self.get_post(post_id).await?;

        if existing.has_images() {
            self.images.delete_all(post_id).await?;
        }
        self.records.delete(post_id).await?;

        tracing::info!(%post_id, "post deleted");
        Ok(())
    }

    /// Every stored post, unordered
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.records.scan_all().await?)
    }

    /// Compensation for a failed record write: remove the objects uploaded
    /// for it. Failure here is logged and the original error is kept.
    async fn discard_images(&self, post_id: &str) {
        match self.images.delete_all(post_id).await {
            Ok(()) => tracing::warn!(%post_id, "record write failed, uploaded images removed"),
            Err(err) => tracing::error!(
                %post_id,
                error = %err,
                "record write failed and uploaded images could not be removed"
            ),
        }
    }
}
