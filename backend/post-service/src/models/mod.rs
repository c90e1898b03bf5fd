/// Data models for post-service
///
/// This module defines structures for:
/// - Post: the stored record and its JSON representation
/// - CreatePost / UpdatePost: validated inputs parsed from multipart forms
/// - PostChanges: the field assignments applied by a record update
/// - ImageUpload: one image file part awaiting upload
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A post record. Serializes to `{ id, title, content, images }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Post {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// An image file received in a form, not yet stored
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

// Payload bytes are omitted from debug output.
impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Input for creating a post
#[derive(Debug, Clone, Validate)]
pub struct CreatePost {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub images: Vec<ImageUpload>,
}

/// Input for a partial update of a post
///
/// `images` is only consulted when `replace_images` is set.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdatePost {
    #[validate(length(min = 1, message = "title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "content cannot be empty"))]
    pub content: Option<String>,
    pub replace_images: bool,
    pub images: Vec<ImageUpload>,
}

/// Field assignments for a record update. Each supplied field overwrites the
/// stored value wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub images: Option<Vec<String>>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.images.is_none()
    }

    pub fn apply_to(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(images) = &self.images {
            post.images = images.clone();
        }
    }
}
