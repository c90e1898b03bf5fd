/// Multipart form parsing
///
/// Request bodies are read into a list of parts first, then converted into
/// the typed inputs `CreatePost` / `UpdatePost`. Nothing loosely typed
/// reaches the service layer.
use crate::error::{AppError, Result};
use crate::models::{CreatePost, ImageUpload, UpdatePost};
use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use validator::Validate;

const FIELD_TITLE: &str = "title";
const FIELD_CONTENT: &str = "content";
const FIELD_IMAGES: &str = "images";
const FIELD_UPDATE_IMAGES: &str = "update_images";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One part of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    /// `Some` for file parts, even when the filename is empty
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FormPart {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            filename: None,
            content_type: None,
            bytes: value.as_bytes().to_vec(),
        }
    }

    pub fn file(name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            content_type: Some(content_type.to_string()),
            bytes: bytes.to_vec(),
        }
    }

    fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    fn text_value(&self) -> Result<String> {
        String::from_utf8(self.bytes.clone())
            .map_err(|_| AppError::BadRequest(format!("field '{}' is not valid UTF-8", self.name)))
    }

    fn into_upload(self) -> ImageUpload {
        ImageUpload {
            filename: self.filename.unwrap_or_default(),
            content_type: self
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            bytes: self.bytes,
        }
    }
}

/// Read every part of the body. `max_bytes` bounds the total payload.
pub async fn read_parts(mut payload: Multipart, max_bytes: usize) -> Result<Vec<FormPart>> {
    let mut parts = Vec::new();
    let mut total_bytes: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|f| f.to_string());
        let content_type = field.content_type().map(|m| m.to_string());
        let bytes = read_field(&mut field, &mut total_bytes, max_bytes).await?;

        parts.push(FormPart {
            name,
            filename,
            content_type,
            bytes,
        });
    }

    Ok(parts)
}

async fn read_field(field: &mut Field, total_bytes: &mut usize, max_bytes: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Field read error: {}", e)))?;
        *total_bytes += chunk.len();
        if *total_bytes > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "request exceeds {} bytes",
                max_bytes
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Fields shared by both forms
#[derive(Default)]
struct PostForm {
    title: Option<String>,
    content: Option<String>,
    update_images: Option<bool>,
    images: Vec<ImageUpload>,
}

impl PostForm {
    fn from_parts(parts: Vec<FormPart>) -> Result<Self> {
        let mut form = PostForm::default();

        for part in parts {
            let name = part.name.clone();
            match (name.as_str(), part.is_file()) {
                (FIELD_IMAGES, true) => form.images.push(part.into_upload()),
                (FIELD_IMAGES, false) => {
                    tracing::debug!("ignoring text-valued images field");
                }
                (FIELD_TITLE, false) => form.title = Some(part.text_value()?),
                (FIELD_CONTENT, false) => form.content = Some(part.text_value()?),
                (FIELD_UPDATE_IMAGES, false) => {
                    form.update_images = Some(parse_flag(&part.text_value()?)?)
                }
                (name, _) => {
                    tracing::debug!(field = %name, "ignoring unexpected form field");
                }
            }
        }

        Ok(form)
    }
}

/// Form for `POST /posts`: `title` and `content` required, `images` optional
pub fn create_post_from_parts(parts: Vec<FormPart>) -> Result<CreatePost> {
    let form = PostForm::from_parts(parts)?;
    let input = CreatePost {
        title: form.title.unwrap_or_default(),
        content: form.content.unwrap_or_default(),
        images: form.images,
    };
    input.validate()?;
    Ok(input)
}

/// Form for `PUT /posts/{id}`: every field optional; `images` only counts
/// when `update_images` is true. Field values are validated by the service
/// once the post is known to exist.
pub fn update_post_from_parts(parts: Vec<FormPart>) -> Result<UpdatePost> {
    let form = PostForm::from_parts(parts)?;
    let replace_images = form.update_images.unwrap_or(false);
    Ok(UpdatePost {
        title: form.title,
        content: form.content,
        replace_images,
        images: if replace_images { form.images } else { Vec::new() },
    })
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::BadRequest(format!(
            "update_images must be a boolean, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_form_collects_fields_and_files() {
        let input = create_post_from_parts(vec![
            FormPart::text("title", "Hello"),
            FormPart::text("content", "World"),
            FormPart::file("images", "a.png", "image/png", b"a"),
            FormPart::file("images", "b.jpg", "image/jpeg", b"b"),
        ])
        .unwrap();

        assert_eq!(input.title, "Hello");
        assert_eq!(input.content, "World");
        assert_eq!(input.images.len(), 2);
        assert_eq!(input.images[1].filename, "b.jpg");
        assert_eq!(input.images[1].content_type, "image/jpeg");
    }

    #[test]
    fn test_create_form_requires_title_and_content() {
        let err = create_post_from_parts(vec![FormPart::text("title", "Hello")]).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "content is required"));
    }

    #[test]
    fn test_file_without_content_type_defaults() {
        let mut part = FormPart::file("images", "a.bin", "x", b"1");
        part.content_type = None;
        let upload = part.into_upload();
        assert_eq!(upload.content_type, "application/octet-stream");
    }

    #[test]
    fn test_text_images_field_is_ignored() {
        let input = create_post_from_parts(vec![
            FormPart::text("title", "t"),
            FormPart::text("content", "c"),
            FormPart::text("images", "https://elsewhere/evil.png"),
        ])
        .unwrap();
        assert!(input.images.is_empty());
    }

    #[test]
    fn test_update_form_drops_files_without_flag() {
        let input = update_post_from_parts(vec![
            FormPart::text("content", "new"),
            FormPart::file("images", "a.png", "image/png", b"a"),
        ])
        .unwrap();

        assert_eq!(input.title, None);
        assert_eq!(input.content.as_deref(), Some("new"));
        assert!(!input.replace_images);
        assert!(input.images.is_empty());
    }

    #[test]
    fn test_update_form_with_flag_keeps_files() {
        let input = update_post_from_parts(vec![
            FormPart::text("update_images", "True"),
            FormPart::file("images", "a.png", "image/png", b"a"),
        ])
        .unwrap();

        assert!(input.replace_images);
        assert_eq!(input.images.len(), 1);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("yes").unwrap());
        assert!(parse_flag(" 1 ").unwrap());
        assert!(!parse_flag("off").unwrap());
        assert!(!parse_flag("").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_invalid_utf8_text_is_bad_request() {
        let mut part = FormPart::text("title", "");
        part.bytes = vec![0xff, 0xfe];
        let err = create_post_from_parts(vec![part]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
