/// Post handlers - HTTP endpoints for post operations
use crate::config::UploadConfig;
use crate::error::Result;
use crate::handlers::form::{create_post_from_parts, read_parts, update_post_from_parts};
use crate::services::{PostService, PostWrite};
use actix_multipart::Multipart;
use actix_web::{http::StatusCode, web, HttpResponse, HttpResponseBuilder};

/// Set on create/update responses when some image files could not be stored
pub const UPLOAD_FAILURES_HEADER: &str = "x-image-upload-failures";

/// List every post
/// GET /posts
pub async fn list_posts(service: web::Data<PostService>) -> Result<HttpResponse> {
    let posts = service.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Create a new post from a multipart form
/// POST /posts
pub async fn create_post(
    service: web::Data<PostService>,
    uploads: web::Data<UploadConfig>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let parts = read_parts(payload, uploads.max_upload_bytes).await?;
    let input = create_post_from_parts(parts)?;

    let written = service.create_post(input).await?;
    Ok(write_response(StatusCode::CREATED, written))
}

/// Get a post by ID
/// GET /posts/{post_id}
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post = service.get_post(&post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Partially update a post from a multipart form
/// PUT /posts/{post_id}
pub async fn update_post(
    service: web::Data<PostService>,
    uploads: web::Data<UploadConfig>,
    post_id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let parts = read_parts(payload, uploads.max_upload_bytes).await?;
    let input = match update_post_from_parts(parts) {
        Ok(input) => input,
        Err(err) => {
            // A missing post takes precedence over a malformed form.
            service.get_post(&post_id).await?;
            return Err(err);
        }
    };

    let written = service.update_post(&post_id, input).await?;
    Ok(write_response(StatusCode::OK, written))
}

/// Delete a post and its images
/// DELETE /posts/{post_id}
pub async fn delete_post(
    service: web::Data<PostService>,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    service.delete_post(&post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn write_response(status: StatusCode, written: PostWrite) -> HttpResponse {
    let mut response = HttpResponseBuilder::new(status);

    let failed = written.uploads.failure_count();
    if failed > 0 {
        for (filename, reason) in written.uploads.failures() {
            tracing::warn!(post_id = %written.post.id, %filename, %reason, "image not attached");
        }
        response.insert_header((UPLOAD_FAILURES_HEADER, failed.to_string()));
    }

    response.json(written.post)
}
