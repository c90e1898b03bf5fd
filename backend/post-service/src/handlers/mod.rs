/// HTTP handlers for post endpoints
///
/// This module contains handlers for:
/// - Posts: list, create, read, update, delete with image attachments
/// - Health: liveness check at `/`
///
/// `configure` registers every route; the binary and the integration tests
/// build their `App` from it.
use actix_web::web;

pub mod form;
pub mod health;
pub mod posts;

// Re-export handler functions at module level
pub use health::health_check;
pub use posts::{create_post, delete_post, get_post, list_posts, update_post};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health_check))
        .service(
            web::resource("/posts")
                .route(web::get().to(list_posts))
                .route(web::post().to(create_post)),
        )
        .service(
            web::resource("/posts/{post_id}")
                .route(web::get().to(get_post))
                .route(web::put().to(update_post))
                .route(web::delete().to(delete_post)),
        );
}
