/// Business logic layer
///
/// - `posts`: post lifecycle (create, read, update, delete, list)
/// - `images`: per-post image storage under the post id prefix
pub mod images;
pub mod posts;

pub use images::{ImageGateway, UploadOutcome, UploadReport};
pub use posts::{PostService, PostWrite};
