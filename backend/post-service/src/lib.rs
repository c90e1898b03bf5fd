/// Post Service Library
///
/// HTTP resource API for posts: a title, text content and a set of images.
/// Records live in DynamoDB, image blobs in S3 under the post id prefix.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and multipart form parsing
/// - `models`: Post record and typed operation inputs
/// - `services`: Post lifecycle and image storage logic
/// - `storage`: Record store and object store ports with AWS and in-memory adapters
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
