//! Shared helpers for post-service integration tests

pub mod flaky_object_store;
pub mod multipart;
