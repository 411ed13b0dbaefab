//! Application services

pub mod assets;
pub mod ownership;

pub use assets::{MediaAssetService, UploadRequest};
pub use ownership::verify_ownership;
