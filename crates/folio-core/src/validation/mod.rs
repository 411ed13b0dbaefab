//! Validation modules

pub mod file;

pub use file::{FileValidationError, FileValidator, ImageFormat};
