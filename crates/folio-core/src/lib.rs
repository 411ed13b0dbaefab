//! Folio Core Library
//!
//! This crate provides the domain models, error types, configuration, and file
//! validation shared across all Folio components.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use validation::{FileValidationError, FileValidator, ImageFormat};
