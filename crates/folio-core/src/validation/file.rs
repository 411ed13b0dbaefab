//! Image file validation
//!
//! Validates untrusted upload payloads before any remote call is made: size
//! budget, content-type allow-list, and magic-byte signature matching the
//! declared type. The signature check defends against a caller lying about
//! the content type to smuggle arbitrary content through image-only paths.

/// Image file validation errors
#[derive(Debug, thiserror::Error)]
pub enum FileValidationError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File content does not match declared content type {content_type}")]
    SignatureMismatch { content_type: String },
}

/// Image formats recognized by the validator, keyed by declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Leading byte signature for the format.
    pub fn magic_bytes(&self) -> &'static [u8] {
        match self {
            ImageFormat::Jpeg => &[0xFF, 0xD8, 0xFF],
            ImageFormat::Png => &[0x89, 0x50, 0x4E, 0x47],
            ImageFormat::Gif => &[0x47, 0x49, 0x46],
            ImageFormat::Webp => &[0x52, 0x49, 0x46, 0x46],
        }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        data.starts_with(self.magic_bytes())
    }
}

/// Pure image file validator. Never consumes or mutates the payload.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: usize,
    allowed_content_types: Vec<String>,
}

impl FileValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types,
        }
    }

    /// Validate size, declared content type, and magic-byte signature.
    ///
    /// Checks run cheapest-first so an oversized payload is rejected before
    /// any byte inspection.
    pub fn validate(&self, data: &[u8], content_type: &str) -> Result<(), FileValidationError> {
        if data.is_empty() {
            return Err(FileValidationError::EmptyFile);
        }

        if data.len() > self.max_file_size {
            return Err(FileValidationError::FileTooLarge {
                size: data.len(),
                max: self.max_file_size,
            });
        }

        let normalized = content_type.to_lowercase();
        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(FileValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        // The allow-list is configurable; a listed type the validator has no
        // signature for is rejected rather than waved through.
        let format = ImageFormat::from_content_type(&normalized).ok_or_else(|| {
            FileValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            }
        })?;

        if !format.matches(data) {
            return Err(FileValidationError::SignatureMismatch {
                content_type: content_type.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> FileValidator {
        FileValidator::new(
            10 * 1024 * 1024,
            vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
        )
    }

    #[test]
    fn test_rejects_empty_file() {
        let err = validator().validate(&[], "image/png").unwrap_err();
        assert!(matches!(err, FileValidationError::EmptyFile));
    }

    #[test]
    fn test_rejects_oversized_file() {
        let v = FileValidator::new(16, vec!["image/png".to_string()]);
        let mut data = vec![0x89, 0x50, 0x4E, 0x47];
        data.resize(17, 0);
        let err = v.validate(&data, "image/png").unwrap_err();
        assert!(matches!(
            err,
            FileValidationError::FileTooLarge { size: 17, max: 16 }
        ));
    }

    #[test]
    fn test_rejects_disallowed_content_type() {
        let err = validator()
            .validate(&[0x00, 0x01], "application/pdf")
            .unwrap_err();
        assert!(matches!(err, FileValidationError::InvalidContentType { .. }));
    }

    #[test]
    fn test_accepts_valid_signatures() {
        let v = validator();
        assert!(v.validate(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00], "image/jpeg").is_ok());
        assert!(v
            .validate(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], "image/png")
            .is_ok());
        assert!(v.validate(b"GIF89a....", "image/gif").is_ok());
        assert!(v.validate(b"RIFF....WEBP", "image/webp").is_ok());
    }

    #[test]
    fn test_rejects_arbitrary_bytes_declared_as_png() {
        // Declared type is allowed and the size is fine; only the magic bytes
        // expose the lie.
        let data = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00];
        let err = validator().validate(&data, "image/png").unwrap_err();
        assert!(matches!(err, FileValidationError::SignatureMismatch { .. }));
    }

    #[test]
    fn test_rejects_zeroed_bytes_declared_as_jpeg() {
        let err = validator()
            .validate(&[0x00, 0x00, 0x00, 0x00], "image/jpeg")
            .unwrap_err();
        assert!(matches!(err, FileValidationError::SignatureMismatch { .. }));
    }

    #[test]
    fn test_rejects_cross_format_payload() {
        // A real PNG declared as JPEG must not pass.
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let err = validator().validate(&png, "image/jpeg").unwrap_err();
        assert!(matches!(err, FileValidationError::SignatureMismatch { .. }));
    }
}
