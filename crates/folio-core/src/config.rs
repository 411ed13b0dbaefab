//! Configuration module
//!
//! This module provides the environment-driven configuration for the API
//! service, including database, remote media store, and media limit settings.

use std::env;

use anyhow::Context;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_MAX_ASSETS_PER_PARENT: i64 = 20;
const DEFAULT_IMAGE_MAX_FILE_SIZE_MB: usize = 10;
const DEFAULT_MEDIA_ROOT_FOLDER: &str = "portfolio";

/// Service configuration, loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    // Database configuration
    pub database_url: String,
    pub db_max_connections: u32,
    // Remote media store configuration
    pub media_store_base_url: String,
    pub media_store_api_key: Option<String>,
    pub media_store_root_folder: String,
    // Media limits (externally supplied, never derived)
    pub max_assets_per_parent: i64,
    pub image_max_file_size_bytes: usize,
    pub image_allowed_content_types: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` and `MEDIA_STORE_BASE_URL` are required; everything else
    /// falls back to a default.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let media_store_base_url =
            env::var("MEDIA_STORE_BASE_URL").context("MEDIA_STORE_BASE_URL must be set")?;

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(MAX_CONNECTIONS);

        let max_assets_per_parent = env::var("MAX_ASSETS_PER_PARENT")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_MAX_ASSETS_PER_PARENT);

        let image_max_file_size_mb = env::var("IMAGE_MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_IMAGE_MAX_FILE_SIZE_MB);

        let image_allowed_content_types = env::var("IMAGE_ALLOWED_CONTENT_TYPES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                    "image/gif".to_string(),
                    "image/webp".to_string(),
                ]
            });

        Ok(Self {
            server_port,
            cors_origins,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url,
            db_max_connections,
            media_store_base_url,
            media_store_api_key: env::var("MEDIA_STORE_API_KEY").ok(),
            media_store_root_folder: env::var("MEDIA_STORE_ROOT_FOLDER")
                .unwrap_or_else(|_| DEFAULT_MEDIA_ROOT_FOLDER.to_string()),
            max_assets_per_parent,
            image_max_file_size_bytes: image_max_file_size_mb * 1024 * 1024,
            image_allowed_content_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Construct directly; from_env is covered by deployment smoke tests.
        let config = Config {
            server_port: DEFAULT_SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            database_url: "postgres://localhost/folio".to_string(),
            db_max_connections: MAX_CONNECTIONS,
            media_store_base_url: "https://media.example.com".to_string(),
            media_store_api_key: None,
            media_store_root_folder: DEFAULT_MEDIA_ROOT_FOLDER.to_string(),
            max_assets_per_parent: DEFAULT_MAX_ASSETS_PER_PARENT,
            image_max_file_size_bytes: DEFAULT_IMAGE_MAX_FILE_SIZE_MB * 1024 * 1024,
            image_allowed_content_types: vec!["image/png".to_string()],
        };
        assert_eq!(config.max_assets_per_parent, 20);
        assert_eq!(config.image_max_file_size_bytes, 10 * 1024 * 1024);
    }
}
