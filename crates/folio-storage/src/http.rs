//! HTTP-backed remote media store client
//!
//! Talks to the external store over its REST surface: multipart POST for
//! uploads, DELETE by external id. Retries are not implemented here; a failed
//! call surfaces as a `StoreError` and the orchestrator decides what to do.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::traits::{DeleteOutcome, MediaStore, RemoteObject, StoreError, StoreResult};

const UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Upload response body returned by the remote store.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    url: String,
    secure_url: String,
    format: Option<String>,
    bytes: u64,
    width: Option<u32>,
    height: Option<u32>,
}

/// Remote media store client over HTTP.
pub struct HttpMediaStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpMediaStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl MediaStore for HttpMediaStore {
    #[tracing::instrument(skip(self, data), fields(folder = %folder, bytes = data.len()))]
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> StoreResult<RemoteObject> {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name("upload")
            .mime_str(content_type)
            .map_err(|e| StoreError::UploadFailed(format!("invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string());

        let response = self
            .authorized(self.client.post(format!("{}/v1/media", self.base_url)))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoreError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::UploadFailed(format!(
                "store returned {}: {}",
                status, body
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        tracing::debug!(external_id = %body.public_id, "Uploaded binary to remote store");

        Ok(RemoteObject {
            external_id: body.public_id,
            url: body.url,
            secure_url: body.secure_url,
            format: body.format,
            byte_size: body.bytes,
            width: body.width,
            height: body.height,
        })
    }

    #[tracing::instrument(skip(self), fields(external_id = %external_id))]
    async fn delete(&self, external_id: &str) -> StoreResult<DeleteOutcome> {
        if external_id.is_empty() {
            return Ok(DeleteOutcome::Skipped);
        }

        let response = self
            .authorized(
                self.client
                    .delete(format!("{}/v1/media/{}", self.base_url, external_id)),
            )
            .send()
            .await
            .map_err(|e| StoreError::DeleteFailed(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::DeleteFailed(format!(
                "store returned {}: {}",
                status, body
            )));
        }

        Ok(DeleteOutcome::Deleted)
    }
}
