//! Parent-kind-agnostic handler bodies
//!
//! The project and blog post image endpoints differ only in the parent kind
//! and the route paths. Each thin route wrapper builds a `ParentRef` and
//! delegates here.

use std::sync::Arc;

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::Json;
use folio_core::models::{AssetKind, AssetPatch, AssetResponse, ParentRef};
use folio_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::services::UploadRequest;
use crate::state::AppState;

/// Extract an `UploadRequest` from a multipart form.
///
/// Recognized fields: `file` (required, the image payload), `alt_text`,
/// `caption`, `kind`, `display_order`, `is_primary`. Unknown fields are
/// ignored.
pub async fn parse_upload_multipart(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    let mut data: Option<Vec<u8>> = None;
    let mut content_type: Option<String> = None;
    let mut alt_text = None;
    let mut caption = None;
    let mut kind = None;
    let mut display_order = 0i32;
    let mut is_primary = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                content_type = field.content_type().map(|ct| ct.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read file: {}", e)))?;
                data = Some(bytes.to_vec());
            }
            "alt_text" => alt_text = Some(read_text_field(field).await?),
            "caption" => caption = Some(read_text_field(field).await?),
            "kind" => {
                let value = read_text_field(field).await?;
                kind = Some(AssetKind::parse(&value).ok_or_else(|| {
                    AppError::InvalidInput(format!("Unknown asset kind '{}'", value))
                })?);
            }
            "display_order" => {
                let value = read_text_field(field).await?;
                display_order = value.parse().map_err(|_| {
                    AppError::InvalidInput(format!("Invalid display_order '{}'", value))
                })?;
            }
            "is_primary" => {
                let value = read_text_field(field).await?;
                is_primary = value.parse().map_err(|_| {
                    AppError::InvalidInput(format!("Invalid is_primary '{}'", value))
                })?;
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::InvalidInput("Missing 'file' field".to_string()))?;
    let content_type = content_type
        .ok_or_else(|| AppError::InvalidInput("File field has no content type".to_string()))?;

    Ok(UploadRequest {
        data,
        content_type,
        alt_text,
        caption,
        kind,
        display_order,
        is_primary,
    })
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid form field: {}", e)))
}

pub async fn upload(
    state: Arc<AppState>,
    parent: ParentRef,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AssetResponse>), HttpAppError> {
    let request = parse_upload_multipart(multipart).await?;
    let asset = state.assets.upload(parent, request).await?;
    Ok((StatusCode::CREATED, Json(AssetResponse::from(asset))))
}

pub async fn list(
    state: Arc<AppState>,
    parent: ParentRef,
) -> Result<Json<Vec<AssetResponse>>, HttpAppError> {
    let assets = state.assets.list(parent).await?;
    Ok(Json(assets.into_iter().map(AssetResponse::from).collect()))
}

pub async fn get(
    state: Arc<AppState>,
    parent: ParentRef,
    asset_id: Uuid,
) -> Result<Json<AssetResponse>, HttpAppError> {
    let asset = state.assets.get(parent, asset_id).await?;
    Ok(Json(AssetResponse::from(asset)))
}

pub async fn update(
    state: Arc<AppState>,
    parent: ParentRef,
    asset_id: Uuid,
    patch: AssetPatch,
) -> Result<Json<AssetResponse>, HttpAppError> {
    let asset = state.assets.update(parent, asset_id, patch).await?;
    Ok(Json(AssetResponse::from(asset)))
}

pub async fn set_primary(
    state: Arc<AppState>,
    parent: ParentRef,
    asset_id: Uuid,
) -> Result<Json<AssetResponse>, HttpAppError> {
    let asset = state.assets.set_primary(parent, asset_id).await?;
    Ok(Json(AssetResponse::from(asset)))
}

pub async fn delete(
    state: Arc<AppState>,
    parent: ParentRef,
    asset_id: Uuid,
) -> Result<StatusCode, HttpAppError> {
    state.assets.delete(parent, asset_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
