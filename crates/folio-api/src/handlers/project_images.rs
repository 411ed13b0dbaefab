//! Project image endpoints.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use folio_core::models::{AssetPatch, AssetResponse, ParentKind, ParentRef};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::shared;
use crate::state::AppState;

fn parent(project_id: Uuid) -> ParentRef {
    ParentRef::new(ParentKind::Project, project_id)
}

#[utoipa::path(
    post,
    path = "/api/v0/projects/{project_id}/images",
    tag = "project-images",
    params(("project_id" = Uuid, Path, description = "Project identifier")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded", body = AssetResponse),
        (status = 400, description = "Invalid input or file", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 502, description = "Remote media store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(project_id = %project_id, operation = "upload_project_image"))]
pub async fn upload_project_image(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AssetResponse>), HttpAppError> {
    shared::upload(state, parent(project_id), multipart).await
}

#[utoipa::path(
    get,
    path = "/api/v0/projects/{project_id}/images",
    tag = "project-images",
    params(("project_id" = Uuid, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Images ordered by display_order", body = Vec<AssetResponse>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(project_id = %project_id, operation = "list_project_images"))]
pub async fn list_project_images(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<AssetResponse>>, HttpAppError> {
    shared::list(state, parent(project_id)).await
}

#[utoipa::path(
    get,
    path = "/api/v0/projects/{project_id}/images/{image_id}",
    tag = "project-images",
    params(
        ("project_id" = Uuid, Path, description = "Project identifier"),
        ("image_id" = Uuid, Path, description = "Image identifier")
    ),
    responses(
        (status = 200, description = "Image metadata", body = AssetResponse),
        (status = 400, description = "Image belongs to another parent", body = ErrorResponse),
        (status = 404, description = "Project or image not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(project_id = %project_id, image_id = %image_id, operation = "get_project_image"))]
pub async fn get_project_image(
    State(state): State<Arc<AppState>>,
    Path((project_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AssetResponse>, HttpAppError> {
    shared::get(state, parent(project_id), image_id).await
}

/// Metadata update. Served on both PUT and PATCH; the patch semantics are
/// merge-style either way, `None` fields stay unchanged.
#[utoipa::path(
    put,
    path = "/api/v0/projects/{project_id}/images/{image_id}",
    tag = "project-images",
    params(
        ("project_id" = Uuid, Path, description = "Project identifier"),
        ("image_id" = Uuid, Path, description = "Image identifier")
    ),
    request_body = AssetPatch,
    responses(
        (status = 200, description = "Updated image metadata", body = AssetResponse),
        (status = 400, description = "Invalid patch or wrong parent", body = ErrorResponse),
        (status = 404, description = "Project or image not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, patch), fields(project_id = %project_id, image_id = %image_id, operation = "update_project_image"))]
pub async fn update_project_image(
    State(state): State<Arc<AppState>>,
    Path((project_id, image_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<AssetPatch>,
) -> Result<Json<AssetResponse>, HttpAppError> {
    shared::update(state, parent(project_id), image_id, patch).await
}

#[utoipa::path(
    put,
    path = "/api/v0/projects/{project_id}/images/{image_id}/primary",
    tag = "project-images",
    params(
        ("project_id" = Uuid, Path, description = "Project identifier"),
        ("image_id" = Uuid, Path, description = "Image identifier")
    ),
    responses(
        (status = 200, description = "Image promoted to primary", body = AssetResponse),
        (status = 400, description = "Image belongs to another parent", body = ErrorResponse),
        (status = 404, description = "Project or image not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(project_id = %project_id, image_id = %image_id, operation = "set_primary_project_image"))]
pub async fn set_primary_project_image(
    State(state): State<Arc<AppState>>,
    Path((project_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AssetResponse>, HttpAppError> {
    shared::set_primary(state, parent(project_id), image_id).await
}

#[utoipa::path(
    delete,
    path = "/api/v0/projects/{project_id}/images/{image_id}",
    tag = "project-images",
    params(
        ("project_id" = Uuid, Path, description = "Project identifier"),
        ("image_id" = Uuid, Path, description = "Image identifier")
    ),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, description = "Image belongs to another parent", body = ErrorResponse),
        (status = 404, description = "Project or image not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(project_id = %project_id, image_id = %image_id, operation = "delete_project_image"))]
pub async fn delete_project_image(
    State(state): State<Arc<AppState>>,
    Path((project_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, HttpAppError> {
    shared::delete(state, parent(project_id), image_id).await
}
