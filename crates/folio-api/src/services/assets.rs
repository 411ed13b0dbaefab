//! Media asset upload orchestration
//!
//! Coordinates validation, remote upload, local persistence, the primary-flag
//! invariant, and compensating deletion on partial failure, for both parent
//! kinds. The write order is fixed: remote store first, local row second.
//! When the local write fails after the remote upload succeeded, the remote
//! object is deleted best-effort so transient database failures do not leak
//! an unbounded number of unreferenced remote objects. The compensating
//! delete itself is allowed to fail; that failure is logged and the object
//! stays behind for out-of-band cleanup.

use std::sync::Arc;

use folio_core::models::{Asset, AssetKind, AssetPatch, NewAsset, ParentRef, ParentSummary};
use folio_core::{AppError, FileValidator};
use folio_db::{AssetRepository, ParentSource};
use folio_storage::MediaStore;
use uuid::Uuid;
use validator::Validate;

use super::ownership::verify_ownership;

/// An inbound upload: the raw payload plus caller-supplied metadata.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub content_type: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub kind: Option<AssetKind>,
    pub display_order: i32,
    pub is_primary: bool,
}

/// Upload orchestrator for image assets, parameterized by the parent
/// reference passed to each call rather than duplicated per parent type.
#[derive(Clone)]
pub struct MediaAssetService {
    repository: Arc<dyn AssetRepository>,
    parents: Arc<dyn ParentSource>,
    store: Arc<dyn MediaStore>,
    validator: FileValidator,
    max_assets_per_parent: i64,
    root_folder: String,
}

impl MediaAssetService {
    pub fn new(
        repository: Arc<dyn AssetRepository>,
        parents: Arc<dyn ParentSource>,
        store: Arc<dyn MediaStore>,
        validator: FileValidator,
        max_assets_per_parent: i64,
        root_folder: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            parents,
            store,
            validator,
            max_assets_per_parent,
            root_folder: root_folder.into(),
        }
    }

    /// Remote folder path for a parent, derived from its slug.
    fn folder_for(&self, parent: ParentRef, slug: &str) -> String {
        format!("{}/{}/{}", self.root_folder, parent.kind.folder_segment(), slug)
    }

    async fn resolve_parent(&self, parent: ParentRef) -> Result<ParentSummary, AppError> {
        self.parents.resolve(parent).await?.ok_or_else(|| {
            AppError::NotFound(format!("{} not found", parent.kind.display_name()))
        })
    }

    /// Fetch an asset and verify it belongs to the addressed parent.
    async fn fetch_owned(&self, parent: ParentRef, asset_id: Uuid) -> Result<Asset, AppError> {
        let asset = self
            .repository
            .find_by_id(asset_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;
        verify_ownership(&asset, parent)?;
        Ok(asset)
    }

    fn effective_kind(
        &self,
        parent: ParentRef,
        requested: Option<AssetKind>,
    ) -> Result<AssetKind, AppError> {
        let kind = requested.unwrap_or_else(|| AssetKind::default_for(parent.kind));
        if !kind.allowed_for(parent.kind) {
            return Err(AppError::InvalidInput(format!(
                "Asset kind '{}' is not valid for {}s",
                kind.as_str(),
                parent.kind
            )));
        }
        Ok(kind)
    }

    /// Upload a new image asset.
    ///
    /// Pipeline: resolve parent, validate payload, early count check, remote
    /// upload, persist row. The repository re-checks the count bound and the
    /// primary invariant under its per-parent lock; the early check here only
    /// avoids spending a remote upload on a parent that is already full.
    #[tracing::instrument(skip(self, request), fields(parent = %parent, operation = "upload_asset"))]
    pub async fn upload(
        &self,
        parent: ParentRef,
        request: UploadRequest,
    ) -> Result<Asset, AppError> {
        let summary = self.resolve_parent(parent).await?;

        self.validator
            .validate(&request.data, &request.content_type)?;

        if request.display_order < 0 {
            return Err(AppError::InvalidInput(
                "display_order must be non-negative".to_string(),
            ));
        }
        let kind = self.effective_kind(parent, request.kind)?;

        let count = self.repository.count_by_parent(parent).await?;
        if count >= self.max_assets_per_parent {
            return Err(AppError::LimitExceeded {
                count,
                max: self.max_assets_per_parent,
            });
        }

        let folder = self.folder_for(parent, &summary.slug);
        let remote = self
            .store
            .upload(request.data, &request.content_type, &folder)
            .await
            .map_err(|e| AppError::RemoteStore(e.to_string()))?;

        let new_asset = NewAsset {
            parent,
            url: remote.url,
            secure_url: remote.secure_url,
            external_id: remote.external_id.clone(),
            alt_text: request.alt_text,
            caption: request.caption,
            kind,
            display_order: request.display_order,
            is_primary: request.is_primary,
            width: remote.width.map(|w| w as i32),
            height: remote.height.map(|h| h as i32),
            format: remote.format,
            file_size: remote.byte_size as i64,
        };

        match self
            .repository
            .create(new_asset, self.max_assets_per_parent)
            .await
        {
            Ok(asset) => {
                tracing::info!(asset_id = %asset.id, external_id = %asset.external_id, "Image asset created");
                Ok(asset)
            }
            Err(persist_err) => {
                // Remote upload succeeded but the row was not written: delete
                // the remote object so it does not leak, then propagate the
                // persistence error. A failed compensation is logged only.
                match self.store.delete(&remote.external_id).await {
                    Ok(_) => tracing::debug!(
                        external_id = %remote.external_id,
                        "Compensating remote delete after persistence failure"
                    ),
                    Err(cleanup_err) => tracing::warn!(
                        error = %cleanup_err,
                        external_id = %remote.external_id,
                        "Failed to delete remote object after persistence failure"
                    ),
                }
                Err(persist_err)
            }
        }
    }

    /// All assets of a parent, ordered by display_order ascending.
    #[tracing::instrument(skip(self), fields(parent = %parent, operation = "list_assets"))]
    pub async fn list(&self, parent: ParentRef) -> Result<Vec<Asset>, AppError> {
        self.resolve_parent(parent).await?;
        self.repository.find_all_by_parent(parent).await
    }

    #[tracing::instrument(skip(self), fields(parent = %parent, asset_id = %asset_id, operation = "get_asset"))]
    pub async fn get(&self, parent: ParentRef, asset_id: Uuid) -> Result<Asset, AppError> {
        self.resolve_parent(parent).await?;
        self.fetch_owned(parent, asset_id).await
    }

    /// Apply a metadata patch. Promoting to primary demotes every sibling in
    /// the same repository step. Never touches the remote object.
    #[tracing::instrument(skip(self, patch), fields(parent = %parent, asset_id = %asset_id, operation = "update_asset"))]
    pub async fn update(
        &self,
        parent: ParentRef,
        asset_id: Uuid,
        patch: AssetPatch,
    ) -> Result<Asset, AppError> {
        self.resolve_parent(parent).await?;
        patch.validate()?;
        if let Some(kind) = patch.kind {
            self.effective_kind(parent, Some(kind))?;
        }

        self.fetch_owned(parent, asset_id).await?;
        self.repository.update(parent, asset_id, patch).await
    }

    /// Promote an asset to primary, demoting all siblings.
    #[tracing::instrument(skip(self), fields(parent = %parent, asset_id = %asset_id, operation = "set_primary"))]
    pub async fn set_primary(
        &self,
        parent: ParentRef,
        asset_id: Uuid,
    ) -> Result<Asset, AppError> {
        self.resolve_parent(parent).await?;
        self.fetch_owned(parent, asset_id).await?;
        self.repository.set_primary(parent, asset_id).await
    }

    /// Delete an asset. The local row is the authoritative record of
    /// existence and goes first; remote deletion is best-effort and its
    /// failure never surfaces to the caller.
    #[tracing::instrument(skip(self), fields(parent = %parent, asset_id = %asset_id, operation = "delete_asset"))]
    pub async fn delete(&self, parent: ParentRef, asset_id: Uuid) -> Result<(), AppError> {
        self.resolve_parent(parent).await?;
        let asset = self.fetch_owned(parent, asset_id).await?;

        let deleted = self.repository.delete_by_id(asset_id).await?;
        if !deleted {
            return Err(AppError::NotFound("Image not found".to_string()));
        }

        match self.store.delete(&asset.external_id).await {
            Ok(outcome) => {
                tracing::debug!(external_id = %asset.external_id, ?outcome, "Remote object deleted")
            }
            Err(e) => tracing::warn!(
                error = %e,
                external_id = %asset.external_id,
                "Failed to delete remote object; row already removed"
            ),
        }

        Ok(())
    }
}
