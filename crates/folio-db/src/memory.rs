//! In-memory repository implementations
//!
//! Used by tests and local development without Postgres. A single mutex per
//! repository gives the same per-parent serialization the Postgres
//! implementation gets from advisory locks.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use folio_core::models::{Asset, AssetPatch, NewAsset, ParentRef, ParentSummary};
use folio_core::AppError;
use uuid::Uuid;

use crate::assets::AssetRepository;
use crate::parents::ParentSource;

/// In-memory asset repository.
#[derive(Default)]
pub struct MemoryAssetRepository {
    rows: Mutex<HashMap<Uuid, Asset>>,
}

impl MemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct row lookup for test assertions.
    pub fn get(&self, id: Uuid) -> Option<Asset> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl AssetRepository for MemoryAssetRepository {
    async fn create(&self, new: NewAsset, max_per_parent: i64) -> Result<Asset, AppError> {
        let mut rows = self.rows.lock().unwrap();

        let count = rows.values().filter(|a| a.parent() == new.parent).count() as i64;
        if count >= max_per_parent {
            return Err(AppError::LimitExceeded {
                count,
                max: max_per_parent,
            });
        }

        if new.is_primary {
            for asset in rows.values_mut().filter(|a| a.parent() == new.parent) {
                asset.is_primary = false;
            }
        }

        let now = Utc::now();
        let asset = Asset {
            id: Uuid::new_v4(),
            parent_kind: new.parent.kind,
            parent_id: new.parent.id,
            url: new.url,
            secure_url: new.secure_url,
            external_id: new.external_id,
            alt_text: new.alt_text,
            caption: new.caption,
            kind: new.kind,
            display_order: new.display_order,
            is_primary: new.is_primary,
            width: new.width,
            height: new.height,
            format: new.format,
            file_size: new.file_size,
            created_at: now,
            updated_at: now,
        };
        rows.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_all_by_parent(&self, parent: ParentRef) -> Result<Vec<Asset>, AppError> {
        let rows = self.rows.lock().unwrap();
        let mut assets: Vec<Asset> = rows
            .values()
            .filter(|a| a.parent() == parent)
            .cloned()
            .collect();
        assets.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(assets)
    }

    async fn count_by_parent(&self, parent: ParentRef) -> Result<i64, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|a| a.parent() == parent).count() as i64)
    }

    async fn clear_primary_for_parent(&self, parent: ParentRef) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut demoted = 0;
        for asset in rows
            .values_mut()
            .filter(|a| a.parent() == parent && a.is_primary)
        {
            asset.is_primary = false;
            asset.updated_at = Utc::now();
            demoted += 1;
        }
        Ok(demoted)
    }

    async fn clear_primary_except(
        &self,
        parent: ParentRef,
        keep_id: Uuid,
    ) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut demoted = 0;
        for asset in rows
            .values_mut()
            .filter(|a| a.parent() == parent && a.is_primary && a.id != keep_id)
        {
            asset.is_primary = false;
            asset.updated_at = Utc::now();
            demoted += 1;
        }
        Ok(demoted)
    }

    async fn update(
        &self,
        parent: ParentRef,
        id: Uuid,
        patch: AssetPatch,
    ) -> Result<Asset, AppError> {
        let mut rows = self.rows.lock().unwrap();

        // Existence first, so a NotFound never leaves demoted siblings
        // behind. The Postgres implementation gets this from its rolled-back
        // transaction.
        if !rows.get(&id).is_some_and(|a| a.parent() == parent) {
            return Err(AppError::NotFound("Image not found".to_string()));
        }

        if patch.is_primary == Some(true) {
            for asset in rows
                .values_mut()
                .filter(|a| a.parent() == parent && a.is_primary && a.id != id)
            {
                asset.is_primary = false;
                asset.updated_at = Utc::now();
            }
        }

        let asset = rows.get_mut(&id).expect("checked above");

        if let Some(alt_text) = patch.alt_text {
            asset.alt_text = Some(alt_text);
        }
        if let Some(caption) = patch.caption {
            asset.caption = Some(caption);
        }
        if let Some(kind) = patch.kind {
            asset.kind = kind;
        }
        if let Some(display_order) = patch.display_order {
            asset.display_order = display_order;
        }
        if let Some(is_primary) = patch.is_primary {
            asset.is_primary = is_primary;
        }
        asset.updated_at = Utc::now();
        Ok(asset.clone())
    }

    async fn set_primary(&self, parent: ParentRef, id: Uuid) -> Result<Asset, AppError> {
        let mut rows = self.rows.lock().unwrap();

        if !rows.get(&id).is_some_and(|a| a.parent() == parent) {
            return Err(AppError::NotFound("Image not found".to_string()));
        }

        for asset in rows
            .values_mut()
            .filter(|a| a.parent() == parent && a.is_primary && a.id != id)
        {
            asset.is_primary = false;
            asset.updated_at = Utc::now();
        }

        let asset = rows.get_mut(&id).expect("checked above");
        asset.is_primary = true;
        asset.updated_at = Utc::now();
        Ok(asset.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

/// In-memory parent source.
#[derive(Default)]
pub struct MemoryParentSource {
    parents: Mutex<HashMap<ParentRef, ParentSummary>>,
}

impl MemoryParentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parent and return its reference.
    pub fn insert(&self, parent: ParentRef, slug: &str) {
        self.parents.lock().unwrap().insert(
            parent,
            ParentSummary {
                id: parent.id,
                slug: slug.to_string(),
            },
        );
    }
}

#[async_trait]
impl ParentSource for MemoryParentSource {
    async fn resolve(&self, parent: ParentRef) -> Result<Option<ParentSummary>, AppError> {
        Ok(self.parents.lock().unwrap().get(&parent).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::models::{AssetKind, ParentKind};

    fn new_asset(parent: ParentRef, is_primary: bool) -> NewAsset {
        NewAsset {
            parent,
            url: "http://media.test/x".to_string(),
            secure_url: "https://media.test/x".to_string(),
            external_id: "x".to_string(),
            alt_text: None,
            caption: None,
            kind: AssetKind::Gallery,
            display_order: 0,
            is_primary,
            width: None,
            height: None,
            format: None,
            file_size: 100,
        }
    }

    fn project() -> ParentRef {
        ParentRef::new(ParentKind::Project, Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_create_enforces_count_bound() {
        let repo = MemoryAssetRepository::new();
        let parent = project();

        for _ in 0..3 {
            repo.create(new_asset(parent, false), 3).await.unwrap();
        }
        let err = repo.create(new_asset(parent, false), 3).await.unwrap_err();
        assert!(matches!(err, AppError::LimitExceeded { count: 3, max: 3 }));
        assert_eq!(repo.count_by_parent(parent).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_count_bound_is_per_parent() {
        let repo = MemoryAssetRepository::new();
        let p1 = project();
        let p2 = project();

        repo.create(new_asset(p1, false), 1).await.unwrap();
        // A full p1 does not block p2.
        repo.create(new_asset(p2, false), 1).await.unwrap();
        assert!(repo.create(new_asset(p1, false), 1).await.is_err());
    }

    #[tokio::test]
    async fn test_create_primary_demotes_siblings() {
        let repo = MemoryAssetRepository::new();
        let parent = project();

        let first = repo.create(new_asset(parent, true), 20).await.unwrap();
        assert!(first.is_primary);

        let second = repo.create(new_asset(parent, true), 20).await.unwrap();
        assert!(second.is_primary);
        assert!(!repo.get(first.id).unwrap().is_primary);

        let primaries = repo
            .find_all_by_parent(parent)
            .await
            .unwrap()
            .iter()
            .filter(|a| a.is_primary)
            .count();
        assert_eq!(primaries, 1);
    }

    #[tokio::test]
    async fn test_set_primary_promotes_exactly_one() {
        let repo = MemoryAssetRepository::new();
        let parent = project();

        let a = repo.create(new_asset(parent, true), 20).await.unwrap();
        let b = repo.create(new_asset(parent, false), 20).await.unwrap();

        let promoted = repo.set_primary(parent, b.id).await.unwrap();
        assert!(promoted.is_primary);
        assert!(!repo.get(a.id).unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_set_primary_missing_row_is_not_found() {
        let repo = MemoryAssetRepository::new();
        let err = repo
            .set_primary(project(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_promote_path_demotes_siblings() {
        let repo = MemoryAssetRepository::new();
        let parent = project();

        let a = repo.create(new_asset(parent, true), 20).await.unwrap();
        let b = repo.create(new_asset(parent, false), 20).await.unwrap();

        let patch = AssetPatch {
            is_primary: Some(true),
            caption: Some("cover".to_string()),
            ..Default::default()
        };
        let updated = repo.update(parent, b.id, patch).await.unwrap();
        assert!(updated.is_primary);
        assert_eq!(updated.caption.as_deref(), Some("cover"));
        assert!(!repo.get(a.id).unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_update_missing_row_leaves_siblings_untouched() {
        let repo = MemoryAssetRepository::new();
        let parent = project();
        let existing = repo.create(new_asset(parent, true), 20).await.unwrap();

        let patch = AssetPatch {
            is_primary: Some(true),
            ..Default::default()
        };
        let err = repo
            .update(parent, Uuid::new_v4(), patch)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        // The failed promotion must not have demoted the current primary.
        assert!(repo.get(existing.id).unwrap().is_primary);
    }

    #[tokio::test]
    async fn test_find_all_by_parent_ordering() {
        let repo = MemoryAssetRepository::new();
        let parent = project();

        let mut third = new_asset(parent, false);
        third.display_order = 2;
        let mut first = new_asset(parent, false);
        first.display_order = 0;
        let mut second = new_asset(parent, false);
        second.display_order = 1;

        let c = repo.create(third, 20).await.unwrap();
        let a = repo.create(first, 20).await.unwrap();
        let b = repo.create(second, 20).await.unwrap();

        let ordered: Vec<Uuid> = repo
            .find_all_by_parent(parent)
            .await
            .unwrap()
            .iter()
            .map(|x| x.id)
            .collect();
        assert_eq!(ordered, vec![a.id, b.id, c.id]);
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let repo = MemoryAssetRepository::new();
        let parent = project();
        let asset = repo.create(new_asset(parent, false), 20).await.unwrap();

        assert!(repo.delete_by_id(asset.id).await.unwrap());
        assert!(!repo.delete_by_id(asset.id).await.unwrap());
        assert!(repo.find_by_id(asset.id).await.unwrap().is_none());
    }
}
