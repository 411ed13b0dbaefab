//! Asset repository
//!
//! CRUD over asset metadata rows plus the invariant-maintaining operations:
//! clearing the primary flag on siblings and counting siblings. All
//! operations that check state for one parent and then write run inside a
//! transaction holding that parent's advisory lock, so no two concurrent
//! calls for the same parent can interleave between check and write. A
//! partial unique index on `(parent_kind, parent_id) WHERE is_primary`
//! backstops primary uniqueness at the schema level.

use async_trait::async_trait;
use chrono::Utc;
use folio_core::models::{Asset, AssetPatch, NewAsset, ParentRef};
use folio_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Asset metadata persistence.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Insert a new asset, enforcing the per-parent count bound and, when
    /// `new.is_primary` is set, demoting every sibling first. Atomic per
    /// parent; fails with `LimitExceeded` when the parent is full.
    async fn create(&self, new: NewAsset, max_per_parent: i64) -> Result<Asset, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Asset>, AppError>;

    /// All assets for a parent, ordered by display_order ascending.
    async fn find_all_by_parent(&self, parent: ParentRef) -> Result<Vec<Asset>, AppError>;

    async fn count_by_parent(&self, parent: ParentRef) -> Result<i64, AppError>;

    /// Set `is_primary = false` on every asset of the parent. Returns the
    /// number of demoted rows.
    async fn clear_primary_for_parent(&self, parent: ParentRef) -> Result<u64, AppError>;

    /// Same, but leaves `keep_id` untouched.
    async fn clear_primary_except(&self, parent: ParentRef, keep_id: Uuid)
        -> Result<u64, AppError>;

    /// Apply a metadata patch. When the patch promotes the asset to primary,
    /// siblings are demoted in the same atomic step. Fails with `NotFound`
    /// if the row no longer exists under this parent.
    async fn update(
        &self,
        parent: ParentRef,
        id: Uuid,
        patch: AssetPatch,
    ) -> Result<Asset, AppError>;

    /// Promote one asset to primary, demoting all siblings atomically.
    async fn set_primary(&self, parent: ParentRef, id: Uuid) -> Result<Asset, AppError>;

    /// Delete a row. Returns whether a row was deleted.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Postgres-backed asset repository.
#[derive(Clone)]
pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Take the transaction-scoped advisory lock for one parent. Released
    /// automatically at commit/rollback.
    async fn lock_parent(
        tx: &mut Transaction<'_, Postgres>,
        parent: ParentRef,
    ) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(parent.to_string())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn count_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        parent: ParentRef,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assets WHERE parent_kind = $1 AND parent_id = $2",
        )
        .bind(parent.kind)
        .bind(parent.id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(count)
    }

    async fn clear_primary_except_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        parent: ParentRef,
        keep_id: Option<Uuid>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE assets
            SET is_primary = false, updated_at = $3
            WHERE parent_kind = $1 AND parent_id = $2 AND is_primary
              AND ($4::uuid IS NULL OR id <> $4)
            "#,
        )
        .bind(parent.kind)
        .bind(parent.id)
        .bind(Utc::now())
        .bind(keep_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    #[tracing::instrument(skip(self, new), fields(db.table = "assets", db.operation = "insert", parent = %new.parent))]
    async fn create(&self, new: NewAsset, max_per_parent: i64) -> Result<Asset, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_parent(&mut tx, new.parent).await?;

        let count = Self::count_in_tx(&mut tx, new.parent).await?;
        if count >= max_per_parent {
            // tx dropped here, lock released on rollback
            return Err(AppError::LimitExceeded {
                count,
                max: max_per_parent,
            });
        }

        if new.is_primary {
            Self::clear_primary_except_in_tx(&mut tx, new.parent, None).await?;
        }

        let now = Utc::now();
        let row: Asset = sqlx::query_as(
            r#"
            INSERT INTO assets (
                id, parent_kind, parent_id,
                url, secure_url, external_id,
                alt_text, caption, kind, display_order, is_primary,
                width, height, format, file_size,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.parent.kind)
        .bind(new.parent.id)
        .bind(&new.url)
        .bind(&new.secure_url)
        .bind(&new.external_id)
        .bind(&new.alt_text)
        .bind(&new.caption)
        .bind(new.kind)
        .bind(new.display_order)
        .bind(new.is_primary)
        .bind(new.width)
        .bind(new.height)
        .bind(&new.format)
        .bind(new.file_size)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        let row: Option<Asset> = sqlx::query_as("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select", parent = %parent))]
    async fn find_all_by_parent(&self, parent: ParentRef) -> Result<Vec<Asset>, AppError> {
        let rows: Vec<Asset> = sqlx::query_as(
            r#"
            SELECT * FROM assets
            WHERE parent_kind = $1 AND parent_id = $2
            ORDER BY display_order ASC, created_at ASC
            "#,
        )
        .bind(parent.kind)
        .bind(parent.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select", parent = %parent))]
    async fn count_by_parent(&self, parent: ParentRef) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assets WHERE parent_kind = $1 AND parent_id = $2",
        )
        .bind(parent.kind)
        .bind(parent.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "update", parent = %parent))]
    async fn clear_primary_for_parent(&self, parent: ParentRef) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE assets
            SET is_primary = false, updated_at = $3
            WHERE parent_kind = $1 AND parent_id = $2 AND is_primary
            "#,
        )
        .bind(parent.kind)
        .bind(parent.id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "update", parent = %parent))]
    async fn clear_primary_except(
        &self,
        parent: ParentRef,
        keep_id: Uuid,
    ) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let demoted = Self::clear_primary_except_in_tx(&mut tx, parent, Some(keep_id)).await?;
        tx.commit().await?;
        Ok(demoted)
    }

    #[tracing::instrument(skip(self, patch), fields(db.table = "assets", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        parent: ParentRef,
        id: Uuid,
        patch: AssetPatch,
    ) -> Result<Asset, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_parent(&mut tx, parent).await?;

        if patch.is_primary == Some(true) {
            Self::clear_primary_except_in_tx(&mut tx, parent, Some(id)).await?;
        }

        let row: Option<Asset> = sqlx::query_as(
            r#"
            UPDATE assets
            SET alt_text      = COALESCE($4, alt_text),
                caption       = COALESCE($5, caption),
                kind          = COALESCE($6::asset_kind, kind),
                display_order = COALESCE($7, display_order),
                is_primary    = COALESCE($8, is_primary),
                updated_at    = $9
            WHERE id = $1 AND parent_kind = $2 AND parent_id = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(parent.kind)
        .bind(parent.id)
        .bind(&patch.alt_text)
        .bind(&patch.caption)
        .bind(patch.kind)
        .bind(patch.display_order)
        .bind(patch.is_primary)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;
        tx.commit().await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "update", db.record_id = %id, parent = %parent))]
    async fn set_primary(&self, parent: ParentRef, id: Uuid) -> Result<Asset, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_parent(&mut tx, parent).await?;

        Self::clear_primary_except_in_tx(&mut tx, parent, Some(id)).await?;

        let row: Option<Asset> = sqlx::query_as(
            r#"
            UPDATE assets
            SET is_primary = true, updated_at = $4
            WHERE id = $1 AND parent_kind = $2 AND parent_id = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(parent.kind)
        .bind(parent.id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;
        tx.commit().await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "delete", db.record_id = %id))]
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
