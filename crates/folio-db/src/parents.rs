//! Parent resolution
//!
//! The media subsystem only needs to know that a parent exists and what its
//! slug is; everything else about projects and blog posts lives in their own
//! CRUD layer.

use async_trait::async_trait;
use folio_core::models::{ParentKind, ParentRef, ParentSummary};
use folio_core::AppError;
use sqlx::PgPool;

/// Resolves a parent reference to its minimal summary, or `None` when the
/// parent does not exist.
#[async_trait]
pub trait ParentSource: Send + Sync {
    async fn resolve(&self, parent: ParentRef) -> Result<Option<ParentSummary>, AppError>;
}

/// Postgres-backed parent resolution over the projects and blog_posts tables.
#[derive(Clone)]
pub struct PgParentSource {
    pool: PgPool,
}

impl PgParentSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParentSource for PgParentSource {
    #[tracing::instrument(skip(self), fields(db.operation = "select", parent = %parent))]
    async fn resolve(&self, parent: ParentRef) -> Result<Option<ParentSummary>, AppError> {
        let query = match parent.kind {
            ParentKind::Project => "SELECT id, slug FROM projects WHERE id = $1",
            ParentKind::BlogPost => "SELECT id, slug FROM blog_posts WHERE id = $1",
        };
        let summary: Option<ParentSummary> = sqlx::query_as(query)
            .bind(parent.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(summary)
    }
}
