use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The two kinds of content an asset can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "parent_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ParentKind {
    Project,
    BlogPost,
}

impl ParentKind {
    /// Stable identifier used in advisory-lock keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentKind::Project => "project",
            ParentKind::BlogPost => "blog_post",
        }
    }

    /// Human-readable name for error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ParentKind::Project => "Project",
            ParentKind::BlogPost => "Blog post",
        }
    }

    /// URL path collection segment (`/{collection}/{id}/images`).
    pub fn collection(&self) -> &'static str {
        match self {
            ParentKind::Project => "projects",
            ParentKind::BlogPost => "posts",
        }
    }

    /// Remote store folder segment for this parent kind.
    pub fn folder_segment(&self) -> &'static str {
        self.collection()
    }
}

impl std::fmt::Display for ParentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (kind, id) reference to the owning content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub kind: ParentKind,
    pub id: Uuid,
}

impl ParentRef {
    pub fn new(kind: ParentKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Minimal facet of a parent entity needed by the media subsystem:
/// existence plus the slug the remote folder path is derived from.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ParentSummary {
    pub id: Uuid,
    pub slug: String,
}
