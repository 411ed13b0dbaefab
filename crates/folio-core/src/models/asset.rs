use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::parent::{ParentKind, ParentRef};

/// Maximum length for alt text.
pub const MAX_ALT_TEXT_LENGTH: u64 = 255;
/// Maximum length for captions.
pub const MAX_CAPTION_LENGTH: u64 = 1000;

/// Closed set of asset type tags. Which tags are valid depends on the
/// parent kind; see [`AssetKind::allowed_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "asset_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Screenshot,
    Diagram,
    Banner,
    Gallery,
    Inline,
    Thumbnail,
    Featured,
}

impl AssetKind {
    /// Whether this tag belongs to the closed set for the given parent kind.
    pub fn allowed_for(&self, parent: ParentKind) -> bool {
        use AssetKind::*;
        match parent {
            ParentKind::Project => {
                matches!(self, Screenshot | Diagram | Banner | Gallery | Thumbnail)
            }
            ParentKind::BlogPost => {
                matches!(self, Inline | Banner | Featured | Thumbnail | Gallery)
            }
        }
    }

    /// Kind assigned when the uploader does not specify one.
    pub fn default_for(parent: ParentKind) -> Self {
        match parent {
            ParentKind::Project => AssetKind::Gallery,
            ParentKind::BlogPost => AssetKind::Inline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Screenshot => "screenshot",
            AssetKind::Diagram => "diagram",
            AssetKind::Banner => "banner",
            AssetKind::Gallery => "gallery",
            AssetKind::Inline => "inline",
            AssetKind::Thumbnail => "thumbnail",
            AssetKind::Featured => "featured",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "screenshot" => Some(AssetKind::Screenshot),
            "diagram" => Some(AssetKind::Diagram),
            "banner" => Some(AssetKind::Banner),
            "gallery" => Some(AssetKind::Gallery),
            "inline" => Some(AssetKind::Inline),
            "thumbnail" => Some(AssetKind::Thumbnail),
            "featured" => Some(AssetKind::Featured),
            _ => None,
        }
    }
}

/// A stored image: metadata row referencing a binary in the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub parent_kind: ParentKind,
    pub parent_id: Uuid,
    pub url: String,
    pub secure_url: String,
    /// The remote store's identifier for the binary; used for deletion.
    pub external_id: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub kind: AssetKind,
    pub display_order: i32,
    pub is_primary: bool,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn parent(&self) -> ParentRef {
        ParentRef::new(self.parent_kind, self.parent_id)
    }
}

/// Fields for a not-yet-persisted asset. The repository assigns `id`,
/// `created_at`, and `updated_at` on insert.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub parent: ParentRef,
    pub url: String,
    pub secure_url: String,
    pub external_id: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub kind: AssetKind,
    pub display_order: i32,
    pub is_primary: bool,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
    pub file_size: i64,
}

/// Metadata patch for an existing asset. `None` fields are left unchanged.
/// Does not touch the remote binary.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AssetPatch {
    #[validate(length(max = 255))]
    pub alt_text: Option<String>,
    #[validate(length(max = 1000))]
    pub caption: Option<String>,
    pub kind: Option<AssetKind>,
    #[validate(range(min = 0))]
    pub display_order: Option<i32>,
    pub is_primary: Option<bool>,
}

impl AssetPatch {
    pub fn is_empty(&self) -> bool {
        self.alt_text.is_none()
            && self.caption.is_none()
            && self.kind.is_none()
            && self.display_order.is_none()
            && self.is_primary.is_none()
    }
}

/// API representation of an asset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssetResponse {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub url: String,
    pub secure_url: String,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub kind: AssetKind,
    pub display_order: i32,
    pub is_primary: bool,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id,
            parent_id: asset.parent_id,
            url: asset.url,
            secure_url: asset.secure_url,
            alt_text: asset.alt_text,
            caption: asset.caption,
            kind: asset.kind,
            display_order: asset.display_order,
            is_primary: asset.is_primary,
            width: asset.width,
            height: asset.height,
            format: asset.format,
            file_size: asset.file_size,
            created_at: asset.created_at,
        }
    }
}
