//! Domain models

pub mod asset;
pub mod parent;

pub use asset::{Asset, AssetKind, AssetPatch, AssetResponse, NewAsset};
pub use parent::{ParentKind, ParentRef, ParentSummary};
