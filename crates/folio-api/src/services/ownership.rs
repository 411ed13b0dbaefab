//! Ownership guard
//!
//! Every per-asset operation addressed as `(parent, asset_id)` must fail if
//! the asset actually belongs to a different parent, before any state is
//! touched. The failure is distinct from `NotFound`: the asset exists, the
//! path is wrong.

use folio_core::models::{Asset, ParentRef};
use folio_core::AppError;

/// Verify an asset belongs to the parent named in the request path.
pub fn verify_ownership(asset: &Asset, expected: ParentRef) -> Result<(), AppError> {
    if asset.parent() != expected {
        return Err(AppError::OwnershipMismatch {
            asset_id: asset.id,
            expected_parent: expected.id,
        });
    }
    Ok(())
}
