//! Folio DB Library
//!
//! Asset metadata persistence and parent resolution. The repository is the
//! single arbitration point for the per-parent invariants (primary
//! uniqueness, count bound): every check-then-write sequence runs under a
//! per-parent advisory lock in the Postgres implementation, or under one
//! mutex in the in-memory implementation.

pub mod assets;
pub mod memory;
pub mod parents;

// Re-export commonly used types
pub use assets::{AssetRepository, PgAssetRepository};
pub use memory::{MemoryAssetRepository, MemoryParentSource};
pub use parents::{ParentSource, PgParentSource};
