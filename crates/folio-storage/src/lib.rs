//! Folio Storage Library
//!
//! Remote media store abstraction and implementations. The `MediaStore`
//! trait is the subsystem's only view of the external blob store; the repo
//! ships an HTTP-backed client and an in-memory mock for tests.

pub mod http;
pub mod mock;
pub mod traits;

// Re-export commonly used types
pub use http::HttpMediaStore;
pub use mock::MockMediaStore;
pub use traits::{DeleteOutcome, MediaStore, RemoteObject, StoreError, StoreResult};
