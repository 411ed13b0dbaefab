//! Folio API Library
//!
//! HTTP surface for the media asset subsystem: upload orchestration for
//! project and blog post images, metadata updates, primary-flag promotion,
//! and deletion with best-effort remote cleanup.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;
