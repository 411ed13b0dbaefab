//! Mock MediaStore implementation for testing
//!
//! Stores binaries in memory, records every delete call, and can be switched
//! into failure modes to exercise partial-failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::traits::{DeleteOutcome, MediaStore, RemoteObject, StoreError, StoreResult};

/// Mock media store implementation that keeps objects in memory.
#[derive(Default)]
pub struct MockMediaStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    delete_calls: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    counter: AtomicU64,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail with a store error.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent delete fail with a store error.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// External ids passed to `delete` so far, in call order.
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    /// Whether an object with this external id is currently stored.
    pub fn has_object(&self, external_id: &str) -> bool {
        self.objects.lock().unwrap().contains_key(external_id)
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> StoreResult<RemoteObject> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StoreError::UploadFailed("mock upload failure".to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let external_id = format!("{}/img-{}", folder, n);
        let byte_size = data.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert(external_id.clone(), data);

        Ok(RemoteObject {
            url: format!("http://media.test/{}", external_id),
            secure_url: format!("https://media.test/{}", external_id),
            external_id,
            format: content_type.rsplit('/').next().map(|s| s.to_string()),
            byte_size,
            width: Some(1280),
            height: Some(720),
        })
    }

    async fn delete(&self, external_id: &str) -> StoreResult<DeleteOutcome> {
        if external_id.is_empty() {
            return Ok(DeleteOutcome::Skipped);
        }

        self.delete_calls
            .lock()
            .unwrap()
            .push(external_id.to_string());

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::DeleteFailed("mock delete failure".to_string()));
        }

        match self.objects.lock().unwrap().remove(external_id) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_delete() {
        let store = MockMediaStore::new();
        let obj = store
            .upload(vec![1, 2, 3], "image/png", "portfolio/projects/demo")
            .await
            .unwrap();
        assert!(store.has_object(&obj.external_id));
        assert_eq!(obj.byte_size, 3);
        assert_eq!(obj.format.as_deref(), Some("png"));

        let outcome = store.delete(&obj.external_id).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(!store.has_object(&obj.external_id));
        assert_eq!(store.delete_calls(), vec![obj.external_id]);
    }

    #[tokio::test]
    async fn test_delete_empty_id_is_noop() {
        let store = MockMediaStore::new();
        assert_eq!(store.delete("").await.unwrap(), DeleteOutcome::Skipped);
        assert!(store.delete_calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_not_found() {
        let store = MockMediaStore::new();
        assert_eq!(
            store.delete("nope").await.unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_forced_failures() {
        let store = MockMediaStore::new();
        store.fail_uploads(true);
        assert!(store
            .upload(vec![1], "image/png", "folder")
            .await
            .is_err());

        store.fail_uploads(false);
        let obj = store.upload(vec![1], "image/png", "folder").await.unwrap();

        store.fail_deletes(true);
        assert!(store.delete(&obj.external_id).await.is_err());
        // The failed call is still recorded.
        assert_eq!(store.delete_calls().len(), 1);
        // And the object survives.
        assert!(store.has_object(&obj.external_id));
    }
}
