use super::ObjectStorage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone)]
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    base_url: String,
    upload_count: Arc<Mutex<usize>>,
    fail_paths_containing: Arc<Mutex<Vec<String>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            base_url: "https://mock-storage.example.com".to_string(),
            upload_count: Arc::new(Mutex::new(0)),
            fail_paths_containing: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Reject writes whose path contains `fragment`.
    pub fn with_failure_for(self, fragment: &str) -> Self {
        self.fail_paths_containing
            .lock()
            .unwrap()
            .push(fragment.to_string());
        self
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_objects(&self) -> HashMap<String, StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn put(&self, path: &str, data: &[u8], content_type: &str) -> Result<()> {
        let mut count = self.upload_count.lock().unwrap();
        *count += 1;

        let rejected = self
            .fail_paths_containing
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| path.contains(fragment.as_str()));
        if rejected {
            return Err(Error::Upload(format!("Mock write rejected: {}", path)));
        }

        self.objects.lock().unwrap().insert(
            path.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn public_url(&self, path: &str) -> Result<String> {
        if !self.objects.lock().unwrap().contains_key(path) {
            return Err(Error::Upload(format!("Object not found: {}", path)));
        }
        Ok(format!("{}/{}", self.base_url, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_storage_put_and_url() {
        let storage = MockStorage::new();

        storage
            .put("watches/a.png", b"png bytes", "image/png")
            .await
            .unwrap();
        let url = storage.public_url("watches/a.png").await.unwrap();

        assert_eq!(url, "https://mock-storage.example.com/watches/a.png");
        assert_eq!(storage.get_upload_count(), 1);
        assert_eq!(
            storage.get_objects()["watches/a.png"],
            StoredObject {
                data: b"png bytes".to_vec(),
                content_type: "image/png".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_mock_storage_custom_base_url() {
        let storage = MockStorage::new().with_base_url("https://cdn.test".to_string());

        storage.put("x.jpg", b"data", "image/jpeg").await.unwrap();
        assert_eq!(
            storage.public_url("x.jpg").await.unwrap(),
            "https://cdn.test/x.jpg"
        );
    }

    #[tokio::test]
    async fn test_mock_storage_rejected_write() {
        let storage = MockStorage::new().with_failure_for("resized_");

        let err = storage
            .put("watches/resized_500x500_1.jpg", b"data", "image/jpeg")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Upload(_)));
        assert!(storage.get_objects().is_empty());
        assert!(storage
            .public_url("watches/resized_500x500_1.jpg")
            .await
            .is_err());
    }
}
