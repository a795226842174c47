//! Matrix document pass-through

use serde_json::Value;
use std::io;
use tokio::fs;

use super::ContentStore;
use crate::error::{ContentError, Result};

impl ContentStore {
    /// Read the matrix file and return it as parsed JSON, unmodified
    pub async fn read_matrix(&self) -> Result<Value> {
        let data = match fs::read(&self.matrix_file).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ContentError::NotFound("Matrix file not found".to_string()));
            }
            Err(e) => {
                return Err(ContentError::Server(format!(
                    "Failed to read matrix file: {e}"
                )));
            }
        };

        serde_json::from_slice(&data)
            .map_err(|e| ContentError::Server(format!("Failed to parse matrix file: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with_matrix(content: Option<&str>) -> (tempfile::TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        let matrix = dir.path().join("matrix_template.json");
        if let Some(text) = content {
            std::fs::write(&matrix, text).unwrap();
        }
        let store = ContentStore::new(dir.path(), matrix);
        (dir, store)
    }

    #[tokio::test]
    async fn test_read_matrix() {
        let (_dir, store) = store_with_matrix(Some(r#"{"a": 1}"#));
        assert_eq!(store.read_matrix().await.unwrap(), json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_read_matrix_nested_passthrough() {
        let (_dir, store) =
            store_with_matrix(Some(r#"{"rows": [{"lens": "x", "score": 0.5}], "meta": null}"#));
        assert_eq!(
            store.read_matrix().await.unwrap(),
            json!({"rows": [{"lens": "x", "score": 0.5}], "meta": null})
        );
    }

    #[tokio::test]
    async fn test_missing_matrix() {
        let (_dir, store) = store_with_matrix(None);
        let err = store.read_matrix().await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(_)));
        assert_eq!(err.to_string(), "Matrix file not found");
    }

    #[tokio::test]
    async fn test_invalid_matrix() {
        let (_dir, store) = store_with_matrix(Some("{not json"));
        let err = store.read_matrix().await.unwrap_err();
        assert!(matches!(err, ContentError::Server(_)));
    }

    #[tokio::test]
    async fn test_matrix_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::new(dir.path(), dir.path());
        let err = store.read_matrix().await.unwrap_err();
        assert!(matches!(err, ContentError::Server(_)));
    }
}
