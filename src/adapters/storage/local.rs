use crate::adapters::storage::ObjectStorage;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::PathBuf;
use uuid::Uuid;

/// Uploads kept on the local filesystem under a single root directory.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Writes and removes a marker file under the root.
    async fn write_marker(&self) -> std::io::Result<()> {
        let marker = self.root.join(format!(".healthcheck-{}", Uuid::now_v7()));
        tokio::fs::write(&marker, b"ok").await?;
        if let Err(e) = tokio::fs::remove_file(&marker).await {
            tracing::warn!(marker = %marker.display(), error = %e, "Failed to remove storage healthcheck marker");
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn healthcheck(&self) -> Result<Value> {
        let path = self.root.display().to_string();
        let problem = match tokio::fs::metadata(&self.root).await {
            Ok(meta) if !meta.is_dir() => Some(format!("Storage path {path} is not a directory")),
            Ok(_) => self.write_marker().await.err().map(|e| format!("Storage path {path} is not writable: {e}")),
            Err(e) => Some(format!("Storage path {path} is unavailable: {e}")),
        };

        Ok(match problem {
            None => json!({ "status": "healthy", "type": "local", "path": path }),
            Some(error) => json!({ "status": "unhealthy", "type": "local", "path": path, "error": error }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_directory_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let report = LocalStorage::new(dir.path().to_path_buf()).healthcheck().await.unwrap();

        assert_eq!(report["status"], "healthy");
        assert_eq!(report["type"], "local");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0, "marker file left behind");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_only_directory_is_unhealthy() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users write through mode bits, so there is nothing to observe.
        if std::fs::write(dir.path().join("privileged"), b"").is_ok() {
            std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = LocalStorage::new(dir.path().to_path_buf()).healthcheck().await.unwrap();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report["status"], "unhealthy");
        assert!(report["error"].as_str().unwrap().contains("is not writable"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let report = LocalStorage::new(missing).healthcheck().await.unwrap();

        assert_eq!(report["status"], "unhealthy");
        assert!(report["error"].as_str().unwrap().contains("is unavailable"));
    }

    #[tokio::test]
    async fn test_file_is_not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let report = LocalStorage::new(file.path().to_path_buf()).healthcheck().await.unwrap();

        assert_eq!(report["status"], "unhealthy");
        assert!(report["error"].as_str().unwrap().contains("not a directory"));
    }
}
