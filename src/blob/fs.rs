use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::BlobStore;
use crate::error::{Error, Result};

/// Filesystem blob store rooted at `{data_dir}/blobs`.
///
/// Writes go to a temp file first and are renamed into place after fsync,
/// so a crashed write never leaves a partial artifact at the final key.
pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("blobs"),
        }
    }

    fn blob_path(&self, name: &str, version: &str) -> PathBuf {
        self.base_path.join(name).join(version)
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path.join("tmp").join(Uuid::new_v4().to_string())
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, name: &str, version: &str, data: &[u8]) -> Result<()> {
        let final_path = self.blob_path(name, version);
        if final_path.exists() {
            return Err(Error::Storage(format!(
                "blob already exists for {name}@{version}"
            )));
        }

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut temp_file = File::create(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&temp_path, &final_path)?;

        Ok(())
    }

    fn get(&self, name: &str, version: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(name, version);
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::Storage(format!(
                "blob missing for {name}@{version}"
            ))),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn exists(&self, name: &str, version: &str) -> Result<bool> {
        Ok(self.blob_path(name, version).exists())
    }

    fn delete(&self, name: &str, version: &str) -> Result<bool> {
        match fs::remove_file(self.blob_path(name, version)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FsBlobStore::new(temp_dir.path());

        let data = b"artifact bytes".to_vec();
        storage.put("json-lib", "1.0.0", &data).unwrap();

        assert!(storage.exists("json-lib", "1.0.0").unwrap());
        assert_eq!(storage.get("json-lib", "1.0.0").unwrap(), data);
    }

    #[test]
    fn test_overwrite_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FsBlobStore::new(temp_dir.path());

        storage.put("json-lib", "1.0.0", b"first").unwrap();
        let result = storage.put("json-lib", "1.0.0", b"second");
        assert!(matches!(result, Err(Error::Storage(_))));

        // The original bytes are untouched
        assert_eq!(storage.get("json-lib", "1.0.0").unwrap(), b"first");
    }

    #[test]
    fn test_missing_blob_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FsBlobStore::new(temp_dir.path());

        assert!(!storage.exists("json-lib", "1.0.0").unwrap());
        assert!(matches!(
            storage.get("json-lib", "1.0.0"),
            Err(Error::Storage(_))
        ));
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FsBlobStore::new(temp_dir.path());

        storage.put("json-lib", "1.0.0", b"bytes").unwrap();
        assert!(storage.delete("json-lib", "1.0.0").unwrap());
        assert!(!storage.exists("json-lib", "1.0.0").unwrap());
        assert!(!storage.delete("json-lib", "1.0.0").unwrap());
    }
}
