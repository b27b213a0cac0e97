mod fs;

pub use fs::FsBlobStore;

use crate::error::Result;

/// BlobStore defines the artifact byte storage interface.
///
/// Keys are `(name, version)` pairs and content is immutable once written.
/// The publish pipeline reserves the version slot in the metadata store
/// before calling `put`, so a key is written at most once.
pub trait BlobStore: Send + Sync {
    fn put(&self, name: &str, version: &str, data: &[u8]) -> Result<()>;
    /// Fails with `Error::Storage` when the blob is missing, so a version
    /// the metadata store knows about but whose bytes are gone surfaces as
    /// a storage failure rather than a not-found.
    fn get(&self, name: &str, version: &str) -> Result<Vec<u8>>;
    fn exists(&self, name: &str, version: &str) -> Result<bool>;
    fn delete(&self, name: &str, version: &str) -> Result<bool>;
}
