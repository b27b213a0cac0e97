mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the metadata database interface.
///
/// `create_or_append_version` must be atomic per package name: two
/// concurrent publishes of the same (name, version) must not both succeed,
/// and concurrent publishes of different versions must not lose an insert.
/// Callers validate package names before reaching the store.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Package operations
    fn get_package(&self, name: &str) -> Result<Option<PackageRecord>>;
    /// All packages, most recently updated first (name as tie-break).
    fn list_packages(&self) -> Result<Vec<PackageRecord>>;
    /// Creates the package from `defaults` if absent, then inserts the
    /// version record. Fails with `Error::VersionExists` if the version
    /// string is already present.
    fn create_or_append_version(
        &self,
        name: &str,
        version: &VersionRecord,
        defaults: &PackageDefaults,
    ) -> Result<()>;
    /// Compensating delete for a reserved slot whose blob write failed.
    /// Drops the package row as well if no versions remain.
    fn remove_version(&self, name: &str, version: &str) -> Result<()>;
    fn set_yanked(&self, name: &str, version: &str, yanked: bool) -> Result<()>;
    fn increment_downloads(&self, name: &str) -> Result<()>;
    fn update_descriptive_fields(&self, name: &str, update: &PackageUpdate) -> Result<()>;

    // Ownership operations
    fn grant_owner(&self, owner_id: &str, package_name: &str) -> Result<()>;
    fn is_owner(&self, owner_id: &str, package_name: &str) -> Result<bool>;
    fn list_owners(&self, package_name: &str) -> Result<Vec<OwnershipRecord>>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_name(&self, name: &str) -> Result<Option<User>>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;
    fn has_super_user_token(&self) -> Result<bool>;

    fn close(&self) -> Result<()>;
}
