use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;

use super::Store;
use crate::error::{Error, Result};
use crate::types::*;
use crate::version;

/// In-memory reference store.
///
/// Each package lives behind its own mutex, so mutations serialize per
/// package name while operations on different names proceed independently.
/// Intended for tests and embedding; `SqliteStore` is the persistent
/// implementation.
#[derive(Default)]
pub struct MemoryStore {
    packages: RwLock<HashMap<String, Arc<Mutex<PackageRecord>>>>,
    owners: RwLock<Vec<OwnershipRecord>>,
    users: RwLock<HashMap<String, User>>,
    tokens: RwLock<HashMap<String, Token>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, name: &str) -> Option<Arc<Mutex<PackageRecord>>> {
        self.packages
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl Store for MemoryStore {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    // Package operations

    fn get_package(&self, name: &str) -> Result<Option<PackageRecord>> {
        Ok(self.entry(name).map(|entry| lock(&entry).clone()))
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let entries: Vec<Arc<Mutex<PackageRecord>>> = self
            .packages
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();

        let mut records: Vec<PackageRecord> =
            entries.iter().map(|entry| lock(entry).clone()).collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.name.cmp(&b.name)));
        Ok(records)
    }

    fn create_or_append_version(
        &self,
        name: &str,
        version: &VersionRecord,
        defaults: &PackageDefaults,
    ) -> Result<()> {
        // The package must never be observable with an empty version list,
        // so the creating path inserts record and first version together
        // under the map write lock.
        let entry = {
            let mut map = self.packages.write().unwrap_or_else(|e| e.into_inner());
            match map.get(name) {
                Some(entry) => entry.clone(),
                None => {
                    let now = Utc::now();
                    map.insert(
                        name.to_string(),
                        Arc::new(Mutex::new(PackageRecord {
                            name: name.to_string(),
                            description: defaults.description.clone(),
                            authors: defaults.authors.clone(),
                            license: defaults.license.clone(),
                            repository: defaults.repository.clone(),
                            homepage: defaults.homepage.clone(),
                            keywords: defaults.keywords.clone(),
                            downloads: 0,
                            versions: vec![version.clone()],
                            created_at: now,
                            updated_at: now,
                        })),
                    );
                    return Ok(());
                }
            }
        };

        let mut pkg = lock(&entry);
        if pkg.versions.iter().any(|v| v.version == version.version) {
            return Err(Error::VersionExists);
        }

        pkg.versions.push(version.clone());
        // Stable sort keeps insertion order for equal-precedence versions
        pkg.versions
            .sort_by(|a, b| version::compare_strings(&b.version, &a.version));
        pkg.updated_at = Utc::now();
        drop(pkg);

        // A concurrent remove_version may have dropped the map entry while
        // this append held only the entry lock; restore it.
        self.packages
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(name.to_string())
            .or_insert(entry);
        Ok(())
    }

    fn remove_version(&self, name: &str, version: &str) -> Result<()> {
        // Hold the map write lock across the emptiness check so a
        // concurrent publish cannot slip a version in before the removal.
        let mut map = self.packages.write().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = map.get(name).cloned() else {
            return Ok(());
        };

        let mut pkg = lock(&entry);
        pkg.versions.retain(|v| v.version != version);
        if pkg.versions.is_empty() {
            drop(pkg);
            map.remove(name);
        }
        Ok(())
    }

    fn set_yanked(&self, name: &str, version: &str, yanked: bool) -> Result<()> {
        let entry = self.entry(name).ok_or(Error::PackageNotFound)?;
        let mut pkg = lock(&entry);

        let record = pkg
            .versions
            .iter_mut()
            .find(|v| v.version == version)
            .ok_or(Error::VersionNotFound)?;
        record.yanked = yanked;
        pkg.updated_at = Utc::now();
        Ok(())
    }

    fn increment_downloads(&self, name: &str) -> Result<()> {
        let entry = self.entry(name).ok_or(Error::PackageNotFound)?;
        lock(&entry).downloads += 1;
        Ok(())
    }

    fn update_descriptive_fields(&self, name: &str, update: &PackageUpdate) -> Result<()> {
        let entry = self.entry(name).ok_or(Error::PackageNotFound)?;
        let mut pkg = lock(&entry);

        if let Some(description) = &update.description {
            pkg.description = description.clone();
        }
        if let Some(authors) = &update.authors {
            pkg.authors = authors.clone();
        }
        if let Some(license) = &update.license {
            pkg.license = license.clone();
        }
        if let Some(repository) = &update.repository {
            pkg.repository = Some(repository.clone());
        }
        if let Some(homepage) = &update.homepage {
            pkg.homepage = Some(homepage.clone());
        }
        if let Some(keywords) = &update.keywords {
            pkg.keywords = keywords.clone();
        }
        pkg.updated_at = Utc::now();
        Ok(())
    }

    // Ownership operations

    fn grant_owner(&self, owner_id: &str, package_name: &str) -> Result<()> {
        let mut owners = self.owners.write().unwrap_or_else(|e| e.into_inner());
        let present = owners
            .iter()
            .any(|o| o.owner_id == owner_id && o.package_name == package_name);
        if !present {
            owners.push(OwnershipRecord {
                owner_id: owner_id.to_string(),
                package_name: package_name.to_string(),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    fn is_owner(&self, owner_id: &str, package_name: &str) -> Result<bool> {
        Ok(self
            .owners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|o| o.owner_id == owner_id && o.package_name == package_name))
    }

    fn list_owners(&self, package_name: &str) -> Result<Vec<OwnershipRecord>> {
        Ok(self
            .owners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|o| o.package_name == package_name)
            .cloned()
            .collect())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned())
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .find(|u| u.name == name)
            .cloned())
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        if tokens
            .values()
            .any(|t| t.token_lookup == token.token_lookup)
        {
            return Err(Error::TokenLookupCollision);
        }
        tokens.insert(token.id.clone(), token.clone());
        Ok(())
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        Ok(self
            .tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .find(|t| t.token_lookup == lookup)
            .cloned())
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        if let Some(token) = self
            .tokens
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(id)
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    fn has_super_user_token(&self) -> Result<bool> {
        Ok(self
            .tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .any(|t| t.role == Role::SuperUser))
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_record(version: &str) -> VersionRecord {
        VersionRecord {
            version: version.to_string(),
            checksum: "0".repeat(64),
            size: 17,
            yanked: false,
            signature: None,
            publisher_fingerprint: None,
            published_at: Utc::now(),
        }
    }

    fn defaults() -> PackageDefaults {
        PackageDefaults {
            description: "A test package".to_string(),
            authors: vec!["alice".to_string()],
            license: "MIT".to_string(),
            repository: None,
            homepage: None,
            keywords: vec!["testing".to_string()],
        }
    }

    #[test]
    fn test_create_then_append() {
        let store = MemoryStore::new();

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        store
            .create_or_append_version("json-lib", &version_record("1.1.0"), &defaults())
            .unwrap();

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.versions.len(), 2);
        assert_eq!(pkg.versions[0].version, "1.1.0");
        assert_eq!(pkg.downloads, 0);
    }

    #[test]
    fn test_duplicate_version_rejected() {
        let store = MemoryStore::new();

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        let result =
            store.create_or_append_version("json-lib", &version_record("1.0.0"), &defaults());
        assert!(matches!(result, Err(Error::VersionExists)));
    }

    #[test]
    fn test_concurrent_same_version_single_winner() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.create_or_append_version(
                        "json-lib",
                        &version_record("1.0.0"),
                        &defaults(),
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(Error::VersionExists)))
            .count();

        assert_eq!(ok, 1);
        assert_eq!(conflicts, 7);
        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.versions.len(), 1);
    }

    #[test]
    fn test_concurrent_distinct_versions_no_lost_update() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.create_or_append_version(
                        "json-lib",
                        &version_record(&format!("1.{i}.0")),
                        &defaults(),
                    )
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.versions.len(), 8);
        let sorted: Vec<String> = pkg.versions.iter().map(|v| v.version.clone()).collect();
        let mut expected = sorted.clone();
        expected.sort_by(|a, b| version::compare_strings(b, a));
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_equal_precedence_keeps_insertion_order() {
        let store = MemoryStore::new();

        store
            .create_or_append_version("json-lib", &version_record("1.0.0-beta"), &defaults())
            .unwrap();
        store
            .create_or_append_version("json-lib", &version_record("1.0.0-alpha"), &defaults())
            .unwrap();

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        let order: Vec<&str> = pkg.versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(order, vec!["1.0.0-beta", "1.0.0-alpha"]);
    }

    #[test]
    fn test_yank_and_latest_resolution() {
        let store = MemoryStore::new();

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        store
            .create_or_append_version("json-lib", &version_record("1.1.0"), &defaults())
            .unwrap();

        store.set_yanked("json-lib", "1.1.0", true).unwrap();
        store.set_yanked("json-lib", "1.1.0", true).unwrap();

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.latest().unwrap().version, "1.0.0");
        assert!(pkg.version("1.1.0").unwrap().yanked);

        store.set_yanked("json-lib", "1.1.0", false).unwrap();
        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.latest().unwrap().version, "1.1.0");
    }

    #[test]
    fn test_not_found_errors() {
        let store = MemoryStore::new();

        assert!(matches!(
            store.set_yanked("missing", "1.0.0", true),
            Err(Error::PackageNotFound)
        ));
        assert!(matches!(
            store.increment_downloads("missing"),
            Err(Error::PackageNotFound)
        ));
        assert!(matches!(
            store.update_descriptive_fields("missing", &PackageUpdate::default()),
            Err(Error::PackageNotFound)
        ));
    }

    #[test]
    fn test_remove_version_drops_empty_package() {
        let store = MemoryStore::new();

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        store.remove_version("json-lib", "1.0.0").unwrap();
        assert!(store.get_package("json-lib").unwrap().is_none());
    }
}
