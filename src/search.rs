use std::sync::Arc;

use crate::error::Result;
use crate::store::Store;
use crate::types::PackageRecord;

/// Substring search over the package catalog.
///
/// No separate index structure: queries read the store's listing and
/// filter, keeping the listing's most-recently-updated order.
#[derive(Clone)]
pub struct SearchIndex {
    store: Arc<dyn Store>,
}

impl SearchIndex {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Case-insensitive substring match against name, description, or any
    /// keyword. An empty query matches every record.
    pub fn search(&self, query: &str) -> Result<Vec<PackageRecord>> {
        let needle = query.to_lowercase();
        Ok(self
            .store
            .list_packages()?
            .into_iter()
            .filter(|pkg| matches(pkg, &needle))
            .collect())
    }
}

fn matches(pkg: &PackageRecord, needle: &str) -> bool {
    pkg.name.to_lowercase().contains(needle)
        || pkg.description.to_lowercase().contains(needle)
        || pkg
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(needle))
}
