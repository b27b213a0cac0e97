use std::sync::Arc;

use crate::error::Result;
use crate::store::Store;
use crate::types::{Identity, OwnershipRecord};

/// Tracks which identities may mutate which package names.
///
/// The first successful publish of a new package grants ownership to the
/// publisher; there is no multi-owner grant flow.
#[derive(Clone)]
pub struct OwnershipRegistry {
    store: Arc<dyn Store>,
}

impl OwnershipRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn grant(&self, owner_id: &str, package_name: &str) -> Result<()> {
        self.store.grant_owner(owner_id, package_name)
    }

    pub fn owns_any(&self, owner_id: &str, package_name: &str) -> Result<bool> {
        self.store.is_owner(owner_id, package_name)
    }

    pub fn list_owners(&self, package_name: &str) -> Result<Vec<OwnershipRecord>> {
        self.store.list_owners(package_name)
    }

    /// A super-user may mutate any package; everyone else must own it.
    pub fn may_mutate(&self, identity: &Identity, package_name: &str) -> Result<bool> {
        if identity.is_super_user() {
            return Ok(true);
        }
        self.owns_any(&identity.owner_id, package_name)
    }
}
