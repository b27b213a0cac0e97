use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;

use crate::blob::BlobStore;
use crate::checksum;
use crate::error::{Error, Result};
use crate::ownership::OwnershipRegistry;
use crate::store::Store;
use crate::types::{Identity, PackageDefaults, VersionRecord};
use crate::version::Version;

pub const MAX_PACKAGE_NAME_LEN: usize = 64;

/// Validates a package name: lowercase, starts with a letter, then
/// letters, digits, hyphens, and underscores.
pub fn validate_package_name(name: &str) -> Result<()> {
    let invalid = || Error::InvalidName(name.to_string());

    if name.is_empty() || name.len() > MAX_PACKAGE_NAME_LEN {
        return Err(invalid());
    }
    let mut chars = name.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Err(invalid());
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_') {
        return Err(invalid());
    }
    Ok(())
}

/// Input to a publish: side-channel metadata plus the artifact body.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub authors: Vec<String>,
    pub license: String,
    pub repository: Option<String>,
    pub homepage: Option<String>,
    pub keywords: Vec<String>,
    pub signature: Option<String>,
    pub publisher_fingerprint: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub name: String,
    pub version: String,
    pub checksum: String,
    pub size: i64,
}

/// Orchestrates a publish: validate, authorize, checksum, reserve the
/// version slot, write the blob, grant ownership.
///
/// The slot is reserved in the metadata store before the blob write, so a
/// lost metadata race never leaves an orphaned blob. The reverse window
/// (slot reserved, blob write fails) is closed by a compensating
/// `remove_version`.
#[derive(Clone)]
pub struct PublishPipeline {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    ownership: OwnershipRegistry,
}

impl PublishPipeline {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        let ownership = OwnershipRegistry::new(store.clone());
        Self {
            store,
            blobs,
            ownership,
        }
    }

    #[must_use]
    pub fn ownership(&self) -> &OwnershipRegistry {
        &self.ownership
    }

    pub fn publish(&self, identity: &Identity, req: PublishRequest) -> Result<PublishReceipt> {
        validate_package_name(&req.name)?;
        Version::parse(&req.version)?;
        if req.body.is_empty() {
            return Err(Error::EmptyArtifact);
        }

        // Existing packages may only be mutated by an owner or super-user;
        // checked before the reservation so a forbidden publish writes
        // nothing.
        let existed = self.store.get_package(&req.name)?.is_some();
        if existed && !self.ownership.may_mutate(identity, &req.name)? {
            return Err(Error::Forbidden);
        }

        let checksum = checksum::digest(&req.body);
        let size = req.body.len() as i64;

        let record = VersionRecord {
            version: req.version.clone(),
            checksum: checksum.clone(),
            size,
            yanked: false,
            signature: req.signature.clone(),
            publisher_fingerprint: req.publisher_fingerprint.clone(),
            published_at: Utc::now(),
        };
        let defaults = PackageDefaults {
            description: req.description.clone(),
            authors: req.authors.clone(),
            license: req.license.clone(),
            repository: req.repository.clone(),
            homepage: req.homepage.clone(),
            keywords: req.keywords.clone(),
        };

        self.store
            .create_or_append_version(&req.name, &record, &defaults)?;

        if let Err(e) = self.blobs.put(&req.name, &req.version, &req.body) {
            if let Err(rollback) = self.store.remove_version(&req.name, &req.version) {
                tracing::error!(
                    "failed to roll back version reservation for {}@{}: {rollback}",
                    req.name,
                    req.version
                );
            }
            return Err(e);
        }

        if !existed {
            self.ownership.grant(&identity.owner_id, &req.name)?;
        }

        Ok(PublishReceipt {
            name: req.name,
            version: req.version,
            checksum,
            size,
        })
    }
}
