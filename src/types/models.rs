use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// One record per unique package name.
///
/// `versions` is kept sorted descending by version precedence and is never
/// empty once the package exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub description: String,
    pub authors: Vec<String>,
    pub license: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub keywords: Vec<String>,
    pub downloads: i64,
    pub versions: Vec<VersionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PackageRecord {
    /// Newest version that has not been yanked, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&VersionRecord> {
        self.versions.iter().find(|v| !v.yanked)
    }

    #[must_use]
    pub fn version(&self, version: &str) -> Option<&VersionRecord> {
        self.versions.iter().find(|v| v.version == version)
    }
}

/// One record per (package, version) pair; immutable except for `yanked`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    pub checksum: String,
    pub size: i64,
    pub yanked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_fingerprint: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Descriptive fields applied when a publish creates a new package.
#[derive(Debug, Clone, Default)]
pub struct PackageDefaults {
    pub description: String,
    pub authors: Vec<String>,
    pub license: String,
    pub repository: Option<String>,
    pub homepage: Option<String>,
    pub keywords: Vec<String>,
}

/// Partial update of descriptive fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

/// A registered identity; `id` is the owner id the core trusts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub role: Role,
    /// Required for owner tokens, absent for super-user tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Relation marking an identity as an owner of a package name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub owner_id: String,
    pub package_name: String,
    pub created_at: DateTime<Utc>,
}
