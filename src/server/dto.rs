use serde::{Deserialize, Serialize};

use crate::types::{PackageRecord, User, VersionRecord};

/// JSON `metadata` part of a multipart publish request.
#[derive(Debug, Deserialize)]
pub struct PublishMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub name: String,
    pub version: String,
    pub checksum: String,
    pub size: i64,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    #[serde(flatten)]
    pub version: VersionRecord,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct PackageResponse {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    pub versions: Vec<VersionResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PackageResponse {
    pub fn from_record(record: PackageRecord, base_url: &str) -> Self {
        let latest_version = record.latest().map(|v| v.version.clone());
        let name = record.name.clone();
        Self {
            latest_version,
            versions: record
                .versions
                .into_iter()
                .map(|v| {
                    let download_url = download_url(base_url, &name, &v.version);
                    VersionResponse {
                        version: v,
                        download_url,
                    }
                })
                .collect(),
            name: record.name,
            description: record.description,
            authors: record.authors,
            license: record.license,
            repository: record.repository,
            homepage: record.homepage,
            keywords: record.keywords,
            downloads: record.downloads,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[must_use]
pub fn download_url(base_url: &str, name: &str, version: &str) -> String {
    format!("{base_url}/api/v1/packages/{name}/{version}/download")
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPackagesParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OwnersResponse {
    pub owners: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: User,
    /// One-time raw token; only the argon2 hash is stored.
    pub token: String,
}
