use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use bytes::Bytes;

use crate::auth::RequireIdentity;
use crate::publish::PublishRequest;
use crate::server::AppState;
use crate::server::dto::{
    ListPackagesParams, MutationResponse, OwnersResponse, PackageResponse, PublishMetadata,
    PublishResponse, download_url,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::validate_package_name_param;
use crate::types::{Identity, PackageRecord, PackageUpdate};

pub fn registry_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/packages", post(publish_package).get(list_packages))
        .route(
            "/packages/{name}",
            get(get_package).patch(update_package),
        )
        .route("/packages/{name}/owners", get(list_package_owners))
        .route(
            "/packages/{name}/{version}/download",
            get(download_version),
        )
        .route("/packages/{name}/{version}/yank", put(yank_version))
        .route("/packages/{name}/{version}/unyank", put(unyank_version))
}

async fn read_publish_parts(
    multipart: &mut Multipart,
) -> Result<(PublishMetadata, Bytes), ApiError> {
    let mut metadata: Option<PublishMetadata> = None;
    let mut body: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Malformed multipart body"))?
    {
        let field_name = field.name().map(ToString::to_string);
        match field_name.as_deref() {
            Some("metadata") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Malformed metadata field"))?;
                metadata = Some(
                    serde_json::from_slice(&bytes)
                        .map_err(|e| ApiError::bad_request(format!("Invalid metadata: {e}")))?,
                );
            }
            Some("tarball") => {
                body = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::bad_request("Malformed tarball field"))?,
                );
            }
            _ => {}
        }
    }

    let metadata = metadata.ok_or_else(|| ApiError::bad_request("Missing metadata field"))?;
    let body = body.ok_or_else(|| ApiError::bad_request("Missing tarball field"))?;
    Ok((metadata, body))
}

pub async fn publish_package(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (metadata, body) = read_publish_parts(&mut multipart).await?;

    let request = PublishRequest {
        name: metadata.name,
        version: metadata.version,
        description: metadata.description,
        authors: metadata.authors,
        license: metadata.license,
        repository: metadata.repository,
        homepage: metadata.homepage,
        keywords: metadata.keywords,
        signature: metadata.signature,
        publisher_fingerprint: metadata.fingerprint,
        body,
    };

    let receipt = state.pipeline.publish(&identity, request)?;

    let response = PublishResponse {
        download_url: download_url(state.base_url(), &receipt.name, &receipt.version),
        name: receipt.name,
        version: receipt.version,
        checksum: receipt.checksum,
        size: receipt.size,
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn list_packages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPackagesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let records = match params.q.as_deref() {
        Some(query) => state
            .search
            .search(query)
            .api_err("Failed to search packages")?,
        None => state
            .store
            .list_packages()
            .api_err("Failed to list packages")?,
    };

    let responses: Vec<PackageResponse> = records
        .into_iter()
        .map(|r| PackageResponse::from_record(r, state.base_url()))
        .collect();

    Ok(Json(ApiResponse::success(responses)))
}

pub async fn get_package(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .get_package(&name)
        .api_err("Failed to get package")?
        .or_not_found("Package not found")?;

    Ok(Json(ApiResponse::success(PackageResponse::from_record(
        record,
        state.base_url(),
    ))))
}

pub async fn update_package(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(update): Json<PackageUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    validate_package_name_param(&name)?;
    let _ = load_and_authorize(&state, &identity, &name)?;

    state.store.update_descriptive_fields(&name, &update)?;

    let record = state
        .store
        .get_package(&name)
        .api_err("Failed to get package")?
        .or_not_found("Package not found")?;
    Ok(Json(ApiResponse::success(PackageResponse::from_record(
        record,
        state.base_url(),
    ))))
}

pub async fn list_package_owners(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .get_package(&name)
        .api_err("Failed to get package")?
        .or_not_found("Package not found")?;

    let owners = state
        .pipeline
        .ownership()
        .list_owners(&name)
        .api_err("Failed to list owners")?
        .into_iter()
        .map(|o| o.owner_id)
        .collect();

    Ok(Json(ApiResponse::success(OwnersResponse { owners })))
}

pub async fn download_version(
    State(state): State<Arc<AppState>>,
    Path((name, version)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .get_package(&name)
        .api_err("Failed to get package")?
        .or_not_found("Package not found")?;

    let version_record = record.version(&version).or_not_found("Version not found")?;
    if version_record.yanked {
        return Err(crate::error::Error::VersionYanked.into());
    }
    let checksum = version_record.checksum.clone();

    let data = state.blobs.get(&name, &version)?;

    // The response must not wait on the counter write; a failed increment
    // is retried once and logged, never silently dropped.
    let store = state.store.clone();
    tokio::spawn(async move {
        if let Err(e) = store.increment_downloads(&name) {
            tracing::warn!("download counter update failed for {name}: {e}, retrying");
            if let Err(e) = store.increment_downloads(&name) {
                tracing::warn!("download counter retry failed for {name}: {e}");
            }
        }
    });

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "application/octet-stream".parse().unwrap(),
    );
    if let Ok(value) = checksum.parse() {
        headers.insert("X-Checksum", value);
    }

    Ok((headers, data))
}

fn load_and_authorize(
    state: &Arc<AppState>,
    identity: &Identity,
    name: &str,
) -> Result<PackageRecord, ApiError> {
    let record = state
        .store
        .get_package(name)
        .api_err("Failed to get package")?
        .or_not_found("Package not found")?;

    let allowed = state
        .pipeline
        .ownership()
        .may_mutate(identity, name)
        .api_err("Failed to check ownership")?;
    if !allowed {
        return Err(ApiError::forbidden("Not an owner of this package"));
    }

    Ok(record)
}

async fn set_yanked(
    state: Arc<AppState>,
    identity: Identity,
    name: String,
    version: String,
    yanked: bool,
) -> Result<impl IntoResponse, ApiError> {
    let _ = load_and_authorize(&state, &identity, &name)?;
    state.store.set_yanked(&name, &version, yanked)?;
    Ok(Json(ApiResponse::success(MutationResponse { ok: true })))
}

pub async fn yank_version(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path((name, version)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    set_yanked(state, identity, name, version, true).await
}

pub async fn unyank_version(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path((name, version)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    set_yanked(state, identity, name, version, false).await
}
