use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::admin::admin_router;
use super::registry::registry_router;
use crate::blob::BlobStore;
use crate::publish::PublishPipeline;
use crate::search::SearchIndex;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub blobs: Arc<dyn BlobStore>,
    pub pipeline: PublishPipeline,
    pub search: SearchIndex,
    /// Public base URL for external access. Used for download locators;
    /// when unset, locators are emitted relative to the serve address.
    pub public_base_url: Option<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        blobs: Arc<dyn BlobStore>,
        public_base_url: Option<String>,
    ) -> Self {
        let pipeline = PublishPipeline::new(store.clone(), blobs.clone());
        let search = SearchIndex::new(store.clone());
        Self {
            store,
            blobs,
            pipeline,
            search,
            public_base_url,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.public_base_url.as_deref().unwrap_or("")
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/admin", admin_router())
        .nest("/api/v1", registry_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
