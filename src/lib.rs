//! # Depot
//!
//! A lightweight, self-hostable package registry: publish, search,
//! download, yank. Usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! depot = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::Path;
//! use depot::blob::FsBlobStore;
//! use depot::server::{AppState, create_router};
//! use depot::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new(Path::new("./data/depot.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     Arc::new(FsBlobStore::new(Path::new("./data"))),
//!     None,
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the server binary. Disable with `default-features = false`.

pub mod auth;
pub mod blob;
pub mod checksum;
pub mod config;
pub mod error;
pub mod ownership;
pub mod publish;
pub mod search;
pub mod server;
pub mod store;
pub mod types;
pub mod version;
