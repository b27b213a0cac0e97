mod admin;
pub mod dto;
mod registry;
pub mod response;
mod router;
pub mod validation;

pub use admin::admin_router;
pub use registry::registry_router;
pub use router::{AppState, create_router};
