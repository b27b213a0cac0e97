use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireSuperUser, TokenGenerator};
use crate::server::AppState;
use crate::server::dto::{CreateUserRequest, CreateUserResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::validate_user_name;
use crate::types::{Role, Token, User};

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new().route("/users", post(create_user))
}

/// Registers an identity and issues its first token. The returned user id
/// is the owner id recorded against packages it publishes.
pub async fn create_user(
    _admin: RequireSuperUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_user_name(&req.name)?;

    let existing = state
        .store
        .get_user_by_name(&req.name)
        .api_err("Failed to check existing user")?;
    if existing.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        created_at: now,
        updated_at: now,
    };
    state
        .store
        .create_user(&user)
        .api_err("Failed to create user")?;

    let generator = TokenGenerator::new();
    let (raw_token, lookup, hash) = generator
        .generate()
        .map_err(|_| ApiError::internal("Failed to generate token"))?;

    let token = Token {
        id: Uuid::new_v4().to_string(),
        token_hash: hash,
        token_lookup: lookup,
        role: Role::Owner,
        user_id: Some(user.id.clone()),
        created_at: now,
        expires_at: None,
        last_used_at: None,
    };
    state
        .store
        .create_token(&token)
        .api_err("Failed to create token")?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CreateUserResponse {
            user,
            token: raw_token,
        })),
    ))
}
