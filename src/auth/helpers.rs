use std::sync::Arc;

use chrono::Utc;

use super::{TokenGenerator, parse_token};
use crate::server::AppState;
use crate::types::{Identity, Role, Token};

#[derive(Debug)]
pub enum TokenValidationError {
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    InternalError,
}

pub struct ValidatedToken {
    pub token: Token,
    pub identity: Identity,
}

/// Validates a raw token string against the store and resolves the
/// identity it carries.
///
/// Owner tokens resolve to their bound user id; super-user tokens have no
/// bound user and resolve to the token id.
pub fn validate_token(
    state: &Arc<AppState>,
    raw_token: &str,
) -> Result<ValidatedToken, TokenValidationError> {
    let (lookup, _secret) =
        parse_token(raw_token).map_err(|_| TokenValidationError::InvalidToken)?;

    let token = state
        .store
        .get_token_by_lookup(&lookup)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    let generator = TokenGenerator::new();
    if !generator
        .verify(raw_token, &token.token_hash)
        .map_err(|_| TokenValidationError::InternalError)?
    {
        return Err(TokenValidationError::InvalidToken);
    }

    if let Some(expires_at) = &token.expires_at {
        if expires_at < &Utc::now() {
            return Err(TokenValidationError::TokenExpired);
        }
    }

    let owner_id = match (&token.role, &token.user_id) {
        (Role::Owner, Some(user_id)) => {
            // The bound user must still exist
            state
                .store
                .get_user(user_id)
                .map_err(|_| TokenValidationError::InternalError)?
                .ok_or(TokenValidationError::InvalidToken)?;
            user_id.clone()
        }
        (Role::Owner, None) => return Err(TokenValidationError::InvalidToken),
        (Role::SuperUser, _) => token.id.clone(),
    };

    if let Err(e) = state.store.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }

    let identity = Identity {
        owner_id,
        role: token.role,
    };

    Ok(ValidatedToken { token, identity })
}

/// Extracts token from a Bearer Authorization header.
/// Returns None if no auth header is present.
/// Returns Err if the auth scheme is unsupported.
pub fn extract_token_from_header(
    auth_header: Option<&str>,
) -> Result<Option<String>, TokenValidationError> {
    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            Ok(Some(header.strip_prefix("Bearer ").unwrap().to_string()))
        }
        Some(_) => Err(TokenValidationError::InvalidScheme),
        None => Ok(None),
    }
}
