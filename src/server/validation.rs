use crate::publish::validate_package_name;
use crate::server::response::ApiError;

const MAX_USER_NAME_LEN: usize = 64;

pub fn validate_package_name_param(name: &str) -> Result<(), ApiError> {
    validate_package_name(name)
        .map_err(|_| ApiError::bad_request("Package name must match ^[a-z][a-z0-9_-]*$"))
}

pub fn validate_user_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::bad_request("User name cannot be empty"));
    }
    if name.len() > MAX_USER_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "User name cannot exceed {MAX_USER_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::bad_request(
            "User name can only contain alphanumeric characters, hyphens, and underscores",
        ));
    }
    Ok(())
}
