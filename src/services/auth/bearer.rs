use axum::http::{HeaderMap, header};

use crate::services::auth::error::AuthorizationError;

const SCHEME: &str = "Bearer";

/// Pull the bearer credential out of the `Authorization` header.
///
/// The header must be exactly `Bearer <token>`: the scheme is matched
/// case-sensitively and anything other than two space-separated parts is
/// rejected. The token is returned as-is.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthorizationError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(AuthorizationError::header_missing)?;

    let value = value.to_str().map_err(|_| {
        AuthorizationError::invalid_header("Authorization header must be visible ASCII.")
    })?;

    let parts: Vec<&str> = value.split(' ').collect();

    if parts[0] != SCHEME {
        return Err(AuthorizationError::invalid_header(
            "Authorization header must start with \"Bearer\".",
        ));
    }

    match parts.as_slice() {
        [_, token] => Ok(*token),
        [_] => Err(AuthorizationError::invalid_header("Token not found.")),
        _ => Err(AuthorizationError::invalid_header(
            "Authorization header must be bearer token.",
        )),
    }
}
