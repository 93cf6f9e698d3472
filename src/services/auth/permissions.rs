use crate::services::auth::claims::Claims;
use crate::services::auth::error::AuthorizationError;

/// Gate on a single required permission.
///
/// - no `permissions` claim at all => 400 `invalid_claims`
/// - claim present, permission not in it (including an empty list) => 403 `unauthorized`
pub fn check_permission(required: &str, claims: &Claims) -> Result<(), AuthorizationError> {
    if claims.permissions.is_none() {
        return Err(AuthorizationError::permissions_missing());
    }

    if !claims.has_permission(required) {
        return Err(AuthorizationError::unauthorized());
    }

    Ok(())
}
