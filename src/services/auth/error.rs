//! Failure taxonomy of the authorization core.
//!
//! Every rejection carries the HTTP status it maps to, a short code that is
//! surfaced to the client, and a description that only goes to the logs.
use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

use crate::services::auth::jwks::KeySetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    AuthorizationHeaderMissing,
    InvalidHeader,
    InvalidClaims,
    TokenExpired,
    Unauthorized,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationHeaderMissing => "authorization_header_missing",
            Self::InvalidHeader => "invalid_header",
            Self::InvalidClaims => "invalid_claims",
            Self::TokenExpired => "token_expired",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {description}")]
pub struct AuthorizationError {
    status: StatusCode,
    code: AuthErrorCode,
    description: &'static str,
}

impl AuthorizationError {
    fn new(status: StatusCode, code: AuthErrorCode, description: &'static str) -> Self {
        Self {
            status,
            code,
            description,
        }
    }

    pub fn header_missing() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            AuthErrorCode::AuthorizationHeaderMissing,
            "Authorization header is expected.",
        )
    }

    pub fn invalid_header(description: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, AuthErrorCode::InvalidHeader, description)
    }

    pub fn token_expired() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            AuthErrorCode::TokenExpired,
            "Token expired.",
        )
    }

    pub fn invalid_claims() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            AuthErrorCode::InvalidClaims,
            "Incorrect claims. Please, check the audience and issuer.",
        )
    }

    /// The credential verified but carries no permission information at all.
    pub fn permissions_missing() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            AuthErrorCode::InvalidClaims,
            "Permissions not included in JWT.",
        )
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            AuthErrorCode::Unauthorized,
            "Permission not found.",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> AuthErrorCode {
        self.code
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Outcome of a failed verification: either the credential was rejected, or
/// the trusted key set could not be obtained to judge it.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Rejected(#[from] AuthorizationError),

    #[error(transparent)]
    KeySet(#[from] KeySetError),
}
