use std::sync::Arc;

use jsonwebtoken::{Validation, errors::ErrorKind};

use crate::services::auth::claims::Claims;
use crate::services::auth::error::{AuthorizationError, VerifyError};
use crate::services::auth::jwks::KeySetCache;

/// Access token verifier.
///
/// - The signing key is picked from the trusted key set by the token's `kid`.
/// - `jsonwebtoken::Validation` checks signature, `exp`, `iss` and `aud`;
///   each distinct failure is mapped onto the authorization taxonomy.
#[derive(Debug, Clone)]
pub struct AuthService {
    keys: Arc<KeySetCache>,
    issuer: String,
    audience: String,
    leeway_seconds: u64,
}

impl AuthService {
    pub fn new(
        keys: Arc<KeySetCache>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            leeway_seconds,
        }
    }

    pub fn key_set(&self) -> &KeySetCache {
        self.keys.as_ref()
    }

    /// Verify and decode a bearer token.
    pub async fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| {
            AuthorizationError::invalid_header("Unable to parse authentication token.")
        })?;

        let kid = header
            .kid
            .ok_or_else(|| AuthorizationError::invalid_header("Authorization malformed."))?;

        let trusted = self.keys.get(&kid).await?.ok_or_else(|| {
            AuthorizationError::invalid_header("Unable to find the appropriate key.")
        })?;

        let mut validation = Validation::new(trusted.algorithm);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = self.leeway_seconds;

        let data = jsonwebtoken::decode::<Claims>(token, &trusted.key, &validation)
            .map_err(|err| classify(&err))?;

        Ok(data.claims)
    }
}

fn classify(err: &jsonwebtoken::errors::Error) -> AuthorizationError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthorizationError::token_expired(),
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => {
            AuthorizationError::invalid_claims()
        }
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
            AuthorizationError::invalid_claims()
        }
        _ => AuthorizationError::invalid_header("Unable to parse authentication token."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::error::AuthErrorCode;
    use crate::test_support::{self, TokenBuilder};

    fn service() -> AuthService {
        test_support::auth_service()
    }

    fn rejected(err: VerifyError) -> AuthorizationError {
        match err {
            VerifyError::Rejected(e) => e,
            VerifyError::KeySet(e) => panic!("unexpected key set error: {e}"),
        }
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let token = TokenBuilder::new()
            .subject("auth0|barista")
            .permissions(&["get:drinks-detail"])
            .sign();

        let claims = service().verify(&token).await.unwrap();

        assert_eq!(claims.sub.as_deref(), Some("auth0|barista"));
        assert!(claims.has_permission("get:drinks-detail"));
    }

    #[tokio::test]
    async fn accepts_audience_array() {
        let token = TokenBuilder::new()
            .audience_list(&[test_support::TEST_AUDIENCE, "https://tenant.example.com/userinfo"])
            .sign();

        assert!(service().verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn absent_permissions_survive_verification() {
        let token = TokenBuilder::new().without_permissions().sign();
        let claims = service().verify(&token).await.unwrap();
        assert!(claims.permissions.is_none());
    }

    #[tokio::test]
    async fn garbage_is_invalid_header() {
        let err = rejected(service().verify("not-a-jwt").await.unwrap_err());
        assert_eq!(err.code(), AuthErrorCode::InvalidHeader);
    }

    #[tokio::test]
    async fn empty_token_is_invalid_header() {
        let err = rejected(service().verify("").await.unwrap_err());
        assert_eq!(err.code(), AuthErrorCode::InvalidHeader);
    }

    #[tokio::test]
    async fn missing_kid_is_invalid_header() {
        let token = TokenBuilder::new().without_kid().sign();
        let err = rejected(service().verify(&token).await.unwrap_err());
        assert_eq!(err.code(), AuthErrorCode::InvalidHeader);
        assert_eq!(err.description(), "Authorization malformed.");
    }

    #[tokio::test]
    async fn unknown_kid_is_invalid_header() {
        let token = TokenBuilder::new().kid("rotated-away").sign();
        let err = rejected(service().verify(&token).await.unwrap_err());
        assert_eq!(err.code(), AuthErrorCode::InvalidHeader);
        assert_eq!(err.description(), "Unable to find the appropriate key.");
    }

    #[tokio::test]
    async fn foreign_signature_is_invalid_header() {
        let token = TokenBuilder::new().signed_by_untrusted_key().sign();
        let err = rejected(service().verify(&token).await.unwrap_err());
        assert_eq!(err.code(), AuthErrorCode::InvalidHeader);
    }

    #[tokio::test]
    async fn expired_token() {
        let token = TokenBuilder::new().expires_in(-600).sign();
        let err = rejected(service().verify(&token).await.unwrap_err());
        assert_eq!(err.code(), AuthErrorCode::TokenExpired);
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_audience_is_invalid_claims() {
        let token = TokenBuilder::new().audience("someone-else").sign();
        let err = rejected(service().verify(&token).await.unwrap_err());
        assert_eq!(err.code(), AuthErrorCode::InvalidClaims);
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_issuer_is_invalid_claims() {
        let token = TokenBuilder::new().issuer("https://evil.example.com/").sign();
        let err = rejected(service().verify(&token).await.unwrap_err());
        assert_eq!(err.code(), AuthErrorCode::InvalidClaims);
    }
}
