/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::services::auth::AuthService;
use crate::services::auth::jwks::{KeySetCache, KeySetError, RemoteKeySource};

pub fn build_auth_service(config: &AuthConfig) -> Result<Arc<AuthService>, KeySetError> {
    let source = RemoteKeySource::new(config.jwks_url.clone())?;
    let keys = KeySetCache::new(Arc::new(source), config.jwks_ttl);

    let auth = AuthService::new(
        Arc::new(keys),
        &config.issuer,
        &config.audience,
        config.leeway_seconds,
    );

    Ok(Arc::new(auth))
}
