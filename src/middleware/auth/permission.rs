//! Per-route permission guard.
//!
//! extract → verify → authorize → admit. Any failure returns the matching
//! `AppError` immediately and the wrapped handler never runs. On success the
//! verified claims are handed to the handler as `AuthCtx` via extensions.
//!
//! ```ignore
//! .route("/drinks", guard(post(create_drink), &state, "post:drinks"))
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthService, bearer, permissions};
use crate::state::AppState;

/// State carried by one guarded route: the verifier and the permission it demands.
#[derive(Clone)]
pub struct PermissionGuard {
    auth: Arc<AuthService>,
    permission: &'static str,
}

/// Wrap `route` so that it only runs for callers holding `permission`.
pub fn guard(
    route: MethodRouter<AppState>,
    state: &AppState,
    permission: &'static str,
) -> MethodRouter<AppState> {
    let guard = PermissionGuard {
        auth: state.auth.clone(),
        permission,
    };
    // route_layer: the guard only wraps methods registered on `route`
    route.route_layer(middleware::from_fn_with_state(guard, require_permission))
}

async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer::bearer_token(req.headers()).inspect_err(|err| {
        tracing::warn!(code = %err.code(), reason = err.description(), "bearer credential rejected");
    })?;

    let claims = guard.auth.verify(token).await.inspect_err(|err| {
        tracing::warn!(error = %err, "access token verification failed");
    })?;

    permissions::check_permission(guard.permission, &claims).inspect_err(|err| {
        tracing::warn!(
            code = %err.code(),
            required = guard.permission,
            subject = claims.sub.as_deref().unwrap_or("-"),
            "permission check failed"
        );
    })?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from_claims(claims));

    Ok(next.run(req).await)
}
