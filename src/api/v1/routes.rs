/*
 * Responsibility
 * - drinks API の URL 構造を定義
 * - guard が必要な route と required permission はここで宣言する (route ごとに 1 つ)
 * - GET /drinks と /health は guard なし
 * - 未知の path は 404、登録外の method は 405 (どちらも JSON envelope)
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::v1::handlers::{
    drinks::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink},
    fallback::{method_not_allowed, not_found},
    health::health,
};
use crate::middleware::auth::guard;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/drinks", get(list_drinks))
        .route("/drinks", guard(post(create_drink), state, "post:drinks"))
        .route(
            "/drinks-detail",
            guard(get(list_drinks_detail), state, "get:drinks-detail"),
        )
        .route(
            "/drinks/{id}",
            guard(patch(update_drink), state, "patch:drinks"),
        )
        .route(
            "/drinks/{id}",
            guard(delete(delete_drink), state, "delete:drinks"),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}
