/*
 * Responsibility
 * - /drinks 系 handler (一覧 short / 一覧 long / 作成 / 部分更新 / 削除)
 * - 認可は routes で guard 済み。ここでは AuthCtx をログ相関に使うだけ
 * - 失敗は AppError に変換 (作成: 400/422、それ以外: 404/405)
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    api::v1::{
        dto::drinks::{
            CreateDrinkRequest, DeleteResponse, DrinkLong, DrinkShort, DrinksResponse,
            UpdateDrinkRequest,
        },
        extractors::{AuthCtxExtractor, DrinkId},
    },
    error::AppError,
    repos::{Drink, error::RepoError},
    state::AppState,
};

// list / detail / update / delete: persistence failures surface as 405
fn operation_failed(op: &'static str) -> impl FnOnce(RepoError) -> AppError {
    move |e| {
        tracing::error!(error = ?e, op, "drink operation failed");
        AppError::MethodNotAllowed
    }
}

async fn all_drinks(state: &AppState, op: &'static str) -> Result<Vec<Drink>, AppError> {
    let drinks = state.drinks.list().await.map_err(operation_failed(op))?;

    if drinks.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(drinks)
}

/// GET /drinks (public)
pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<Vec<DrinkShort>>>, AppError> {
    let drinks = all_drinks(&state, "list").await?;

    Ok(Json(DrinksResponse::ok(
        drinks.into_iter().map(DrinkShort::from).collect(),
    )))
}

/// GET /drinks-detail (get:drinks-detail)
pub async fn list_drinks_detail(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
) -> Result<Json<DrinksResponse<Vec<DrinkLong>>>, AppError> {
    tracing::debug!(
        subject = auth.subject.as_deref().unwrap_or("-"),
        permissions = ?auth.permissions,
        "drinks detail"
    );

    let drinks = all_drinks(&state, "detail").await?;

    Ok(Json(DrinksResponse::ok(
        drinks.into_iter().map(DrinkLong::from).collect(),
    )))
}

/// POST /drinks (post:drinks)
pub async fn create_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    body: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let Json(req) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection, "create drink: unreadable body");
        AppError::Unprocessable
    })?;

    let new = req.into_new_drink().map_err(|reason| {
        tracing::warn!(reason, "create drink: invalid body");
        AppError::BadRequest(reason)
    })?;

    // the repo rolls back its own transaction before returning an error
    let drink = state.drinks.create(new).await.map_err(|e| {
        tracing::warn!(error = ?e, "create drink rejected by store");
        AppError::Unprocessable
    })?;

    tracing::info!(
        id = drink.id,
        subject = auth.subject.as_deref().unwrap_or("-"),
        "drink created"
    );

    Ok(Json(DrinksResponse::ok(DrinkLong::from(drink))))
}

/// PATCH /drinks/{id} (patch:drinks)
pub async fn update_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    DrinkId(id): DrinkId,
    body: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<Vec<DrinkLong>>>, AppError> {
    state
        .drinks
        .get(id)
        .await
        .map_err(operation_failed("update"))?
        .ok_or(AppError::NotFound)?;

    let Json(req) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection, id, "update drink: unreadable body");
        AppError::MethodNotAllowed
    })?;

    let patch = req.into_patch().map_err(|reason| {
        tracing::warn!(reason, id, "update drink: invalid body");
        AppError::MethodNotAllowed
    })?;

    let drink = state
        .drinks
        .update(id, patch)
        .await
        .map_err(operation_failed("update"))?
        // deleted between lookup and update
        .ok_or(AppError::NotFound)?;

    tracing::info!(
        id,
        subject = auth.subject.as_deref().unwrap_or("-"),
        "drink updated"
    );

    Ok(Json(DrinksResponse::ok(vec![DrinkLong::from(drink)])))
}

/// DELETE /drinks/{id} (delete:drinks)
pub async fn delete_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    DrinkId(id): DrinkId,
) -> Result<Json<DeleteResponse>, AppError> {
    let deleted = state
        .drinks
        .delete(id)
        .await
        .map_err(operation_failed("delete"))?;

    if !deleted {
        return Err(AppError::NotFound);
    }

    tracing::info!(
        id,
        subject = auth.subject.as_deref().unwrap_or("-"),
        "drink deleted"
    );

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
