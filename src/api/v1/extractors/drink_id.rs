/*
 * Responsibility
 * - Path の {id} を String として受け、drink の内部 ID (i64) へ変換する
 * - 数値として解釈できない id は「そのような drink は存在しない」として 404 にする
 *   (axum 標準の Path<i64> rejection は 400 + plain text なので使わない)
 */
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrinkId(pub i64);

fn parse_or_not_found(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| AppError::NotFound)
}

impl FromRequestParts<AppState> for DrinkId
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound)?;

        Ok(Self(parse_or_not_found(&raw)?))
    }
}
