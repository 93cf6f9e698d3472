/*
 * Responsibility
 * - Router が自前で返す失敗 (未知の path / 未対応の method) を JSON envelope にする
 */
use crate::error::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
