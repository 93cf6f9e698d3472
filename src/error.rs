/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error envelope)
 * - 認可エラー / key set 取得失敗 / handler 側の失敗を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::{AuthorizationError, VerifyError};

/// `{"success": false, "error": <status>, "message": <string>}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthorizationError),
    #[error("key set unavailable")]
    KeySetUnavailable,
    #[error("bad request: {0}")]
    BadRequest(&'static str),
    #[error("resource not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("unprocessable")]
    Unprocessable,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => e.status(),
            AppError::KeySetUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // client-facing message; never carries internal detail
    fn message(&self) -> &'static str {
        match self {
            AppError::Auth(e) => e.code().as_str(),
            AppError::KeySetUnavailable => "key set unavailable",
            AppError::BadRequest(_) => "bad request",
            AppError::NotFound => "resource not found",
            AppError::MethodNotAllowed => "method not allowed",
            AppError::Unprocessable => "unprocessable",
            AppError::Internal => "internal server error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = ErrorResponse {
            success: false,
            error: status.as_u16(),
            message: self.message().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<VerifyError> for AppError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Rejected(e) => AppError::Auth(e),
            VerifyError::KeySet(_) => AppError::KeySetUnavailable,
        }
    }
}
