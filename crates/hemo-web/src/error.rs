//! 错误到HTTP响应的映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hemo_core::HemoError;
use serde_json::json;
use tracing::error;

/// 处理器统一错误类型，包装 [`HemoError`] 以便实现 `IntoResponse`
#[derive(Debug)]
pub struct ApiError(pub HemoError);

pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "Errore interno del server";

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl<E> From<E> for ApiError
where
    E: Into<HemoError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HemoError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HemoError::NotFound(_) => StatusCode::NOT_FOUND,
            HemoError::Conflict(_) => StatusCode::BAD_REQUEST,
            HemoError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HemoError::Config(_) | HemoError::Database(_) | HemoError::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self.0 {
            HemoError::Validation(fields) => json!({
                "error": true,
                "status": status.as_u16(),
                "message": "Dati della richiesta non validi",
                "detail": fields,
            }),
            HemoError::NotFound(msg) | HemoError::Conflict(msg) | HemoError::Unauthorized(msg) => {
                json!({
                    "error": true,
                    "status": status.as_u16(),
                    "message": msg,
                })
            }
            // 驱动层的报错只写日志，不返回给客户端
            other => {
                error!("Request failed: {}", other);
                json!({
                    "error": true,
                    "status": status.as_u16(),
                    "message": INTERNAL_ERROR_MESSAGE,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}
