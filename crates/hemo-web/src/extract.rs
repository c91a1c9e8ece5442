//! 带校验的请求提取器

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, RawPathParams, Request,
    },
    http::request::Parts,
    Json,
};
use hemo_core::{FieldError, HemoError, Validate};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::ApiError;

/// 反序列化请求体并执行 [`Validate`]，失败时返回422和字段明细
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        if let Err(e) = value.validate() {
            warn!("Rejected request payload: {}", e);
            return Err(ApiError(e));
        }

        Ok(ValidatedJson(value))
    }
}

/// 解析路径参数，失败时与请求体错误一样返回422，字段名取自路由中的参数名
#[derive(Debug, Clone)]
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ValidatedPath(value)),
            Err(rejection) => {
                let field = RawPathParams::from_request_parts(parts, state)
                    .await
                    .ok()
                    .and_then(|params| params.iter().next().map(|(key, _)| key.to_string()))
                    .unwrap_or_else(|| "path".to_string());
                Err(path_rejection_to_error(field, rejection))
            }
        }
    }
}

fn path_rejection_to_error(field: String, rejection: PathRejection) -> ApiError {
    let message = rejection.body_text();
    warn!("Malformed path parameter {}: {}", field, message);
    ApiError(HemoError::Validation(vec![FieldError::new(field, message)]))
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    let message = rejection.body_text();
    warn!("Malformed request body: {}", message);

    let field = field_from_message(&message).unwrap_or_else(|| "body".to_string());
    ApiError(HemoError::Validation(vec![FieldError::new(field, message)]))
}

/// 从serde的报错中取出字段名，例如 "missing field `sesso`"
fn field_from_message(message: &str) -> Option<String> {
    let rest = message
        .split_once("missing field `")
        .or_else(|| message.split_once("unknown field `"))
        .map(|(_, rest)| rest)?;
    rest.split_once('`').map(|(field, _)| field.to_string())
}
