//! 医生注册与登录
//!
//! 登录只校验用户名与口令并返回医生ID，不签发令牌、不维护会话。

use axum::{extract::State, response::Json};
use hemo_core::{
    utils::{hash_password, verify_password},
    ClinicianCredentials, HemoError, MessageResponse,
};
use hemo_database::{DatabaseQueries, NewClinician};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::server::AppState;

const INVALID_CREDENTIALS: &str = "Credenziali non valide";

/// 注册处理器，用户名重复时返回400
///
/// 直接插入并依赖唯一约束判断重名，并发注册同名账户不会出现500。
pub async fn register_handler(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<ClinicianCredentials>,
) -> ApiResult<Json<MessageResponse>> {
    let result = DatabaseQueries::new(&state.db)
        .create_clinician(&NewClinician {
            username: credentials.username.clone(),
            password_digest: hash_password(&credentials.password),
        })
        .await;

    let clinician = match result {
        Ok(clinician) => clinician,
        Err(e @ HemoError::Conflict(_)) => {
            warn!("Registration rejected, username taken: {}", credentials.username);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    info!("Registered clinician {} ({})", clinician.id, clinician.username);
    Ok(Json(MessageResponse::new("Medico registrato con successo")))
}

/// 登录处理器，成功时返回医生ID
pub async fn login_handler(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<ClinicianCredentials>,
) -> ApiResult<Json<i64>> {
    info!("Login attempt for user: {}", credentials.username);

    let clinician = DatabaseQueries::new(&state.db)
        .get_clinician_by_username(&credentials.username)
        .await?;

    match clinician {
        Some(clinician) if verify_password(&credentials.password, &clinician.password_digest) => {
            info!("Clinician logged in successfully: {}", clinician.username);
            Ok(Json(clinician.id))
        }
        _ => {
            warn!("Login failed for user: {}", credentials.username);
            Err(HemoError::Unauthorized(INVALID_CREDENTIALS.to_string()).into())
        }
    }
}
