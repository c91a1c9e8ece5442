//! HTTP处理器

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use hemo_core::{
    utils::random_hb_value, AcquisitionDto, HemoError, MessageResponse, Patient, PatientDto,
    PatientWithIdDto,
};
use hemo_database::{map_rows, DatabaseQueries, NewAcquisition, NewPatient};
use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::server::AppState;

pub(crate) const PATIENT_NOT_FOUND: &str = "Paziente non trovato";
pub(crate) const CLINICIAN_NOT_FOUND: &str = "Medico non trovato";

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "Hemo API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "patients": ["/salva_paziente", "/get_pazienti", "/get_paziente/{id}", "/update_paziente/{id}", "/delete_paziente/{id}"],
            "acquisitions": ["/salva_acquisizione/{id}", "/get_acquisizioni/{id}", "/count_acquisizioni/{id}", "/random_hb_value"],
            "clinicians": ["/registra_medico", "/login_medico"]
        }
    }))
}

/// 健康检查处理器
pub async fn health(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    DatabaseQueries::new(&state.db).ping().await?;

    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })))
}

async fn require_patient(queries: &DatabaseQueries<'_>, patient_id: i64) -> ApiResult<Patient> {
    match queries.get_patient_by_id(patient_id).await? {
        Some(patient) => Ok(patient),
        None => {
            warn!("Patient {} not found", patient_id);
            Err(HemoError::NotFound(PATIENT_NOT_FOUND.to_string()).into())
        }
    }
}

async fn require_clinician(queries: &DatabaseQueries<'_>, clinician_id: i64) -> ApiResult<()> {
    match queries.get_clinician_by_id(clinician_id).await? {
        Some(_) => Ok(()),
        None => {
            warn!("Clinician {} not found", clinician_id);
            Err(HemoError::NotFound(CLINICIAN_NOT_FOUND.to_string()).into())
        }
    }
}

// ========== 患者 ==========

/// 保存不属于任何医生的患者
pub async fn create_patient(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PatientDto>,
) -> ApiResult<Json<MessageResponse>> {
    let queries = DatabaseQueries::new(&state.db);
    let patient = queries.create_patient(&NewPatient::from_dto(&dto, None)).await?;

    info!("Created patient {}", patient.id);
    Ok(Json(MessageResponse::new("Paziente salvato con successo")))
}

/// 保存医生名下的患者
pub async fn create_patient_for_clinician(
    State(state): State<AppState>,
    ValidatedPath(clinician_id): ValidatedPath<i64>,
    ValidatedJson(dto): ValidatedJson<PatientDto>,
) -> ApiResult<Json<MessageResponse>> {
    let queries = DatabaseQueries::new(&state.db);
    require_clinician(&queries, clinician_id).await?;

    let patient = queries
        .create_patient(&NewPatient::from_dto(&dto, Some(clinician_id)))
        .await?;

    info!("Created patient {} for clinician {}", patient.id, clinician_id);
    Ok(Json(MessageResponse::new("Paziente salvato con successo")))
}

pub async fn list_patients(State(state): State<AppState>) -> ApiResult<Json<Vec<PatientWithIdDto>>> {
    let patients = DatabaseQueries::new(&state.db).list_patients().await?;
    Ok(Json(map_rows(patients)))
}

pub async fn list_patients_by_clinician(
    State(state): State<AppState>,
    ValidatedPath(clinician_id): ValidatedPath<i64>,
) -> ApiResult<Json<Vec<PatientWithIdDto>>> {
    let queries = DatabaseQueries::new(&state.db);
    require_clinician(&queries, clinician_id).await?;

    let patients = queries.list_patients_by_clinician(clinician_id).await?;
    Ok(Json(map_rows(patients)))
}

pub async fn get_patient(
    State(state): State<AppState>,
    ValidatedPath(patient_id): ValidatedPath<i64>,
) -> ApiResult<Json<PatientDto>> {
    let queries = DatabaseQueries::new(&state.db);
    let patient = require_patient(&queries, patient_id).await?;
    Ok(Json(PatientDto::from(patient)))
}

/// 用请求体整体覆盖患者数据
pub async fn update_patient(
    State(state): State<AppState>,
    ValidatedPath(patient_id): ValidatedPath<i64>,
    ValidatedJson(dto): ValidatedJson<PatientDto>,
) -> ApiResult<Json<MessageResponse>> {
    let queries = DatabaseQueries::new(&state.db);
    let existing = require_patient(&queries, patient_id).await?;

    let updated = queries
        .update_patient(patient_id, &NewPatient::from_dto(&dto, existing.clinician_id))
        .await?;
    if !updated {
        return Err(HemoError::NotFound(PATIENT_NOT_FOUND.to_string()).into());
    }

    info!("Updated patient {}", patient_id);
    Ok(Json(MessageResponse::new("Dati del paziente aggiornati con successo")))
}

/// 删除患者及其全部采集记录
pub async fn delete_patient(
    State(state): State<AppState>,
    ValidatedPath(patient_id): ValidatedPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let queries = DatabaseQueries::new(&state.db);
    require_patient(&queries, patient_id).await?;

    let removed = queries
        .delete_patient_cascade(patient_id)
        .await?
        .ok_or_else(|| HemoError::NotFound(PATIENT_NOT_FOUND.to_string()))?;

    info!("Deleted patient {} and {} acquisitions", patient_id, removed);
    Ok(Json(MessageResponse::new(
        "Paziente e relative acquisizioni eliminate con successo",
    )))
}

// ========== 采集记录 ==========

pub async fn create_acquisition(
    State(state): State<AppState>,
    ValidatedPath(patient_id): ValidatedPath<i64>,
    ValidatedJson(dto): ValidatedJson<AcquisitionDto>,
) -> ApiResult<Json<MessageResponse>> {
    let queries = DatabaseQueries::new(&state.db);
    require_patient(&queries, patient_id).await?;

    let acquisition = queries
        .create_acquisition(&NewAcquisition::from_dto(patient_id, &dto))
        .await?;

    info!("Created acquisition {} for patient {}", acquisition.id, patient_id);
    Ok(Json(MessageResponse::new("Acquisizione salvata con successo")))
}

pub async fn list_acquisitions(
    State(state): State<AppState>,
    ValidatedPath(patient_id): ValidatedPath<i64>,
) -> ApiResult<Json<Vec<AcquisitionDto>>> {
    let queries = DatabaseQueries::new(&state.db);
    require_patient(&queries, patient_id).await?;

    let acquisitions = queries.list_acquisitions_by_patient(patient_id).await?;
    Ok(Json(map_rows(acquisitions)))
}

pub async fn count_acquisitions(
    State(state): State<AppState>,
    ValidatedPath(patient_id): ValidatedPath<i64>,
) -> ApiResult<Json<i64>> {
    let queries = DatabaseQueries::new(&state.db);
    require_patient(&queries, patient_id).await?;

    let count = queries.count_acquisitions_by_patient(patient_id).await?;
    Ok(Json(count))
}

/// 生成一个随机血红蛋白值，不写入数据库
pub async fn random_hb() -> Json<String> {
    Json(random_hb_value(&mut rand::thread_rng()))
}
