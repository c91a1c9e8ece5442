//! 核心数据模型与传输对象
//!
//! 领域记录（`Patient`、`Acquisition`、`Clinician`）与HTTP传输对象（`*Dto`）分开定义：
//! 传输对象使用原有的意大利语字段名，创建时不携带标识符。

use serde::{Deserialize, Serialize};

/// 患者记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub fiscal_code: String, // 税号，唯一
    pub pathology: String,
    pub sex: String,
    pub clinician_id: Option<i64>,
}

/// 采集记录（血红蛋白测量）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    pub id: i64,
    pub patient_id: i64,
    pub hb_value: String,
    pub acquisition_date: String,
    pub acquisition_uri: String,
    pub acquisition_type: String,
}

/// 医生账户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clinician {
    pub id: i64,
    pub username: String,
    pub password_digest: String, // "<salt>$<sha256>"
}

/// 患者传输对象（不含ID）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDto {
    pub nome: String,
    pub cognome: String,
    pub data_nascita: String,
    pub codice_fiscale: String,
    pub patologia: String,
    pub sesso: String,
}

/// 含ID的患者传输对象，用于列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientWithIdDto {
    pub id: i64,
    pub nome: String,
    pub cognome: String,
    pub data_nascita: String,
    pub codice_fiscale: String,
    pub patologia: String,
    pub sesso: String,
}

/// 采集记录传输对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionDto {
    pub hb_value: String,
    pub acquisition_date: String,
    pub acquisition_uri: String,
    pub acquisition_type: String,
}

/// 医生注册/登录请求
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicianCredentials {
    pub username: String,
    pub password: String,
}

/// 仅包含提示信息的响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<Patient> for PatientDto {
    fn from(patient: Patient) -> Self {
        PatientDto {
            nome: patient.first_name,
            cognome: patient.last_name,
            data_nascita: patient.birth_date,
            codice_fiscale: patient.fiscal_code,
            patologia: patient.pathology,
            sesso: patient.sex,
        }
    }
}

impl From<Patient> for PatientWithIdDto {
    fn from(patient: Patient) -> Self {
        PatientWithIdDto {
            id: patient.id,
            nome: patient.first_name,
            cognome: patient.last_name,
            data_nascita: patient.birth_date,
            codice_fiscale: patient.fiscal_code,
            patologia: patient.pathology,
            sesso: patient.sex,
        }
    }
}

impl From<Acquisition> for AcquisitionDto {
    fn from(acquisition: Acquisition) -> Self {
        AcquisitionDto {
            hb_value: acquisition.hb_value,
            acquisition_date: acquisition.acquisition_date,
            acquisition_uri: acquisition.acquisition_uri,
            acquisition_type: acquisition.acquisition_type,
        }
    }
}
