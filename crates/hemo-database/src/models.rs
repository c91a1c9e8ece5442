//! 数据库模型

use hemo_core::models::*;
use sqlx::FromRow;

// 数据库表模型 - 使用FromRow trait用于SQL查询，列名沿用原有表结构

/// 数据库患者表 `pazienti`
#[derive(Debug, FromRow)]
pub struct DbPatient {
    pub id: i64,
    pub nome: String,
    pub cognome: String,
    pub data_nascita: String,
    pub codice_fiscale: String,
    pub patologia: String,
    pub sesso: String,
    pub id_medico: Option<i64>,
}

impl From<DbPatient> for Patient {
    fn from(db_patient: DbPatient) -> Self {
        Patient {
            id: db_patient.id,
            first_name: db_patient.nome,
            last_name: db_patient.cognome,
            birth_date: db_patient.data_nascita,
            fiscal_code: db_patient.codice_fiscale,
            pathology: db_patient.patologia,
            sex: db_patient.sesso,
            clinician_id: db_patient.id_medico,
        }
    }
}

/// 数据库采集表 `acquisizioni`
#[derive(Debug, FromRow)]
pub struct DbAcquisition {
    pub acquisizione_id: i64,
    pub id_paziente: i64,
    pub hb_value: String,
    pub acquisition_date: String,
    pub acquisition_uri: String,
    pub acquisition_type: String,
}

impl From<DbAcquisition> for Acquisition {
    fn from(db_acquisition: DbAcquisition) -> Self {
        Acquisition {
            id: db_acquisition.acquisizione_id,
            patient_id: db_acquisition.id_paziente,
            hb_value: db_acquisition.hb_value,
            acquisition_date: db_acquisition.acquisition_date,
            acquisition_uri: db_acquisition.acquisition_uri,
            acquisition_type: db_acquisition.acquisition_type,
        }
    }
}

/// 数据库医生表 `medici`
#[derive(Debug, FromRow)]
pub struct DbClinician {
    pub id: i64,
    pub username: String,
    pub password: String,
}

impl From<DbClinician> for Clinician {
    fn from(db_clinician: DbClinician) -> Self {
        Clinician {
            id: db_clinician.id,
            username: db_clinician.username,
            password_digest: db_clinician.password,
        }
    }
}

/// 将查询得到的行批量转换为目标类型
pub fn map_rows<R, T>(rows: Vec<R>) -> Vec<T>
where
    T: From<R>,
{
    rows.into_iter().map(T::from).collect()
}

// 插入模型 - 用于创建新记录

/// 新患者插入模型
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub fiscal_code: String,
    pub pathology: String,
    pub sex: String,
    pub clinician_id: Option<i64>,
}

impl NewPatient {
    pub fn from_dto(dto: &PatientDto, clinician_id: Option<i64>) -> Self {
        Self {
            first_name: dto.nome.clone(),
            last_name: dto.cognome.clone(),
            birth_date: dto.data_nascita.clone(),
            fiscal_code: dto.codice_fiscale.clone(),
            pathology: dto.patologia.clone(),
            sex: dto.sesso.clone(),
            clinician_id,
        }
    }
}

/// 新采集记录插入模型
#[derive(Debug, Clone)]
pub struct NewAcquisition {
    pub patient_id: i64,
    pub hb_value: String,
    pub acquisition_date: String,
    pub acquisition_uri: String,
    pub acquisition_type: String,
}

impl NewAcquisition {
    pub fn from_dto(patient_id: i64, dto: &AcquisitionDto) -> Self {
        Self {
            patient_id,
            hb_value: dto.hb_value.clone(),
            acquisition_date: dto.acquisition_date.clone(),
            acquisition_uri: dto.acquisition_uri.clone(),
            acquisition_type: dto.acquisition_type.clone(),
        }
    }
}

/// 新医生插入模型，口令已是摘要
#[derive(Debug, Clone)]
pub struct NewClinician {
    pub username: String,
    pub password_digest: String,
}
