//! 输入校验
//!
//! 长度上限与数据库列宽一致，通过校验的载荷一定能写入对应的行。

use crate::error::{FieldError, HemoError, Result};
use crate::models::{AcquisitionDto, ClinicianCredentials, PatientDto};

/// 传输对象反序列化之后的形状校验
pub trait Validate {
    /// 一次返回所有出错的字段
    fn validate(&self) -> Result<()>;
}

fn check_max_len(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(FieldError::new(
            field,
            format!("exceeds maximum length of {} characters", max),
        ));
    }
}

fn check_not_blank(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "cannot be empty"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(HemoError::Validation(errors))
    }
}

impl Validate for PatientDto {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        check_max_len(&mut errors, "nome", &self.nome, 50);
        check_max_len(&mut errors, "cognome", &self.cognome, 50);
        check_max_len(&mut errors, "data_nascita", &self.data_nascita, 20);
        check_max_len(&mut errors, "codice_fiscale", &self.codice_fiscale, 16);
        check_max_len(&mut errors, "patologia", &self.patologia, 100);
        check_max_len(&mut errors, "sesso", &self.sesso, 10);
        finish(errors)
    }
}

impl Validate for AcquisitionDto {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        check_max_len(&mut errors, "hb_value", &self.hb_value, 50);
        check_max_len(&mut errors, "acquisition_date", &self.acquisition_date, 20);
        check_max_len(&mut errors, "acquisition_uri", &self.acquisition_uri, 255);
        check_max_len(&mut errors, "acquisition_type", &self.acquisition_type, 50);
        finish(errors)
    }
}

impl Validate for ClinicianCredentials {
    fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        check_not_blank(&mut errors, "username", &self.username);
        check_max_len(&mut errors, "username", &self.username, 50);
        check_not_blank(&mut errors, "password", &self.password);
        finish(errors)
    }
}
