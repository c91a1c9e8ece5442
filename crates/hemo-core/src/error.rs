//! 错误定义模块

use serde::Serialize;
use thiserror::Error;

/// 单个字段的校验失败信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Hemo系统统一错误类型
#[derive(Error, Debug)]
pub enum HemoError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("网络错误: {0}")]
    Network(#[from] std::io::Error),

    #[error("验证错误: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("资源冲突: {0}")]
    Conflict(String),

    #[error("认证失败: {0}")]
    Unauthorized(String),

    #[error("资源未找到: {0}")]
    NotFound(String),
}

impl HemoError {
    /// 只有一个字段出错时的便捷构造
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        HemoError::Validation(vec![FieldError::new(field, message)])
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for HemoError {
    fn from(e: sqlx::Error) -> Self {
        HemoError::Database(e.to_string())
    }
}

/// Hemo系统统一结果类型
pub type Result<T> = std::result::Result<T, HemoError>;
