//! # Hemo Core
//!
//! 患者、采集记录与医生的核心数据结构、传输对象、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use error::{FieldError, HemoError, Result};
pub use models::*;
pub use validation::Validate;
