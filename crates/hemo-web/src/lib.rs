//! # Hemo Web
//!
//! HTTP接口：患者、采集记录与医生账户的请求处理器，以及路由和服务器启动。

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use extract::{ValidatedJson, ValidatedPath};
pub use server::{create_app, AppState, WebServer};
