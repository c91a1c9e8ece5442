//! # Hemo数据库模块
//!
//! 负责患者、采集记录与医生三张表的存储，提供SQLite连接池和完整的CRUD操作。

pub mod connection;
pub mod models;
pub mod queries;

// 重新导出主要类型
pub use connection::{DatabasePool, PoolSettings};
pub use models::*;
pub use queries::DatabaseQueries;
