//! 数据库连接管理

use hemo_core::{HemoError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// 连接池参数
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// 数据库连接池
///
/// 由启动代码显式创建并注入到请求处理器中；每个请求从池中借出一个连接，
/// 完成或失败后归还。
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: SqlitePool,
}

impl DatabasePool {
    /// 按URL建立连接池，文件数据库不存在时自动创建
    pub async fn connect(url: &str, settings: &PoolSettings) -> Result<Self> {
        if !url.starts_with("sqlite:") {
            return Err(HemoError::Config(format!("不支持的数据库URL: {}", url)));
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| HemoError::Config(format!("无效的数据库URL {}: {}", url, e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = SqlitePoolOptions::new().acquire_timeout(settings.acquire_timeout);

        // 内存数据库只在单个连接内可见，必须固定为一个永不回收的连接
        let pool_options = if is_in_memory(url) {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .max_connections(settings.max_connections)
                .min_connections(settings.min_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        info!("Connected to database {}", url);
        Ok(Self { pool })
    }

    /// 单连接内存数据库，用于测试和演示
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:", &PoolSettings::default()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
