//! 配置管理
//!
//! 配置按以下顺序叠加，后者覆盖前者：内置默认值、配置文件、`HEMO__` 前缀的环境变量。
//! 命令行参数在 `main` 中最后覆盖。

use anyhow::{Context, Result};
use config::{Config, Environment, File, Source};
use hemo_database::PoolSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Hemo服务完整配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HemoConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 连接字符串
    pub url: String,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接的超时时间（秒）
    pub acquire_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 默认日志级别，`RUST_LOG` 存在时以其为准
    pub level: String,
}

/// 配置校验规则
struct ValidationRule {
    field_path: &'static str,
    validator: fn(&HemoConfig) -> Result<()>,
}

impl HemoConfig {
    /// 从可选的配置文件和环境变量加载配置
    ///
    /// 只负责加载，不做校验；命令行覆盖之后由调用方执行 [`HemoConfig::validate`]。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let env = Environment::with_prefix("HEMO")
            .separator("__")
            .try_parsing(true);
        Self::load_from(config_path.map(File::with_name), env)
    }

    fn load_from<S>(file: Option<S>, env: Environment) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder().add_source(
            Config::try_from(&HemoConfig::default()).context("Failed to build default config")?,
        );
        if let Some(file) = file {
            builder = builder.add_source(file);
        }

        builder
            .add_source(env)
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        let rules = [
            ValidationRule {
                field_path: "server.port",
                validator: |config| {
                    if config.server.port == 0 {
                        Err(anyhow::anyhow!("Server port cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "database.url",
                validator: |config| {
                    if config.database.url.trim().is_empty() {
                        Err(anyhow::anyhow!("Database url cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "database.max_connections",
                validator: |config| {
                    if config.database.max_connections == 0 {
                        Err(anyhow::anyhow!("Database max connections cannot be 0"))
                    } else if config.database.min_connections > config.database.max_connections {
                        Err(anyhow::anyhow!(
                            "Database min connections exceed max connections"
                        ))
                    } else {
                        Ok(())
                    }
                },
            },
        ];

        for rule in &rules {
            if let Err(e) = (rule.validator)(self) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(e.context(format!("Invalid configuration value {}", rule.field_path)));
            }
        }

        info!("Configuration validation passed");
        Ok(())
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
        }
    }
}

impl Default for HemoConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://hemo.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
