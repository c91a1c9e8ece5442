//! Hemo服务器主程序

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use hemo_database::{DatabasePool, DatabaseQueries};
use hemo_web::{AppState, WebServer};
use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::HemoConfig;

/// Hemo服务器命令行参数
#[derive(Parser, Debug)]
#[command(name = "hemo-server")]
#[command(about = "患者、血红蛋白采集记录与医生账户的HTTP服务")]
struct Args {
    /// 监听主机
    #[arg(long)]
    host: Option<String>,

    /// 服务器端口
    #[arg(short, long)]
    port: Option<u16>,

    /// 数据库URL，例如 sqlite://hemo.db
    #[arg(short, long)]
    database_url: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,
}

impl Args {
    /// 命令行参数最后覆盖配置
    fn apply(self, config: &mut HemoConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = HemoConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // 初始化日志
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 所有来源叠加完毕后只校验一次
    config.validate()?;

    info!("启动Hemo服务器...");
    info!("  监听地址: {}:{}", config.server.host, config.server.port);
    info!("  数据库: {}", config.database.url);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.host))?;

    let pool = DatabasePool::connect(&config.database.url, &config.pool_settings()).await?;
    DatabaseQueries::new(&pool).create_tables().await?;

    let server = WebServer::new(addr, AppState::new(pool.clone()));

    let result = server.run().await;
    pool.close().await;

    if let Err(e) = result {
        error!("服务器运行失败: {}", e);
        return Err(e.into());
    }

    Ok(())
}
