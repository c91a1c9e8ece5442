//! Web服务器

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use hemo_core::Result;
use hemo_database::DatabasePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::{login_handler, register_handler};
use crate::handlers::{
    api_root, count_acquisitions, create_acquisition, create_patient,
    create_patient_for_clinician, delete_patient, get_patient, health, list_acquisitions,
    list_patients, list_patients_by_clinician, random_hb, update_patient,
};

/// 所有处理器共享的状态
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabasePool>,
}

impl AppState {
    pub fn new(db: DatabasePool) -> Self {
        Self { db: Arc::new(db) }
    }
}

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self {
            addr,
            app: create_app(state),
        }
    }

    pub async fn run(self) -> Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Web server stopped");
        Ok(())
    }
}

/// 构建完整路由
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // 根路径
        .route("/", get(api_root))
        // 健康检查
        .route("/health", get(health))
        // 医生
        .route("/registra_medico", post(register_handler))
        .route("/login_medico", post(login_handler))
        // 患者
        .route("/salva_paziente", post(create_patient))
        .route("/salva_paziente/:medico_id", post(create_patient_for_clinician))
        .route("/get_pazienti", get(list_patients))
        .route("/get_pazienti/:medico_id", get(list_patients_by_clinician))
        .route("/get_paziente/:paziente_id", get(get_patient))
        .route("/update_paziente/:paziente_id", put(update_patient))
        .route("/delete_paziente/:paziente_id", delete(delete_patient))
        // 采集记录
        .route("/salva_acquisizione/:paziente_id", post(create_acquisition))
        .route("/get_acquisizioni/:paziente_id", get(list_acquisitions))
        .route("/count_acquisizioni/:paziente_id", get(count_acquisitions))
        .route("/random_hb_value", get(random_hb))
        .with_state(state)
        // 全局中间件
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
