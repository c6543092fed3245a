//! 礼品卡服务入口

use std::time::Duration;

use axum::{Json, http::HeaderValue, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

use giftcard_api::{AppState, app};
use giftcard_shared::{config::AppConfig, database::Database, observability};

const SERVICE_NAME: &str = "giftcard-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).unwrap_or_default();
    let _guard = observability::init(SERVICE_NAME, &config.observability).await?;

    info!(
        environment = %config.environment,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;

    let state = AppState::new(db.pool().clone(), &config.issuance);

    // CORS 配置：通过 GIFTCARD_CORS_ORIGINS 环境变量控制允许的来源
    let allowed_origins =
        std::env::var("GIFTCARD_CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
    let cors = if allowed_origins == "*" {
        if config.is_production() {
            warn!("GIFTCARD_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let router = app(state)
        .route(
            "/ready",
            get({
                let db_for_ready = db.clone();
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(60)));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接并等待已有请求处理完毕
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 就绪探针：检查数据库连接是否可用，并带出连接池占用
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let database = db.probe().await;

    Json(serde_json::json!({
        "status": if database.reachable { "ok" } else { "degraded" },
        "service": SERVICE_NAME,
        "checks": {
            "database": database
        }
    }))
}
