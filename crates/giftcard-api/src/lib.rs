//! 礼品卡服务 REST API
//!
//! 在引擎之上提供礼品卡发行、校验、核销和活动管理的 HTTP 接口。
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型与状态码映射
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{Json, Router, middleware, routing::get};

use giftcard_shared::observability::middleware as obs_middleware;

pub use error::{ApiError, Result};
pub use state::AppState;

/// 组装业务路由、存活探针和可观测性中间件
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .route("/health", get(health_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "giftcard-api"
    }))
}
