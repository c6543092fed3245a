//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。
//! recorder 未安装时（如单元测试）所有记录函数均为空操作。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(service_name: &str, port: u16) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!("giftcard_issued_total", "Gift card issuance attempts by outcome");
    metrics::describe_counter!(
        "giftcard_key_collisions_total",
        "Public/secret code collisions that triggered key regeneration"
    );
    metrics::describe_counter!("giftcard_approvals_total", "Gift card approvals by outcome");
    metrics::describe_counter!(
        "giftcard_compensations_total",
        "Approval rollbacks issued while compensating a failed batch"
    );
    metrics::describe_counter!("giftcard_validations_total", "Gift card validity checks");
    metrics::describe_histogram!(
        "giftcard_batch_duration_seconds",
        "Bulk issuance/validation/approval duration in seconds"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录单张卡发行结果（success / failed / exhausted）
#[inline]
pub fn record_issuance(status: &'static str) {
    metrics::counter!("giftcard_issued_total", "status" => status).increment(1);
}

#[inline]
pub fn record_key_collision() {
    metrics::counter!("giftcard_key_collisions_total").increment(1);
}

/// 记录单张卡核销结果（success / not_found / taken / failed）
#[inline]
pub fn record_approval(status: &'static str) {
    metrics::counter!("giftcard_approvals_total", "status" => status).increment(1);
}

#[inline]
pub fn record_compensation(status: &'static str) {
    metrics::counter!("giftcard_compensations_total", "status" => status).increment(1);
}

#[inline]
pub fn record_validation(valid: bool) {
    metrics::counter!("giftcard_validations_total", "valid" => valid.to_string()).increment(1);
}

/// 记录批量操作耗时（operation: issue / validate / approve）
#[inline]
pub fn record_batch(operation: &'static str, size: usize, duration_secs: f64) {
    metrics::histogram!(
        "giftcard_batch_duration_seconds",
        "operation" => operation,
        "size_bucket" => size_bucket(size)
    )
    .record(duration_secs);
}

fn size_bucket(size: usize) -> &'static str {
    match size {
        0..=10 => "1-10",
        11..=100 => "11-100",
        101..=1000 => "101-1000",
        _ => "1000+",
    }
}
