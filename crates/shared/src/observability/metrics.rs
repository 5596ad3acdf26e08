//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。
//! 未安装 recorder 时，下面的记录函数都是空操作。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(service_name: &str, config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册奖励相关指标的描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        "reward_checks_total",
        "Total number of condition checks, labelled by terminal outcome"
    );
    metrics::describe_histogram!(
        "reward_check_duration_seconds",
        "Condition check duration in seconds"
    );
    metrics::describe_counter!(
        "reward_evaluations_total",
        "Total number of reward predicate evaluations"
    );
    metrics::describe_counter!("reward_awards_total", "Total number of rewards awarded");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
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
// 便捷的指标记录函数
// ============================================================================

/// 记录一次条件检查
#[inline]
pub fn record_reward_check(outcome: &str, duration_secs: f64) {
    metrics::counter!("reward_checks_total", "outcome" => outcome.to_string()).increment(1);
    metrics::histogram!("reward_check_duration_seconds", "outcome" => outcome.to_string())
        .record(duration_secs);
}

/// 记录一次谓词评估
#[inline]
pub fn record_reward_evaluation(conditional: &str, satisfied: bool) {
    metrics::counter!(
        "reward_evaluations_total",
        "conditional" => conditional.to_string(),
        "result" => satisfied.to_string()
    )
    .increment(1);
}

/// 记录一次奖励发放
#[inline]
pub fn record_reward_award(rid: &str) {
    metrics::counter!("reward_awards_total", "rid" => rid.to_string()).increment(1);
}
