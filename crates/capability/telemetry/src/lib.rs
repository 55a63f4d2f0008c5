//! 追踪初始化与轮询周期指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 基础指标快照（MVP）。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub frames_decoded: u64,
    pub cycles_completed: u64,
    pub publish_success: u64,
    pub publish_failure: u64,
    pub decode_failures: u64,
    pub reconnects: u64,
    pub cycle_latency_ms_total: u64,
    pub cycle_latency_ms_count: u64,
}

/// 基础指标（MVP）。
pub struct TelemetryMetrics {
    frames_decoded: AtomicU64,
    cycles_completed: AtomicU64,
    publish_success: AtomicU64,
    publish_failure: AtomicU64,
    decode_failures: AtomicU64,
    reconnects: AtomicU64,
    cycle_latency_ms_total: AtomicU64,
    cycle_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            frames_decoded: AtomicU64::new(0),
            cycles_completed: AtomicU64::new(0),
            publish_success: AtomicU64::new(0),
            publish_failure: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
            cycle_latency_ms_total: AtomicU64::new(0),
            cycle_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            publish_success: self.publish_success.load(Ordering::Relaxed),
            publish_failure: self.publish_failure.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            cycle_latency_ms_total: self.cycle_latency_ms_total.load(Ordering::Relaxed),
            cycle_latency_ms_count: self.cycle_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例（MVP）。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 记录解码成功的帧数。
pub fn record_frame_decoded() {
    metrics().frames_decoded.fetch_add(1, Ordering::Relaxed);
}

/// 记录完整轮询周期（解码到发布全部成功）次数。
pub fn record_cycle_completed() {
    metrics().cycles_completed.fetch_add(1, Ordering::Relaxed);
}

/// 记录发布成功次数。
pub fn record_publish_success() {
    metrics().publish_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录发布失败次数。
pub fn record_publish_failure() {
    metrics().publish_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录帧解码失败次数。
pub fn record_decode_failure() {
    metrics().decode_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录重连次数。
pub fn record_reconnect() {
    metrics().reconnects.fetch_add(1, Ordering::Relaxed);
}

/// 记录单周期耗时（毫秒，从帧解码完成到发布确认）。
pub fn record_cycle_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .cycle_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .cycle_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 输出当前指标汇总日志（会话结束时调用）。
pub fn log_metrics_summary() {
    let snapshot = metrics().snapshot();
    tracing::info!(
        target: "smx.telemetry",
        frames_decoded = snapshot.frames_decoded,
        cycles_completed = snapshot.cycles_completed,
        publish_success = snapshot.publish_success,
        publish_failure = snapshot.publish_failure,
        decode_failures = snapshot.decode_failures,
        reconnects = snapshot.reconnects,
        cycle_latency_ms_total = snapshot.cycle_latency_ms_total,
        cycle_latency_ms_count = snapshot.cycle_latency_ms_count,
        "session metrics summary"
    );
}
