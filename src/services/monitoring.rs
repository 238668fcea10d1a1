/*
 * Responsibility
 * - Process-wide metrics registry: request duration histogram, request
 *   counter, error counter (prometheus text exposition)
 * - Baseline process stats (uptime / memory / CPU) as a separate read path
 */
use std::time::Instant;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Fixed histogram buckets for request latency, in seconds.
pub const DURATION_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0];

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),

    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
}

impl Outcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            0..=399 => Self::Success,
            400..=499 => Self::ClientError,
            _ => Self::ServerError,
        }
    }

    /// `error_type` label value; `None` for successful requests.
    pub fn error_type(self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::ClientError => Some("client_error"),
            Self::ServerError => Some("server_error"),
        }
    }
}

/// One finished request, consumed immediately into the aggregates.
#[derive(Debug)]
pub struct MetricSample {
    pub method: String,
    /// Declared route template, never the raw URL.
    pub route: &'static str,
    pub status_code: u16,
    pub duration_seconds: f64,
}

/// Shared metrics state. Instruments are internally atomic, so `record` is
/// lock-free and never suspends; `render` may run concurrently with it.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    request_duration: HistogramVec,
    request_counter: IntCounterVec,
    error_counter: IntCounterVec,
    started_at: Instant,
}

impl Metrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route", "status_code"],
        )?;

        let request_counter = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status_code"],
        )?;

        let error_counter = IntCounterVec::new(
            Opts::new(
                "http_request_errors_total",
                "Total number of HTTP request errors",
            ),
            &["method", "route", "status_code", "error_type"],
        )?;

        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(request_counter.clone()))?;
        registry.register(Box::new(error_counter.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            request_duration,
            request_counter,
            error_counter,
            started_at: Instant::now(),
        })
    }

    /// Record one finished request. Never fails visibly; label lookup errors
    /// are logged and swallowed so the already-sent response is unaffected.
    pub fn record(&self, sample: &MetricSample) {
        let status = sample.status_code.to_string();
        let labels = [sample.method.as_str(), sample.route, status.as_str()];

        match self.request_duration.get_metric_with_label_values(&labels) {
            Ok(histogram) => histogram.observe(sample.duration_seconds),
            Err(e) => error!(error = %e, "failed to record request duration"),
        }

        match self.request_counter.get_metric_with_label_values(&labels) {
            Ok(counter) => counter.inc(),
            Err(e) => error!(error = %e, "failed to record request count"),
        }

        if let Some(error_type) = Outcome::from_status(sample.status_code).error_type() {
            let labels = [
                sample.method.as_str(),
                sample.route,
                status.as_str(),
                error_type,
            ];
            match self.error_counter.get_metric_with_label_values(&labels) {
                Ok(counter) => counter.inc(),
                Err(e) => error!(error = %e, "failed to record request error"),
            }
        }
    }

    /// Current aggregate state in Prometheus text exposition format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

/// Snapshot for `GET /monitoring/stats`, read directly from the process,
/// not routed through the prometheus instruments.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStats {
    pub uptime: f64,
    pub memory_usage: MemoryUsage,
    pub cpu_usage: CpuUsage,
    pub timestamp: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss_bytes: u64,
    pub virtual_bytes: u64,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    pub user_seconds: f64,
    pub system_seconds: f64,
}

impl ProcessStats {
    pub fn collect(uptime: f64) -> Self {
        Self {
            uptime,
            memory_usage: read_memory().unwrap_or_default(),
            cpu_usage: read_cpu().unwrap_or_default(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// `/proc/self/statm`: total program size and resident set, in pages.
#[cfg(target_os = "linux")]
fn read_memory() -> Option<MemoryUsage> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let mut fields = statm.split_whitespace();
    let virtual_pages: u64 = fields.next()?.parse().ok()?;
    let rss_pages: u64 = fields.next()?.parse().ok()?;
    let page_size = 4096;
    Some(MemoryUsage {
        rss_bytes: rss_pages * page_size,
        virtual_bytes: virtual_pages * page_size,
    })
}

/// `/proc/self/stat`: utime and stime are fields 14 and 15 (1-based),
/// in clock ticks.
#[cfg(target_os = "linux")]
fn read_cpu() -> Option<CpuUsage> {
    let stat = std::fs::read_to_string("/proc/self/stat").ok()?;
    // The comm field (2) may contain spaces; skip past the closing paren.
    let rest = stat.rsplit_once(')')?.1;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let utime: f64 = fields.get(11)?.parse().ok()?;
    let stime: f64 = fields.get(12)?.parse().ok()?;
    let ticks_per_second = 100.0;
    Some(CpuUsage {
        user_seconds: utime / ticks_per_second,
        system_seconds: stime / ticks_per_second,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_memory() -> Option<MemoryUsage> {
    None
}

#[cfg(not(target_os = "linux"))]
fn read_cpu() -> Option<CpuUsage> {
    None
}
