//! Monitoring - system and application metrics
//!
//! Receives `(method, endpoint, status, duration)` request events and
//! `(predicted_class, inference_latency)` prediction events into Prometheus
//! collectors on a private registry. System figures come from sysinfo, are
//! cached for a few seconds and mirrored into gauges.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use prometheus::core::Collector;
use prometheus::{
    proto, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use serde::Serialize;
use sysinfo::{Disks, System};

const SYSTEM_CACHE_TTL: Duration = Duration::from_secs(5);

const EFFECTIVE: &str = "effective";
const NOT_EFFECTIVE: &str = "not_effective";

// ============================================================================
// DATA STRUCTURES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    pub cpu_usage_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub memory_available_bytes: u64,
    pub memory_usage_percent: f32,
    pub disk_total_bytes: u64,
    pub disk_used_bytes: u64,
    pub disk_usage_percent: f32,
    pub process_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointMetrics {
    pub method: String,
    pub endpoint: String,
    pub status_code: u16,
    pub count: u64,
    /// Seconds, averaged over every status of this method and endpoint
    pub average_duration: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionCounts {
    pub effective: u64,
    pub not_effective: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationMetrics {
    pub total_requests: u64,
    pub total_predictions: u64,
    pub predictions: PredictionCounts,
    /// Seconds
    pub average_request_duration: f64,
    /// Seconds
    pub average_inference_time: f64,
    pub requests_by_endpoint: Vec<EndpointMetrics>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub system: SystemMetrics,
    pub application: ApplicationMetrics,
    pub status: &'static str,
    pub last_updated: DateTime<Utc>,
}

struct SystemSampler {
    sys: System,
    disks: Disks,
    cached: Option<(Instant, SystemMetrics)>,
}

impl SystemSampler {
    fn sample(&mut self) -> (SystemMetrics, bool) {
        if let Some((at, metrics)) = &self.cached {
            if at.elapsed() < SYSTEM_CACHE_TTL {
                return (metrics.clone(), false);
            }
        }

        self.sys.refresh_cpu();
        self.sys.refresh_memory();
        self.sys.refresh_processes();
        self.disks.refresh_list();

        let memory_total = self.sys.total_memory();
        let memory_used = self.sys.used_memory();
        let disk_total: u64 = self.disks.list().iter().map(|d| d.total_space()).sum();
        let disk_free: u64 = self.disks.list().iter().map(|d| d.available_space()).sum();
        let disk_used = disk_total.saturating_sub(disk_free);

        let metrics = SystemMetrics {
            cpu_usage_percent: self.sys.global_cpu_info().cpu_usage(),
            memory_used_bytes: memory_used,
            memory_total_bytes: memory_total,
            memory_available_bytes: self.sys.available_memory(),
            memory_usage_percent: percent(memory_used, memory_total),
            disk_total_bytes: disk_total,
            disk_used_bytes: disk_used,
            disk_usage_percent: percent(disk_used, disk_total),
            process_count: self.sys.processes().len(),
            timestamp: Utc::now(),
        };

        self.cached = Some((Instant::now(), metrics.clone()));
        (metrics, true)
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64 * 100.0) as f32
    }
}

fn label<'a>(metric: &'a proto::Metric, name: &str) -> &'a str {
    metric
        .get_label()
        .iter()
        .find(|pair| pair.get_name() == name)
        .map_or("", |pair| pair.get_value())
}

fn average(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ============================================================================
// COLLECTOR
// ============================================================================

pub struct MetricsCollector {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    predictions_total: IntCounterVec,
    inference_seconds: Histogram,
    cpu_usage: Gauge,
    memory_usage: Gauge,
    disk_usage: Gauge,
    system: Mutex<SystemSampler>,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "endpoint", "status_code"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let predictions_total = IntCounterVec::new(
            Opts::new("ml_predictions_total", "Total ML predictions made"),
            &["prediction_result"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let inference_seconds = Histogram::with_opts(
            HistogramOpts::new("ml_model_inference_seconds", "Time taken for model inference")
                .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        )?;
        registry.register(Box::new(inference_seconds.clone()))?;

        let cpu_usage = Gauge::new("container_cpu_usage_percent", "CPU usage percentage")?;
        registry.register(Box::new(cpu_usage.clone()))?;
        let memory_usage = Gauge::new("container_memory_usage_bytes", "Memory usage in bytes")?;
        registry.register(Box::new(memory_usage.clone()))?;
        let disk_usage = Gauge::new("container_disk_usage_percent", "Disk usage percentage")?;
        registry.register(Box::new(disk_usage.clone()))?;

        let mut sys = System::new_all();
        sys.refresh_all();

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            predictions_total,
            inference_seconds,
            cpu_usage,
            memory_usage,
            disk_usage,
            system: Mutex::new(SystemSampler {
                sys,
                disks: Disks::new_with_refreshed_list(),
                cached: None,
            }),
        })
    }

    pub fn record_request(&self, method: &str, endpoint: &str, status_code: u16, duration: Duration) {
        let status = status_code.to_string();
        self.requests_total
            .with_label_values(&[method, endpoint, &status])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[method, endpoint])
            .observe(duration.as_secs_f64());
    }

    pub fn record_prediction(&self, predicted_class: u8, inference_time: Duration) {
        let result = if predicted_class == 1 { EFFECTIVE } else { NOT_EFFECTIVE };
        self.predictions_total.with_label_values(&[result]).inc();
        self.inference_seconds.observe(inference_time.as_secs_f64());
    }

    /// Blocks while sysinfo refreshes; call from a blocking context
    pub fn system_metrics(&self) -> SystemMetrics {
        let (metrics, fresh) = self.system.lock().sample();
        if fresh {
            self.cpu_usage.set(f64::from(metrics.cpu_usage_percent));
            self.memory_usage.set(metrics.memory_used_bytes as f64);
            self.disk_usage.set(f64::from(metrics.disk_usage_percent));
        }
        metrics
    }

    pub fn application_metrics(&self) -> ApplicationMetrics {
        let mut total_duration = 0.0;
        let mut timed_requests = 0u64;
        for family in self.request_duration_seconds.collect() {
            for metric in family.get_metric() {
                let histogram = metric.get_histogram();
                total_duration += histogram.get_sample_sum();
                timed_requests += histogram.get_sample_count();
            }
        }

        let mut total_requests = 0u64;
        let mut requests_by_endpoint = Vec::new();
        for family in self.requests_total.collect() {
            for metric in family.get_metric() {
                let method = label(metric, "method");
                let endpoint = label(metric, "endpoint");
                let count = metric.get_counter().get_value() as u64;
                total_requests += count;

                let average_duration = self
                    .request_duration_seconds
                    .get_metric_with_label_values(&[method, endpoint])
                    .map_or(0.0, |h| average(h.get_sample_sum(), h.get_sample_count()));

                requests_by_endpoint.push(EndpointMetrics {
                    method: method.to_string(),
                    endpoint: endpoint.to_string(),
                    status_code: label(metric, "status_code").parse().unwrap_or_default(),
                    count,
                    average_duration,
                });
            }
        }
        requests_by_endpoint.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.endpoint.cmp(&b.endpoint)));

        let effective = self.predictions_total.with_label_values(&[EFFECTIVE]).get();
        let not_effective = self.predictions_total.with_label_values(&[NOT_EFFECTIVE]).get();

        ApplicationMetrics {
            total_requests,
            total_predictions: effective + not_effective,
            predictions: PredictionCounts {
                effective,
                not_effective,
            },
            average_request_duration: average(total_duration, timed_requests),
            average_inference_time: average(
                self.inference_seconds.get_sample_sum(),
                self.inference_seconds.get_sample_count(),
            ),
            requests_by_endpoint,
            timestamp: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            system: self.system_metrics(),
            application: self.application_metrics(),
            status: "healthy",
            last_updated: Utc::now(),
        }
    }

    /// Render every collector in the Prometheus text exposition format
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
