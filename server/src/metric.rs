use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderMap;
use chrono::Local;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::utils::{append_metric_to_csv, sample_proc_memory_mb};

pub const CLIENT_LATENCY_HEADER: &str = "x-client-latency-ms";
/// Entries kept in memory; older ones only survive in the CSV file.
pub const DEFAULT_METRICS_CAPACITY: usize = 1000;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Metric {
    pub timestamp: String,
    pub operation: String,
    pub execution_time_ms: f64,
    pub memory_mb: f64,
    pub network_latency_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Page,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Page => "PAGE",
            Operation::Get => "GET",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

/// In-flight measurement, finished with [`MetricsLog::record`].
pub struct Sample {
    operation: Operation,
    started: Instant,
    mem_before: f64,
    network_latency_ms: f64,
}

impl Sample {
    pub fn start(operation: Operation, headers: &HeaderMap) -> Self {
        Self {
            operation,
            started: Instant::now(),
            mem_before: sample_proc_memory_mb(),
            network_latency_ms: client_latency_ms(headers),
        }
    }
}

fn client_latency_ms(headers: &HeaderMap) -> f64 {
    headers
        .get(CLIENT_LATENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[derive(Clone)]
pub struct MetricsLog {
    entries: Arc<Mutex<VecDeque<Metric>>>,
    capacity: usize,
    csv_path: Option<PathBuf>,
}

impl Default for MetricsLog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MetricsLog {
    pub fn new(csv_path: Option<PathBuf>) -> Self {
        Self::with_capacity(csv_path, DEFAULT_METRICS_CAPACITY)
    }

    pub fn with_capacity(csv_path: Option<PathBuf>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
            csv_path,
        }
    }

    pub fn record(&self, sample: Sample) -> Metric {
        let execution_time_ms = sample.started.elapsed().as_secs_f64() * 1000.0;
        let metric = Metric {
            timestamp: Local::now().to_rfc3339(),
            operation: sample.operation.as_str().to_string(),
            execution_time_ms,
            memory_mb: sample_proc_memory_mb() - sample.mem_before,
            network_latency_ms: sample.network_latency_ms,
        };
        tracing::debug!(
            operation = %metric.operation,
            execution_time_ms = metric.execution_time_ms,
            "operation recorded"
        );
        {
            let mut entries = self.entries.lock();
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(metric.clone());
        }
        if let Some(path) = &self.csv_path {
            if let Err(err) = append_metric_to_csv(path, &metric) {
                tracing::warn!(path = %path.display(), error = %err, "failed to append metric");
            }
        }
        metric
    }

    /// Most recent entries, oldest first. At most the log's capacity.
    pub fn snapshot(&self) -> Vec<Metric> {
        self.entries.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_header_is_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_LATENCY_HEADER, "12.5".parse().unwrap());
        assert_eq!(client_latency_ms(&headers), 12.5);

        headers.insert(CLIENT_LATENCY_HEADER, "soon".parse().unwrap());
        assert_eq!(client_latency_ms(&headers), 0.0);
    }

    #[test]
    fn record_appends_to_log() {
        let log = MetricsLog::new(None);
        let sample = Sample::start(Operation::Create, &HeaderMap::new());
        let metric = log.record(sample);

        assert_eq!(metric.operation, "CREATE");
        let entries = log.snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, "CREATE");
    }

    #[test]
    fn log_keeps_only_latest_entries() {
        let log = MetricsLog::with_capacity(None, 3);
        let ops = [
            Operation::Create,
            Operation::Get,
            Operation::Update,
            Operation::Page,
            Operation::Delete,
        ];
        for op in ops {
            log.record(Sample::start(op, &HeaderMap::new()));
        }

        let kept: Vec<String> = log.snapshot().into_iter().map(|m| m.operation).collect();
        assert_eq!(kept, ["UPDATE", "PAGE", "DELETE"]);
    }
}
