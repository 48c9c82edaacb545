//! Query counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Relaxed atomics; values are exact once the queries they count return

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the query service
#[derive(Debug, Default)]
pub struct QueryMetrics {
    queries_executed: AtomicU64,
    queries_failed: AtomicU64,
    rows_scanned: AtomicU64,
    rows_emitted: AtomicU64,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_scanned(&self, rows: u64) {
        self.rows_scanned.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn add_rows_emitted(&self, rows: u64) {
        self.rows_emitted.fetch_add(rows, Ordering::Relaxed);
    }

    /// Counters as JSON
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"queries_executed":{},"queries_failed":{},"rows_scanned":{},"rows_emitted":{}}}"#,
            s.queries_executed, s.queries_failed, s.rows_scanned, s.rows_emitted,
        )
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
            rows_scanned: self.rows_scanned.load(Ordering::Relaxed),
            rows_emitted: self.rows_emitted.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_failed: u64,
    pub rows_scanned: u64,
    pub rows_emitted: u64,
}
