//! Observability: structured logs and query counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No async or background threads
//! 3. Deterministic output
//! 4. Logs go to stderr, never mixed with command output
//!
//! ```ignore
//! use skyquery::observability::{Logger, QueryMetrics, ObservationScope};
//!
//! Logger::info("CONVERT_COMPLETE", &[("rows", "42")]);
//!
//! let metrics = QueryMetrics::new();
//! metrics.increment_queries_executed();
//!
//! let scope = ObservationScope::new("QUERY");
//! scope.complete();
//! ```

mod logger;
mod metrics;
mod scope;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, QueryMetrics};
pub use scope::ObservationScope;
