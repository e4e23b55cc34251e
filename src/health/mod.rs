pub mod reporter;
pub mod tracker;

pub use reporter::{FeatureMetrics, HealthReporter, HealthStatus, MetricsDump};
pub use tracker::{Operation, PerformanceRecord, PerformanceTracker};
