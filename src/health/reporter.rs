//! 健康上报：为每次 init/cleanup 计时，累计错误并输出快照

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::config::DispatchConfig;
use crate::error::FeatResult;
use crate::feature::FeatureOutcome;
use crate::health::tracker::{Operation, PerformanceRecord, PerformanceTracker};
use crate::lifecycle::FeatureState;
use crate::utils::epoch_ms;

/// 功能健康视图（只读派生）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub feature_name: String,
    pub is_healthy: bool,
    pub last_error: Option<String>,
    /// 最近耗时（毫秒，旧 -> 新）
    pub last_durations: Vec<f64>,
    pub error_count: u64,
    pub consecutive_failures: u32,
    pub state: FeatureState,
}

/// 单功能指标导出
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMetrics {
    pub records: Vec<PerformanceRecord>,
    pub error_count: u64,
    pub last_error: Option<String>,
    pub last_error_at: Option<u64>,
    pub avg_duration_ms: f64,
    pub max_duration_ms: f64,
}

/// 指标全量导出
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsDump {
    pub generated_at: u64,
    pub features: BTreeMap<String, FeatureMetrics>,
}

#[derive(Debug, Default, Clone)]
struct FeatureHealth {
    error_count: u64,
    consecutive_failures: u32,
    last_error: Option<String>,
    last_error_at: Option<u64>,
}

#[derive(Debug)]
struct HealthInner {
    tracker: PerformanceTracker,
    features: FxHashMap<String, FeatureHealth>,
}

/// 健康上报器
#[derive(Debug)]
pub struct HealthReporter {
    inner: Mutex<HealthInner>,
    failure_threshold: u32,
    slow_threshold: Duration,
}

impl HealthReporter {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            inner: Mutex::new(HealthInner {
                tracker: PerformanceTracker::new(config.history_capacity),
                features: FxHashMap::default(),
            }),
            failure_threshold: config.failure_threshold.max(1),
            slow_threshold: config.slow_operation_threshold(),
        }
    }

    /// 执行并计时一次回调，原样返回回调结果
    pub async fn measure<F>(&self, feature: &str, operation: Operation, fut: F) -> FeatureOutcome
    where
        F: Future<Output = FeatureOutcome>,
    {
        let start = Instant::now();
        let outcome = fut.await;
        self.record(feature, operation, start.elapsed(), &outcome);
        outcome
    }

    /// 记录一次操作结果
    pub fn record(&self, feature: &str, operation: Operation, elapsed: Duration, outcome: &FeatureOutcome) {
        if elapsed >= self.slow_threshold {
            warn!(
                "功能 [{}] {} 耗时 {:?}，超过慢操作阈值 {:?}",
                feature, operation, elapsed, self.slow_threshold
            );
        }

        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let health = inner.features.entry(feature.to_string()).or_default();
        match outcome {
            Ok(()) => health.consecutive_failures = 0,
            Err(failure) => {
                health.error_count += 1;
                health.consecutive_failures = health.consecutive_failures.saturating_add(1);
                health.last_error = Some(failure.to_string());
                health.last_error_at = Some(epoch_ms());
            }
        }
        let error_count = health.error_count;

        inner.tracker.record(PerformanceRecord {
            feature_name: feature.to_string(),
            operation,
            duration_ms: elapsed.as_secs_f64() * 1000.0,
            timestamp: epoch_ms(),
            error_count,
            succeeded: outcome.is_ok(),
        });
        debug!("功能 [{}] {} 完成，耗时 {:?}，成功={}", feature, operation, elapsed, outcome.is_ok());
    }

    /// 已有记录的功能的健康视图；state 由调用方补全
    pub fn get_status(&self) -> BTreeMap<String, HealthStatus> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .features
            .iter()
            .map(|(name, health)| (name.clone(), self.status_of(&inner, name, health)))
            .collect()
    }

    /// 单个功能的健康视图，无记录时视为健康
    pub fn status(&self, feature: &str) -> HealthStatus {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let health = inner.features.get(feature).cloned().unwrap_or_default();
        self.status_of(&inner, feature, &health)
    }

    fn status_of(&self, inner: &HealthInner, name: &str, health: &FeatureHealth) -> HealthStatus {
        HealthStatus {
            feature_name: name.to_string(),
            is_healthy: health.consecutive_failures < self.failure_threshold,
            last_error: health.last_error.clone(),
            last_durations: inner.tracker.recent_durations(name),
            error_count: health.error_count,
            consecutive_failures: health.consecutive_failures,
            state: FeatureState::default(),
        }
    }

    pub fn history(&self, feature: &str) -> Vec<PerformanceRecord> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.tracker.history(feature)
    }

    /// 原始指标导出
    pub fn metrics_dump(&self) -> MetricsDump {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let features = inner
            .tracker
            .dump()
            .into_iter()
            .map(|(name, records)| {
                let health = inner.features.get(&name).cloned().unwrap_or_default();
                let max_duration_ms = records.iter().map(|r| r.duration_ms).fold(0.0, f64::max);
                let avg_duration_ms = if records.is_empty() {
                    0.0
                } else {
                    records.iter().map(|r| r.duration_ms).sum::<f64>() / records.len() as f64
                };
                let metrics = FeatureMetrics {
                    records,
                    error_count: health.error_count,
                    last_error: health.last_error,
                    last_error_at: health.last_error_at,
                    avg_duration_ms,
                    max_duration_ms,
                };
                (name, metrics)
            })
            .collect();
        MetricsDump {
            generated_at: epoch_ms(),
            features,
        }
    }

    pub fn to_json(&self) -> FeatResult<String> {
        Ok(serde_json::to_string_pretty(&self.metrics_dump())?)
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.tracker.clear();
        inner.features.clear();
    }
}
