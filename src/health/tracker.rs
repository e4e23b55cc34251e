//! 性能记录：每个功能保留最近 N 条，超出淘汰最旧的

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt::{Display, Formatter};
use std::time::Duration;

use rustc_hash::FxHashMap;

/// 被计时的生命周期操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Init,
    Cleanup,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Init => f.write_str("init"),
            Operation::Cleanup => f.write_str("cleanup"),
        }
    }
}

/// 单条性能记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub feature_name: String,
    pub operation: Operation,
    pub duration_ms: f64,
    /// Unix 毫秒
    pub timestamp: u64,
    /// 记录时该功能的累计错误数
    pub error_count: u64,
    pub succeeded: bool,
}

impl PerformanceRecord {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_ms.max(0.0) / 1000.0)
    }
}

/// 有界性能历史
#[derive(Debug)]
pub struct PerformanceTracker {
    capacity: usize,
    records: FxHashMap<String, VecDeque<PerformanceRecord>>,
}

impl PerformanceTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: FxHashMap::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, record: PerformanceRecord) {
        let history = self
            .records
            .entry(record.feature_name.clone())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        if history.len() == self.capacity {
            history.pop_front();
        }
        history.push_back(record);
    }

    /// 某功能的记录（旧 -> 新）
    pub fn history(&self, feature: &str) -> Vec<PerformanceRecord> {
        self.records
            .get(feature)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 最近的耗时（毫秒，旧 -> 新）
    pub fn recent_durations(&self, feature: &str) -> Vec<f64> {
        self.records
            .get(feature)
            .map(|h| h.iter().map(|r| r.duration_ms).collect())
            .unwrap_or_default()
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// 全量导出，按功能名排序
    pub fn dump(&self) -> BTreeMap<String, Vec<PerformanceRecord>> {
        self.records
            .iter()
            .map(|(name, h)| (name.clone(), h.iter().cloned().collect()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
