//! 全局调度配置管理，存储所有可配置项

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::FeatResult;

/// 轮询间隔下限
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);
/// 轮询间隔上限
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// 调度配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// 地址轮询间隔（毫秒），运行时会被夹到 [MIN_POLL_INTERVAL, MAX_POLL_INTERVAL]
    pub poll_interval_ms: u64,
    /// 变更信号去抖窗口（毫秒）
    pub debounce_ms: u64,
    /// 每个功能保留的性能记录条数
    pub history_capacity: usize,
    /// 连续失败达到该值即判定为不健康
    pub failure_threshold: u32,
    /// 慢操作告警阈值（毫秒）
    pub slow_operation_ms: u64,
    /// 变更信号通道容量
    pub signal_buffer: usize,
    /// 结构变更过滤规则
    pub mutation_filter: MutationFilterConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            debounce_ms: 100,
            history_capacity: 20,
            failure_threshold: 1,
            slow_operation_ms: 1000,
            signal_buffer: 64,
            mutation_filter: MutationFilterConfig::default(),
        }
    }
}

impl DispatchConfig {
    /// 从JSON文本加载配置，缺省字段取默认值
    pub fn from_json_str(text: &str) -> FeatResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// 实际生效的轮询间隔（已夹取边界）
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn slow_operation_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_operation_ms)
    }
}

/// 结构变更噪声过滤配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationFilterConfig {
    /// 目标节点ID带这些前缀的变更一律忽略（功能自身注入的节点）
    pub ignored_id_prefixes: Vec<String>,
    /// 忽略这些属性上的变更
    pub ignored_attributes: Vec<String>,
    /// 是否忽略纯文本变更
    pub ignore_character_data: bool,
}

impl Default for MutationFilterConfig {
    fn default() -> Self {
        Self {
            ignored_id_prefixes: vec!["pagefeat-".to_string()],
            ignored_attributes: vec!["style".to_string(), "class".to_string()],
            ignore_character_data: true,
        }
    }
}

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RetryPolicy {
    /// 不重试
    #[default]
    Never,
    /// 固定次数重试（不含第一次）
    Times(u8),
}

impl RetryPolicy {
    /// 最大重试次数
    pub fn max_retries(&self) -> usize {
        match self {
            RetryPolicy::Never => 0,
            RetryPolicy::Times(n) => *n as usize,
        }
    }
}

/// 配置构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: DispatchConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn debounce(mut self, window: Duration) -> Self {
        self.config.debounce_ms = window.as_millis() as u64;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity.max(1);
        self
    }

    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold.max(1);
        self
    }

    pub fn slow_operation_threshold(mut self, threshold: Duration) -> Self {
        self.config.slow_operation_ms = threshold.as_millis() as u64;
        self
    }

    pub fn signal_buffer(mut self, capacity: usize) -> Self {
        self.config.signal_buffer = capacity.max(1);
        self
    }

    pub fn mutation_filter(mut self, filter: MutationFilterConfig) -> Self {
        self.config.mutation_filter = filter;
        self
    }

    pub fn build(self) -> DispatchConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = DispatchConfig::from_json_str(r#"{"poll_interval_ms": 250, "mutation_filter": {"ignore_character_data": false}}"#).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.history_capacity, 20);
        assert!(!config.mutation_filter.ignore_character_data);
        assert_eq!(config.mutation_filter.ignored_id_prefixes, vec!["pagefeat-".to_string()]);
    }

    #[test]
    fn test_poll_interval_is_clamped() {
        let fast = CustomConfigBuilder::new().poll_interval(Duration::from_millis(1)).build();
        assert_eq!(fast.poll_interval(), MIN_POLL_INTERVAL);
        let slow = CustomConfigBuilder::new().poll_interval(Duration::from_secs(3600)).build();
        assert_eq!(slow.poll_interval(), MAX_POLL_INTERVAL);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(DispatchConfig::from_json_str("{not json").is_err());
    }
}
