//! 匹配上下文：传给功能 init 回调的匹配信息

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 匹配上下文
/// 携带初始化时的扫描代数，功能在自身的 await 点之后可用 `is_stale()`
/// 判断期间是否已经发生导航，从而跳过对共享状态的写入
#[derive(Debug, Clone)]
pub struct MatchContext {
    feature_name: String,
    url: String,
    captures: Vec<String>,
    specificity: i64,
    generation: u64,
    generation_counter: Arc<AtomicU64>,
}

impl MatchContext {
    pub(crate) fn new(
        feature_name: impl Into<String>,
        url: impl Into<String>,
        captures: Vec<String>,
        specificity: i64,
        generation_counter: Arc<AtomicU64>,
    ) -> Self {
        let generation = generation_counter.load(Ordering::SeqCst);
        Self {
            feature_name: feature_name.into(),
            url: url.into(),
            captures,
            specificity,
            generation,
            generation_counter,
        }
    }

    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 有序捕获组
    pub fn captures(&self) -> &[String] {
        &self.captures
    }

    /// 第 index 个捕获组（从0开始）
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(String::as_str)
    }

    pub fn specificity(&self) -> i64 {
        self.specificity
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 初始化之后是否已经发生过导航
    pub fn is_stale(&self) -> bool {
        self.generation_counter.load(Ordering::SeqCst) != self.generation
    }
}
