//! 功能回调结果：标签化的成功/失败，替代异常控制流

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::error::PageFeatError;

/// 失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 回调返回了错误
    Failed,
    /// 回调发生panic
    Panicked,
    /// 回调任务被取消
    Aborted,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Failed => write!(f, "failed"),
            FailureKind::Panicked => write!(f, "panicked"),
            FailureKind::Aborted => write!(f, "aborted"),
        }
    }
}

/// 回调失败详情
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl FeatureFailure {
    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Failed,
            detail: detail.into(),
        }
    }

    pub fn panicked(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Panicked,
            detail: detail.into(),
        }
    }

    pub fn aborted(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Aborted,
            detail: detail.into(),
        }
    }

    /// 从任意可显示错误构造
    pub fn from_error(err: &impl Display) -> Self {
        Self::failed(err.to_string())
    }
}

impl Display for FeatureFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl From<String> for FeatureFailure {
    fn from(detail: String) -> Self {
        Self::failed(detail)
    }
}

impl From<&str> for FeatureFailure {
    fn from(detail: &str) -> Self {
        Self::failed(detail)
    }
}

impl From<PageFeatError> for FeatureFailure {
    fn from(err: PageFeatError) -> Self {
        Self::from_error(&err)
    }
}

/// 功能回调结果
pub type FeatureOutcome = Result<(), FeatureFailure>;
