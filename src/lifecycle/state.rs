//! 功能生命周期状态机 + 活跃功能集合

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;

use crate::error::{FeatResult, PageFeatError};
use crate::utils::epoch_ms;

/// 功能生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureState {
    #[default]
    Inactive,
    Initializing,
    Active,
    Deactivating,
    Error,
}

impl FeatureState {
    /// 合法转换：
    /// Inactive -> Initializing -> Active -> Deactivating -> Inactive
    /// Initializing -> Error -> Deactivating
    /// Initializing -> Deactivating 仅用于清理被放弃的初始化
    pub fn can_transition_to(self, next: FeatureState) -> bool {
        use FeatureState::*;
        matches!(
            (self, next),
            (Inactive, Initializing)
                | (Initializing, Active)
                | (Initializing, Error)
                | (Initializing, Deactivating)
                | (Active, Deactivating)
                | (Error, Deactivating)
                | (Deactivating, Inactive)
        )
    }

    /// 导航时需要清理的状态
    pub fn needs_cleanup(self) -> bool {
        matches!(
            self,
            FeatureState::Initializing | FeatureState::Active | FeatureState::Error
        )
    }
}

impl Display for FeatureState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FeatureState::Inactive => "inactive",
            FeatureState::Initializing => "initializing",
            FeatureState::Active => "active",
            FeatureState::Deactivating => "deactivating",
            FeatureState::Error => "error",
        };
        f.write_str(s)
    }
}

/// 单个功能的运行记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureEntry {
    pub state: FeatureState,
    /// 进入 Active 的时间（Unix 毫秒）
    pub activated_at_ms: Option<u64>,
    /// 进入 Initializing 的先后序号，清理时逆序
    pub activation_seq: u64,
    /// 初始化时的扫描代数
    pub generation: u64,
}

/// 活跃功能集合，仅由生命周期控制器持有和修改
/// Inactive 的功能不在集合中
#[derive(Debug, Default)]
pub struct ActiveFeatureSet {
    entries: FxHashMap<String, FeatureEntry>,
    next_seq: u64,
}

impl ActiveFeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, name: &str) -> FeatureState {
        self.entries.get(name).map(|e| e.state).unwrap_or_default()
    }

    pub fn entry(&self, name: &str) -> Option<&FeatureEntry> {
        self.entries.get(name)
    }

    /// 执行一次状态转换，非法转换返回 InvalidStateTransition 且不修改集合
    pub fn transition(&mut self, name: &str, to: FeatureState, generation: u64) -> FeatResult<()> {
        let from = self.state_of(name);
        if !from.can_transition_to(to) {
            return Err(PageFeatError::InvalidStateTransition {
                feature: name.to_string(),
                from,
                to,
            });
        }

        match to {
            FeatureState::Inactive => {
                self.entries.remove(name);
            }
            FeatureState::Initializing => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.entries.insert(
                    name.to_string(),
                    FeatureEntry {
                        state: to,
                        activated_at_ms: None,
                        activation_seq: seq,
                        generation,
                    },
                );
            }
            _ => {
                if let Some(entry) = self.entries.get_mut(name) {
                    entry.state = to;
                    if to == FeatureState::Active {
                        entry.activated_at_ms = Some(epoch_ms());
                    }
                }
            }
        }
        Ok(())
    }

    /// 处于 Active 的功能名称
    pub fn active_names(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|(_, e)| e.state == FeatureState::Active)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// 需要清理的功能，按激活顺序逆序
    pub fn teardown_order(&self) -> Vec<String> {
        let mut pending: Vec<(&String, u64)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.state.needs_cleanup())
            .map(|(name, e)| (name, e.activation_seq))
            .collect();
        pending.sort_by(|a, b| b.1.cmp(&a.1));
        pending.into_iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn snapshot(&self) -> BTreeMap<String, FeatureEntry> {
        self.entries
            .iter()
            .map(|(name, e)| (name.clone(), e.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
