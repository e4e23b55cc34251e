//! 结构变更信号源：宿主推送变更记录批次，过滤噪声后发出信号

use async_trait::async_trait;
use log::{debug, trace};
use tokio::sync::{mpsc, watch};

use crate::config::MutationFilterConfig;
use crate::detector::source::{wait_shutdown, ChangeSignal, ChangeSink, ChangeSource, SignalOrigin};

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// 单条结构变更记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target_id: Option<String>,
    pub attribute_name: Option<String>,
    pub added_nodes: usize,
    pub removed_nodes: usize,
}

impl MutationRecord {
    pub fn child_list(target_id: Option<&str>, added_nodes: usize, removed_nodes: usize) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target_id: target_id.map(str::to_string),
            attribute_name: None,
            added_nodes,
            removed_nodes,
        }
    }

    pub fn attribute(target_id: Option<&str>, attribute_name: &str) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target_id: target_id.map(str::to_string),
            attribute_name: Some(attribute_name.to_string()),
            added_nodes: 0,
            removed_nodes: 0,
        }
    }

    pub fn character_data(target_id: Option<&str>) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target_id: target_id.map(str::to_string),
            attribute_name: None,
            added_nodes: 0,
            removed_nodes: 0,
        }
    }
}

/// 噪声过滤
#[derive(Debug, Clone, Default)]
pub struct MutationFilter {
    config: MutationFilterConfig,
}

impl MutationFilter {
    pub fn new(config: MutationFilterConfig) -> Self {
        Self { config }
    }

    /// 记录是否可能意味着导航
    pub fn is_relevant(&self, record: &MutationRecord) -> bool {
        if let Some(id) = &record.target_id {
            if self.config.ignored_id_prefixes.iter().any(|p| id.starts_with(p.as_str())) {
                return false;
            }
        }
        match record.kind {
            MutationKind::ChildList => record.added_nodes + record.removed_nodes > 0,
            MutationKind::CharacterData => !self.config.ignore_character_data,
            MutationKind::Attributes => match &record.attribute_name {
                Some(attr) => !self.config.ignored_attributes.iter().any(|a| a == attr),
                None => true,
            },
        }
    }

    pub fn any_relevant(&self, batch: &[MutationRecord]) -> bool {
        batch.iter().any(|r| self.is_relevant(r))
    }
}

/// 宿主侧投递端
#[derive(Debug, Clone)]
pub struct MutationFeed {
    tx: mpsc::Sender<Vec<MutationRecord>>,
}

impl MutationFeed {
    /// 投递一批记录；通道满时丢弃，信号源已停止时返回 false
    pub fn push(&self, batch: Vec<MutationRecord>) -> bool {
        match self.tx.try_send(batch) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                trace!("结构变更通道已满，丢弃一批记录");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

/// 结构变更信号源
#[derive(Debug)]
pub struct MutationSource {
    rx: mpsc::Receiver<Vec<MutationRecord>>,
    filter: MutationFilter,
}

impl MutationSource {
    /// 创建投递端与信号源
    pub fn channel(config: &MutationFilterConfig, capacity: usize) -> (MutationFeed, MutationSource) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let source = MutationSource {
            rx,
            filter: MutationFilter::new(config.clone()),
        };
        (MutationFeed { tx }, source)
    }
}

#[async_trait]
impl ChangeSource for MutationSource {
    fn name(&self) -> &'static str {
        "mutation"
    }

    async fn run(self: Box<Self>, sink: ChangeSink, mut shutdown: watch::Receiver<bool>) {
        let MutationSource { mut rx, filter } = *self;
        loop {
            let batch = tokio::select! {
                _ = wait_shutdown(&mut shutdown) => break,
                batch = rx.recv() => match batch {
                    Some(batch) => batch,
                    None => break,
                },
            };
            if !filter.any_relevant(&batch) {
                trace!("忽略 {} 条无关结构变更", batch.len());
                continue;
            }
            if !sink.try_notify(ChangeSignal::new(SignalOrigin::Mutation)) {
                break;
            }
        }
        debug!("结构变更信号源已停止");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_drops_noise() {
        let filter = MutationFilter::new(MutationFilterConfig::default());
        // 测试场景：空子节点变更 / 文本变更 / 样式属性 / 功能自身节点
        assert!(!filter.is_relevant(&MutationRecord::child_list(Some("board"), 0, 0)));
        assert!(!filter.is_relevant(&MutationRecord::character_data(Some("title"))));
        assert!(!filter.is_relevant(&MutationRecord::attribute(Some("card"), "style")));
        assert!(!filter.is_relevant(&MutationRecord::child_list(Some("pagefeat-badge"), 1, 0)));

        assert!(filter.is_relevant(&MutationRecord::child_list(Some("board"), 2, 1)));
        assert!(filter.is_relevant(&MutationRecord::child_list(None, 1, 0)));
        assert!(filter.is_relevant(&MutationRecord::attribute(Some("card"), "data-id")));
    }

    #[test]
    fn test_filter_respects_config() {
        let config = MutationFilterConfig {
            ignored_id_prefixes: Vec::new(),
            ignored_attributes: Vec::new(),
            ignore_character_data: false,
        };
        let filter = MutationFilter::new(config);
        assert!(filter.is_relevant(&MutationRecord::character_data(None)));
        assert!(filter.is_relevant(&MutationRecord::attribute(Some("pagefeat-x"), "class")));
    }

    #[tokio::test]
    async fn test_source_signals_only_relevant_batches() {
        let (feed, source) = MutationSource::channel(&MutationFilterConfig::default(), 8);
        let (tx, mut rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(Box::new(source).run(ChangeSink::new(tx), stop_rx));

        assert!(feed.push(vec![MutationRecord::attribute(Some("card"), "class")]));
        assert!(feed.push(vec![MutationRecord::child_list(Some("content"), 3, 3)]));

        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.origin, SignalOrigin::Mutation);
        assert!(rx.try_recv().is_err());

        stop_tx.send(true).unwrap();
        task.await.unwrap();
        assert!(!feed.push(Vec::new()));
    }
}
