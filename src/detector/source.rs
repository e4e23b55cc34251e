//! 变更信号源抽象

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, watch};

/// 信号来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalOrigin {
    Mutation,
    Poll,
    Manual,
}

/// 变更信号，只表示"可能发生了导航"，地址以检测器读取为准
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSignal {
    pub origin: SignalOrigin,
    pub observed_url: Option<String>,
}

impl ChangeSignal {
    pub fn new(origin: SignalOrigin) -> Self {
        Self {
            origin,
            observed_url: None,
        }
    }

    pub fn with_url(origin: SignalOrigin, url: impl Into<String>) -> Self {
        Self {
            origin,
            observed_url: Some(url.into()),
        }
    }
}

/// 信号投递端
#[derive(Debug, Clone)]
pub struct ChangeSink {
    tx: mpsc::Sender<ChangeSignal>,
}

impl ChangeSink {
    pub(crate) fn new(tx: mpsc::Sender<ChangeSignal>) -> Self {
        Self { tx }
    }

    /// 投递信号，检测器已停止时返回 false
    pub async fn notify(&self, signal: ChangeSignal) -> bool {
        self.tx.send(signal).await.is_ok()
    }

    /// 非阻塞投递；通道满时丢弃（去抖窗口内的信号会被合并）
    pub fn try_notify(&self, signal: ChangeSignal) -> bool {
        match self.tx.try_send(signal) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

/// 变更信号源
#[async_trait]
pub trait ChangeSource: Send + 'static {
    fn name(&self) -> &'static str;

    /// 启动前告知已派发过的地址，需要比较地址的信号源以此为基线
    fn seed_baseline(&mut self, _url: &str) {}

    /// 持续运行，直到 shutdown 置为 true 或信号通道关闭
    async fn run(self: Box<Self>, sink: ChangeSink, shutdown: watch::Receiver<bool>);
}

/// 等待停机信号；发送端被丢弃也视为停机
pub(crate) async fn wait_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        let stopped = *shutdown.borrow();
        if stopped || shutdown.changed().await.is_err() {
            return;
        }
    }
}
