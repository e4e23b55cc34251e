//! 变更检测器：多个信号源汇入同一个去抖 + 去重的触发器

use async_trait::async_trait;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::DispatchConfig;
use crate::detector::location::LocationProvider;
use crate::detector::source::{wait_shutdown, ChangeSignal, ChangeSink, ChangeSource, SignalOrigin};
use crate::utils::preview_url;

/// 地址变化的接收方
#[async_trait]
pub trait ChangeListener: Send + Sync + 'static {
    async fn on_location_change(&self, url: &str);
}

/// 去重闸门：只放行与上次派发不同的地址
#[derive(Debug, Default, Clone)]
pub struct SignalGate {
    last_dispatched: Option<String>,
}

impl SignalGate {
    pub fn new(last_dispatched: Option<String>) -> Self {
        Self { last_dispatched }
    }

    pub fn admit(&mut self, url: &str) -> bool {
        if self.last_dispatched.as_deref() == Some(url) {
            return false;
        }
        self.last_dispatched = Some(url.to_string());
        true
    }

    pub fn last_dispatched(&self) -> Option<&str> {
        self.last_dispatched.as_deref()
    }
}

/// 变更检测器
pub struct ChangeDetector {
    config: DispatchConfig,
    location: Arc<dyn LocationProvider>,
    sources: Vec<Box<dyn ChangeSource>>,
}

impl ChangeDetector {
    pub fn new(config: DispatchConfig, location: Arc<dyn LocationProvider>) -> Self {
        Self {
            config,
            location,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: Box<dyn ChangeSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn location(&self) -> &Arc<dyn LocationProvider> {
        &self.location
    }

    /// 启动所有信号源和派发循环
    pub fn start(self, listener: Arc<dyn ChangeListener>, last_dispatched: Option<String>) -> DetectorHandle {
        let (tx, rx) = mpsc::channel(self.config.signal_buffer.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let manual = ChangeSink::new(tx.clone());

        let mut tasks = Vec::with_capacity(self.sources.len() + 1);
        for mut source in self.sources {
            if let Some(url) = &last_dispatched {
                source.seed_baseline(url);
            }
            debug!("启动信号源 {}", source.name());
            tasks.push(tokio::spawn(source.run(ChangeSink::new(tx.clone()), shutdown_rx.clone())));
        }
        drop(tx);

        let dispatcher = Dispatcher {
            rx,
            shutdown: shutdown_rx,
            location: self.location,
            listener,
            debounce: self.config.debounce(),
            gate: SignalGate::new(last_dispatched),
        };
        tasks.push(tokio::spawn(dispatcher.run()));
        info!("变更检测已启动，共 {} 个信号源", tasks.len() - 1);

        DetectorHandle {
            shutdown_tx,
            manual,
            tasks,
        }
    }
}

struct Dispatcher {
    rx: mpsc::Receiver<ChangeSignal>,
    shutdown: watch::Receiver<bool>,
    location: Arc<dyn LocationProvider>,
    listener: Arc<dyn ChangeListener>,
    debounce: Duration,
    gate: SignalGate,
}

impl Dispatcher {
    async fn run(mut self) {
        loop {
            let first = tokio::select! {
                _ = wait_shutdown(&mut self.shutdown) => break,
                signal = self.rx.recv() => match signal {
                    Some(signal) => signal,
                    None => break,
                },
            };

            // 去抖：从第一个信号起等待固定窗口，期间的信号合并
            let deadline = Instant::now() + self.debounce;
            let mut coalesced = 1usize;
            let mut closed = false;
            loop {
                tokio::select! {
                    _ = wait_shutdown(&mut self.shutdown) => return,
                    _ = tokio::time::sleep_until(deadline) => break,
                    signal = self.rx.recv() => match signal {
                        Some(_) => coalesced += 1,
                        None => {
                            closed = true;
                            break;
                        }
                    },
                }
            }

            let url = self.location.current_url();
            if self.gate.admit(&url) {
                debug!(
                    "派发地址变化 {}（来源 {:?}，合并 {} 个信号）",
                    preview_url(&url),
                    first.origin,
                    coalesced
                );
                self.listener.on_location_change(&url).await;
            }
            if closed {
                break;
            }
        }
        debug!("派发循环已停止");
    }
}

/// 检测器句柄
pub struct DetectorHandle {
    shutdown_tx: watch::Sender<bool>,
    manual: ChangeSink,
    tasks: Vec<JoinHandle<()>>,
}

impl DetectorHandle {
    /// 手动触发一次重新评估（同样经过去抖与去重）
    pub fn trigger(&self) -> bool {
        self.manual.try_notify(ChangeSignal::new(SignalOrigin::Manual))
    }

    /// 停止所有信号源和派发循环，并等待其退出
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                error!("变更检测任务异常退出：{}", e);
            }
        }
        info!("变更检测已停止");
    }
}
