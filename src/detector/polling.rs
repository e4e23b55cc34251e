//! 轮询信号源：按固定间隔读取地址，变化时发出信号

use async_trait::async_trait;
use log::{debug, trace};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::{MAX_POLL_INTERVAL, MIN_POLL_INTERVAL};
use crate::detector::location::LocationProvider;
use crate::detector::source::{wait_shutdown, ChangeSignal, ChangeSink, ChangeSource, SignalOrigin};
use crate::utils::preview_url;

/// 地址轮询信号源
pub struct PollingSource {
    location: Arc<dyn LocationProvider>,
    interval: Duration,
    last_seen: Option<String>,
}

impl PollingSource {
    /// 间隔会被夹到 [MIN_POLL_INTERVAL, MAX_POLL_INTERVAL]
    pub fn new(location: Arc<dyn LocationProvider>, interval: Duration) -> Self {
        Self {
            location,
            interval: interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL),
            last_seen: None,
        }
    }

    /// 以指定地址为基线，首次读取到不同地址即发信号
    pub fn with_baseline(mut self, url: impl Into<String>) -> Self {
        self.last_seen = Some(url.into());
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 读取一次地址，返回是否变化；首次读取只建立基线
    fn observe(&mut self) -> Option<String> {
        let url = self.location.current_url();
        match &self.last_seen {
            Some(prev) if *prev == url => None,
            Some(_) => {
                self.last_seen = Some(url.clone());
                Some(url)
            }
            None => {
                self.last_seen = Some(url);
                None
            }
        }
    }
}

#[async_trait]
impl ChangeSource for PollingSource {
    fn name(&self) -> &'static str {
        "polling"
    }

    fn seed_baseline(&mut self, url: &str) {
        if self.last_seen.is_none() {
            self.last_seen = Some(url.to_string());
        }
    }

    async fn run(self: Box<Self>, sink: ChangeSink, mut shutdown: watch::Receiver<bool>) {
        let mut this = *self;
        let mut ticker = tokio::time::interval(this.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("轮询信号源启动，间隔 {:?}", this.interval);

        loop {
            tokio::select! {
                _ = wait_shutdown(&mut shutdown) => break,
                _ = ticker.tick() => {}
            }
            if let Some(url) = this.observe() {
                trace!("轮询发现地址变化：{}", preview_url(&url));
                if !sink.notify(ChangeSignal::with_url(SignalOrigin::Poll, url)).await {
                    break;
                }
            }
        }
        debug!("轮询信号源已停止");
    }
}
