//! 当前地址读取

use std::sync::{Arc, PoisonError, RwLock};

/// 当前地址提供方
pub trait LocationProvider: Send + Sync + 'static {
    fn current_url(&self) -> String;
}

/// 可共享、可修改的地址（宿主在导航时写入）
#[derive(Debug, Clone, Default)]
pub struct SharedLocation {
    inner: Arc<RwLock<String>>,
}

impl SharedLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(url.into())),
        }
    }

    pub fn set(&self, url: impl Into<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = url.into();
    }

    pub fn get(&self) -> String {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LocationProvider for SharedLocation {
    fn current_url(&self) -> String {
        self.get()
    }
}
