//! 功能实现依赖的外部协作者接口

pub mod messaging;
pub mod retry;
pub mod settings;

pub use messaging::{LoopbackChannel, MessageChannel};
pub use retry::{backoff_delay, retry_with_backoff, MAX_BACKOFF};
pub use settings::{get_typed_setting, MemorySettingsStore, SettingsStore};
