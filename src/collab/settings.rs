//! 持久化配置存储接口

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::error::FeatResult;

/// 配置存储
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_setting(&self, key: &str) -> FeatResult<Option<Value>>;
    async fn set_setting(&self, key: &str, value: Value) -> FeatResult<()>;
}

/// 读取并反序列化为具体类型
pub async fn get_typed_setting<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> FeatResult<Option<T>> {
    match store.get_setting(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// 内存配置存储
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RwLock<FxHashMap<String, Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_setting(&self, key: &str) -> FeatResult<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: Value) -> FeatResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_roundtrip_and_typed_read() {
        let store = MemorySettingsStore::with_values([("card_badges", json!(true))]);
        assert_eq!(store.get_setting("card_badges").await.unwrap(), Some(json!(true)));
        assert_eq!(store.get_setting("absent").await.unwrap(), None);

        store.set_setting("limit", json!(12)).await.unwrap();
        let limit: Option<u32> = get_typed_setting(&store, "limit").await.unwrap();
        assert_eq!(limit, Some(12));

        // 类型不符时返回 JSON 错误
        let wrong: FeatResult<Option<String>> = get_typed_setting(&store, "limit").await;
        assert!(wrong.is_err());
    }
}
