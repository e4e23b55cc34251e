//! 与后台特权进程的消息通道

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::error::{FeatResult, PageFeatError};
use crate::utils::BoxFuture;

/// 消息通道
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send_message(&self, action: &str, payload: Value) -> FeatResult<Value>;
}

type ActionHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, FeatResult<Value>> + Send + Sync>;

/// 进程内回环通道：按 action 路由到已注册的异步处理函数
#[derive(Default)]
pub struct LoopbackChannel {
    handlers: RwLock<FxHashMap<String, ActionHandler>>,
}

impl LoopbackChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理函数，同名 action 会被覆盖
    pub async fn register<F, Fut>(&self, action: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FeatResult<Value>> + Send + 'static,
    {
        let handler: ActionHandler = Arc::new(move |payload| Box::pin(handler(payload)));
        self.handlers.write().await.insert(action.into(), handler);
    }
}

#[async_trait]
impl MessageChannel for LoopbackChannel {
    async fn send_message(&self, action: &str, payload: Value) -> FeatResult<Value> {
        let handler = self.handlers.read().await.get(action).cloned();
        match handler {
            Some(handler) => {
                debug!("回环通道处理消息 {}", action);
                handler(payload).await
            }
            None => Err(PageFeatError::CollaboratorError(format!(
                "没有处理 `{}` 的接收方",
                action
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_loopback_routes_by_action() {
        let channel = LoopbackChannel::new();
        channel
            .register("echo", |payload: Value| async move { Ok(json!({ "echo": payload })) })
            .await;

        let reply = channel.send_message("echo", json!({"card": 5})).await.unwrap();
        assert_eq!(reply, json!({"echo": {"card": 5}}));

        let err = channel.send_message("missing", Value::Null).await.unwrap_err();
        assert!(matches!(err, PageFeatError::CollaboratorError(_)));
    }
}
