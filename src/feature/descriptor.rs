//! 功能描述符：名称 + 匹配模式 + init/cleanup 回调 + 互斥声明
//! 注册后不可变

use async_trait::async_trait;
use pagefeat_engine::PatternSpec;
use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use crate::error::{FeatResult, PageFeatError};
use crate::feature::context::MatchContext;
use crate::feature::outcome::FeatureOutcome;
use crate::utils::BoxFuture;

/// 功能行为接口
#[async_trait]
pub trait FeatureHandler: Send + Sync + 'static {
    /// 匹配成功后初始化
    async fn init(&self, ctx: MatchContext) -> FeatureOutcome;

    /// 导航离开或会话结束时清理
    async fn cleanup(&self) -> FeatureOutcome {
        Ok(())
    }
}

type InitFn = Arc<dyn Fn(MatchContext) -> BoxFuture<'static, FeatureOutcome> + Send + Sync>;
type CleanupFn = Arc<dyn Fn() -> BoxFuture<'static, FeatureOutcome> + Send + Sync>;

/// 闭包形式的功能行为
struct ClosureHandler {
    init: InitFn,
    cleanup: Option<CleanupFn>,
}

#[async_trait]
impl FeatureHandler for ClosureHandler {
    async fn init(&self, ctx: MatchContext) -> FeatureOutcome {
        (self.init)(ctx).await
    }

    async fn cleanup(&self) -> FeatureOutcome {
        match &self.cleanup {
            Some(cleanup) => cleanup().await,
            None => Ok(()),
        }
    }
}

/// 功能描述符
#[derive(Clone)]
pub struct FeatureDescriptor {
    name: String,
    pattern: PatternSpec,
    excludes: BTreeSet<String>,
    handler: Arc<dyn FeatureHandler>,
}

impl FeatureDescriptor {
    pub fn builder(name: impl Into<String>) -> FeatureDescriptorBuilder {
        FeatureDescriptorBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &PatternSpec {
        &self.pattern
    }

    /// 本功能激活后需要压制的功能名称
    pub fn excludes(&self) -> &BTreeSet<String> {
        &self.excludes
    }

    pub fn handler(&self) -> &Arc<dyn FeatureHandler> {
        &self.handler
    }
}

impl Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("excludes", &self.excludes)
            .finish_non_exhaustive()
    }
}

/// 描述符构建器（链式 API）
#[derive(Default)]
pub struct FeatureDescriptorBuilder {
    name: String,
    pattern: Option<PatternSpec>,
    excludes: BTreeSet<String>,
    init: Option<InitFn>,
    cleanup: Option<CleanupFn>,
    handler: Option<Arc<dyn FeatureHandler>>,
}

impl FeatureDescriptorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 匹配模式，`glob:` 前缀为通配符语法，否则为正则
    pub fn pattern(mut self, pattern: impl Into<PatternSpec>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excludes.insert(name.into());
        self
    }

    pub fn excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn on_init<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(MatchContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FeatureOutcome> + Send + 'static,
    {
        self.init = Some(Arc::new(move |ctx| Box::pin(f(ctx))));
        self
    }

    pub fn on_cleanup<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FeatureOutcome> + Send + 'static,
    {
        self.cleanup = Some(Arc::new(move || Box::pin(f())));
        self
    }

    /// 直接使用实现了 FeatureHandler 的行为对象，与 on_init / on_cleanup 互斥
    pub fn handler(mut self, handler: impl FeatureHandler) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> FeatResult<FeatureDescriptor> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(PageFeatError::ValidationError("功能缺少名称".to_string()));
        }
        let pattern = match self.pattern {
            Some(p) if !p.is_blank() => p,
            _ => {
                return Err(PageFeatError::ValidationError(format!(
                    "功能 [{name}] 缺少匹配模式"
                )))
            }
        };
        let handler: Arc<dyn FeatureHandler> = match (self.handler, self.init) {
            (Some(_), Some(_)) => {
                return Err(PageFeatError::ValidationError(format!(
                    "功能 [{name}] 同时设置了 handler 与 on_init"
                )))
            }
            (Some(_), None) if self.cleanup.is_some() => {
                return Err(PageFeatError::ValidationError(format!(
                    "功能 [{name}] 同时设置了 handler 与 on_cleanup"
                )))
            }
            (Some(handler), None) => handler,
            (None, Some(init)) => Arc::new(ClosureHandler {
                init,
                cleanup: self.cleanup,
            }),
            (None, None) => {
                return Err(PageFeatError::ValidationError(format!(
                    "功能 [{name}] 缺少 init 回调"
                )))
            }
        };

        Ok(FeatureDescriptor {
            name,
            pattern,
            excludes: self.excludes,
            handler,
        })
    }
}
