//! pagefeat - 单页应用的动态功能调度与生命周期管理
//!
//! 根据不断变化的页面地址决定哪些功能应当运行：按特异性评分解决重叠匹配，
//! 应用显式互斥规则，并以故障隔离的方式驱动 init / cleanup。

// 导出全局错误类型
pub use self::error::{FeatResult, PageFeatError};

// 导出配置模块
pub use self::config::{CustomConfigBuilder, DispatchConfig, MutationFilterConfig, RetryPolicy};

// 导出功能描述接口
pub use self::feature::{
    FailureKind, FeatureDescriptor, FeatureDescriptorBuilder, FeatureFailure, FeatureHandler,
    FeatureOutcome, MatchContext,
};

// 导出注册表
pub use self::registry::FeatureRegistry;

// 导出生命周期控制
pub use self::lifecycle::{
    FeatureState, LifecycleController, MatchResult, ScanReport,
};

// 导出健康上报
pub use self::health::{HealthReporter, HealthStatus, MetricsDump, Operation, PerformanceRecord};

// 导出变更检测
pub use self::detector::{
    ChangeDetector, ChangeListener, ChangeSource, DetectorHandle, LocationProvider,
    MutationFeed, MutationRecord, MutationSource, PollingSource, SharedLocation,
};

// 导出协作者接口
pub use self::collab::{
    retry_with_backoff, LoopbackChannel, MemorySettingsStore, MessageChannel, SettingsStore,
};

// 模式层
pub use pagefeat_engine::{PatternMatcher, PatternSpec, PatternSyntax, ValidationReport};

// 声明所有子模块
pub mod collab;
pub mod config;
pub mod detector;
pub mod error;
pub mod feature;
pub mod health;
pub mod lifecycle;
pub mod registry;
pub mod utils;
