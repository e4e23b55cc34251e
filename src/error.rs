//! 全局错误类型定义
use pagefeat_engine::CoreError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::lifecycle::FeatureState;

#[derive(Error, Debug)]
pub enum PageFeatError {
    // 注册相关错误（对启动流程是致命的）
    #[error("描述符校验失败：{0}")]
    ValidationError(String),
    #[error("功能名称重复：{0}")]
    DuplicateNameError(String),

    // 生命周期相关错误（在控制器边界被捕获，不会穿透 check_page）
    #[error("功能 [{feature}] 初始化失败：{detail}")]
    InitializationError { feature: String, detail: String },
    #[error("功能 [{feature}] 清理失败：{detail}")]
    CleanupError { feature: String, detail: String },
    #[error("功能 [{feature}] 非法状态转换：{from} -> {to}")]
    InvalidStateTransition {
        feature: String,
        from: FeatureState,
        to: FeatureState,
    },

    // 模式内核错误
    #[error("模式内核错误：{0}")]
    Core(#[from] CoreError),

    // 外部协作者错误（消息通道/配置存储）
    #[error("协作者调用失败：{0}")]
    CollaboratorError(String),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    #[error("异步任务执行失败：{0}")]
    AsyncTaskError(String),
}

// 全局Result类型
pub type FeatResult<T> = Result<T, PageFeatError>;
