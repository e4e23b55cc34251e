//! pagefeat-engine 内核错误定义
//! 封装模式层所有核心错误，与调度层错误解耦，基于thiserror实现类型安全处理
use thiserror::Error;

use regex::Error as RegexError;

/// 内核核心错误枚举
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================== 模式相关错误 =====================
    /// 模式为空（去除空白后无内容）
    #[error("Pattern is empty")]
    EmptyPattern,

    /// 模式语法错误（正则/通配符无法解析）
    #[error("Malformed pattern `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// 正则表达式编译失败（正则语法错误/不支持的特性）
    #[error("Regex compilation failed: {0}")]
    RegexCompileError(#[from] RegexError),
}

/// 内核层全局Result类型别名
pub type CoreResult<T> = Result<T, CoreError>;
