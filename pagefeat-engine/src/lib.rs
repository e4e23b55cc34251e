//! pagefeat-engine：模式层内核（无状态）
//! 模式编译 / 结构分析 / 特异性评分 / 校验 / 捕获匹配

// 核心公共结构体+枚举
pub mod core;
// 错误定义
pub mod error;
// 地址解析
pub mod location;
// 运行时匹配器 + 全局正则缓存
pub mod matcher;
// 正则HIR结构分析
pub mod analyzer;
// 模式编译
pub mod compiler;
// 特异性评分
pub mod specificity;
// 模式校验
pub mod validator;
// 日志格式化工具
pub mod utils;

// 顶层导出常用类型
pub use crate::core::{MatchTarget, PatternProfile, PatternSpec, PatternSyntax, GLOB_PREFIX};
pub use compiler::{CompiledPattern, PatternCompiler};
pub use error::{CoreError, CoreResult};
pub use location::Location;
pub use matcher::Matcher;
pub use validator::{IssueCode, PatternValidator, ValidationIssue, ValidationReport};

/// 模式匹配器门面：无状态，所有方法均为纯函数
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternMatcher;

impl PatternMatcher {
    /// 校验模式
    pub fn validate(pattern: &PatternSpec) -> ValidationReport {
        PatternValidator::validate(pattern)
    }

    /// 编译模式
    pub fn compile(pattern: &PatternSpec) -> CoreResult<CompiledPattern> {
        PatternCompiler::compile(pattern)
    }

    /// 特异性评分
    pub fn compute_specificity(pattern: &CompiledPattern, url: Option<&str>) -> i64 {
        specificity::compute_specificity(pattern, url)
    }

    /// 匹配并捕获，未匹配或地址畸形返回None
    pub fn match_and_capture(pattern: &CompiledPattern, url: &str) -> Option<Vec<String>> {
        pattern.match_and_capture(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matcher_facade() {
        let spec = PatternSpec::parse(r"/cards/(\d+)/settings");
        assert!(PatternMatcher::validate(&spec).is_valid);

        let compiled = PatternMatcher::compile(&spec).unwrap();
        let url = "https://board.example.com/cards/5/settings";
        assert_eq!(
            PatternMatcher::match_and_capture(&compiled, url),
            Some(vec!["5".to_string()])
        );
        assert_eq!(
            PatternMatcher::compute_specificity(&compiled, Some(url)),
            PatternMatcher::compute_specificity(&compiled, Some(url))
        );
        assert_eq!(PatternMatcher::match_and_capture(&compiled, "::garbage::"), None);
    }
}
