//! 模式校验器
//! 校验结果以返回值表达，不抛错：错误使模式不可注册，告警仅提示作者收窄模式

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::compiler::{CompiledPattern, PatternCompiler};
use crate::core::{PatternSpec, PatternSyntax};
use crate::error::CoreError;

/// 判定"无条件匹配一切"的样本地址，均为可被解析的合法地址
const UNIVERSAL_PROBES: &[&str] = &[
    "/",
    "/a",
    "/cards/5/settings",
    "/search?q=1",
    "/x#top",
    "https://example.com/",
    "https://x.io/any/thing?q=1#f",
    "http://localhost:8080/a/b",
];

/// 校验问题代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    Empty,
    Malformed,
    MatchesEverything,
    WildcardDominant,
    NoLiteralAnchor,
    GlobNotRooted,
}

/// 单条校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

/// 校验报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// 错误信息拼接（用于上层错误描述）
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// 模式校验器
#[derive(Debug, Default)]
pub struct PatternValidator;

impl PatternValidator {
    /// 校验原始模式
    pub fn validate(spec: &PatternSpec) -> ValidationReport {
        match PatternCompiler::compile(spec) {
            Ok(compiled) => Self::validate_compiled(&compiled),
            Err(e) => {
                let issue = match e {
                    CoreError::EmptyPattern => ValidationIssue::new(IssueCode::Empty, "pattern is empty"),
                    other => ValidationIssue::new(IssueCode::Malformed, other.to_string()),
                };
                ValidationReport {
                    is_valid: false,
                    errors: vec![issue],
                    warnings: Vec::new(),
                }
            }
        }
    }

    /// 校验已编译模式
    pub fn validate_compiled(compiled: &CompiledPattern) -> ValidationReport {
        let mut report = ValidationReport::default();

        if Self::matches_everything(compiled) {
            report.errors.push(ValidationIssue::new(
                IssueCode::MatchesEverything,
                format!("pattern `{}` matches every location unconditionally", compiled.spec),
            ));
        }

        let profile = &compiled.profile;
        if profile.wildcard_dominant() {
            report.warnings.push(ValidationIssue::new(
                IssueCode::WildcardDominant,
                format!(
                    "wildcards dominate pattern `{}` ({} wildcards vs {} literal segments), consider a narrower pattern",
                    compiled.spec, profile.wildcards, profile.literal_segments
                ),
            ));
        }
        if profile.literal_chars == 0 {
            report.warnings.push(ValidationIssue::new(
                IssueCode::NoLiteralAnchor,
                format!("pattern `{}` contains no literal text", compiled.spec),
            ));
        }
        if compiled.spec.syntax == PatternSyntax::Glob && !compiled.spec.source.starts_with('/') {
            report.warnings.push(ValidationIssue::new(
                IssueCode::GlobNotRooted,
                format!("glob `{}` does not start with `/` and can never match a path", compiled.spec),
            ));
        }

        report.is_valid = report.errors.is_empty();
        report
    }

    /// 样本地址全部命中即视为无条件匹配，走与实际匹配相同的目标选取
    fn matches_everything(compiled: &CompiledPattern) -> bool {
        UNIVERSAL_PROBES.iter().all(|probe| compiled.is_match(probe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(issues: &[ValidationIssue]) -> Vec<IssueCode> {
        issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_valid_pattern() {
        let report = PatternValidator::validate(&PatternSpec::regex(r"/cards/(\d+)/settings"));
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_pattern() {
        let report = PatternValidator::validate(&PatternSpec::regex(""));
        assert!(!report.is_valid);
        assert_eq!(codes(&report.errors), vec![IssueCode::Empty]);
    }

    #[test]
    fn test_malformed_pattern() {
        let report = PatternValidator::validate(&PatternSpec::regex(r"/cards/(\d+"));
        assert!(!report.is_valid);
        assert_eq!(codes(&report.errors), vec![IssueCode::Malformed]);
    }

    #[test]
    fn test_universal_patterns_rejected() {
        // 测试场景：各种写法的"匹配一切"
        for pattern in [".*", "^.*$", "(.*)", "a*", "glob:**", ".", ".+", "/", "glob:/**", "^[/h]"] {
            let report = PatternValidator::validate(&PatternSpec::parse(pattern));
            assert!(!report.is_valid, "pattern {} should be rejected", pattern);
            assert!(codes(&report.errors).contains(&IssueCode::MatchesEverything));
        }
    }

    #[test]
    fn test_narrow_patterns_are_not_universal() {
        for pattern in [r"/cards/(\d+)", "glob:/search?q=*", "/a", "https://example.com/"] {
            let report = PatternValidator::validate(&PatternSpec::parse(pattern));
            assert!(report.is_valid, "pattern {} should be accepted", pattern);
        }
    }

    #[test]
    fn test_wildcard_dominant_warning() {
        let report = PatternValidator::validate(&PatternSpec::regex(r".*foo.*"));
        assert!(report.is_valid);
        assert!(codes(&report.warnings).contains(&IssueCode::WildcardDominant));
    }

    #[test]
    fn test_glob_not_rooted_warning() {
        let report = PatternValidator::validate(&PatternSpec::glob("cards/*"));
        assert!(report.is_valid);
        assert!(codes(&report.warnings).contains(&IssueCode::GlobNotRooted));
    }
}
