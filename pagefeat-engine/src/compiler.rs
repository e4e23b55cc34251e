//! 模式编译器：原始模式 → 可执行匹配器 + 结构画像
//! 负责通配符翻译、纯字面量降级、正则语法校验

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::sync::Arc;

use crate::analyzer::analyze_regex;
use crate::core::{MatchTarget, PatternProfile, PatternSpec, PatternSyntax};
use crate::error::{CoreError, CoreResult};
use crate::location::Location;
use crate::matcher::Matcher;
use crate::specificity;

/// 无正则特殊字符的纯字面量模式
static SIMPLE_CONTAINS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^.*+?^$()\[\]{}\\|]+$"#).expect("static regex is valid"));

/// 编译后的模式
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledPattern {
    /// 原始模式
    pub spec: PatternSpec,
    /// 实际执行的正则文本（通配符翻译后）
    pub regex_source: String,
    /// 匹配目标
    pub target: MatchTarget,
    /// 结构画像
    pub profile: PatternProfile,
    #[serde(skip)]
    pub matcher: Matcher,
}

impl CompiledPattern {
    /// 匹配并返回捕获组，畸形地址视为不匹配
    pub fn match_and_capture(&self, url: &str) -> Option<Vec<String>> {
        let location = Location::parse(url)?;
        self.matcher.capture(location.target(self.target))
    }

    /// 是否匹配
    pub fn is_match(&self, url: &str) -> bool {
        Location::parse(url)
            .map(|location| self.matcher.matches(location.target(self.target)))
            .unwrap_or(false)
    }

    /// 特异性评分
    pub fn specificity(&self, url: Option<&str>) -> i64 {
        specificity::compute_specificity(self, url)
    }

    /// 匹配区间是否覆盖整个匹配目标
    pub fn covers_whole_target(&self, url: &str) -> bool {
        let Some(location) = Location::parse(url) else {
            return false;
        };
        let text = location.target(self.target);
        self.matcher
            .match_span(text)
            .is_some_and(|(start, end)| start == 0 && end == text.len())
    }
}

/// 模式编译器
#[derive(Debug, Default)]
pub struct PatternCompiler;

impl PatternCompiler {
    /// 编译单条模式
    pub fn compile(spec: &PatternSpec) -> CoreResult<CompiledPattern> {
        if spec.is_blank() {
            return Err(CoreError::EmptyPattern);
        }

        let regex_source = match spec.syntax {
            PatternSyntax::Regex => spec.source.clone(),
            PatternSyntax::Glob => Self::translate_glob(&spec.source),
        };

        // 语法校验 + 结构画像
        let profile = analyze_regex(&regex_source)?;
        // 完整构建一次，捕获超出体积限制等HIR阶段发现不了的错误
        RegexBuilder::new(&regex_source).build()?;

        let matcher = if spec.syntax == PatternSyntax::Regex && Self::is_simple_contains(&regex_source) {
            Matcher::Contains(Arc::new(regex_source.clone()))
        } else {
            Matcher::regex(regex_source.clone(), false)
        };

        log::trace!(
            "Pattern compiled: {} -> {} | profile={:?}",
            spec,
            matcher.describe(),
            profile
        );

        Ok(CompiledPattern {
            spec: spec.clone(),
            regex_source,
            target: MatchTarget::for_syntax(spec.syntax),
            profile,
            matcher,
        })
    }

    /// 判断是否为简单包含匹配（无正则特殊字符）
    pub fn is_simple_contains(pattern: &str) -> bool {
        SIMPLE_CONTAINS_REGEX.is_match(pattern)
    }

    /// 通配符 → 锚定正则
    /// `**` 匹配任意内容，`*` 匹配单个路径片段，二者均为捕获组
    /// 未声明查询串的模式容忍尾部查询串
    pub fn translate_glob(glob: &str) -> String {
        let mut out = String::with_capacity(glob.len() * 2 + 16);
        out.push('^');

        let mut chars = glob.chars().peekable();
        let mut literal = String::new();
        while let Some(c) = chars.next() {
            if c == '*' {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str("(.*)");
                } else {
                    out.push_str("([^/?#]*)");
                }
            } else {
                literal.push(c);
            }
        }
        out.push_str(&regex::escape(&literal));

        if glob.contains('?') {
            out.push('$');
        } else {
            out.push_str(r"(?:\?.*)?$");
        }
        out
    }
}
