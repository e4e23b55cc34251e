use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// 全局永不匹配正则（预编译，用于编译失败回退）
pub static NEVER_REGEX_ARC: Lazy<Arc<Regex>> =
    Lazy::new(|| Arc::new(Regex::new(r"\b\B").expect("static regex is valid")));

/// 全局正则缓存类型定义
/// Key: (正则模式字符串, 是否忽略大小写)
/// Value: 编译后的正则Arc（避免重复编译）
type RegexCacheKey = (Arc<String>, bool);
pub static REGEX_CACHE: Lazy<RwLock<FxHashMap<RegexCacheKey, Arc<Regex>>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// 运行时匹配器
/// 核心特性：
/// 1. 懒加载编译正则（首次匹配时编译）
/// 2. 全局正则缓存（相同模式文本只编译一次）
/// 3. 纯字面量模式降级为子串匹配
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// 包含匹配（子字符串，无捕获组）
    Contains(Arc<String>),
    /// 懒加载正则匹配
    LazyRegex {
        /// 正则模式字符串（Arc封装）
        pattern: Arc<String>,
        /// 是否忽略大小写
        case_insensitive: bool,
    },
}

impl Matcher {
    /// 构建正则匹配器
    pub fn regex(pattern: impl Into<String>, case_insensitive: bool) -> Self {
        Self::LazyRegex {
            pattern: Arc::new(pattern.into()),
            case_insensitive,
        }
    }

    /// 获取编译后的正则（懒加载+全局缓存）
    /// 核心逻辑：读锁查缓存 → 未命中则写锁编译并缓存
    #[inline(always)]
    fn get_compiled_regex(pattern: &Arc<String>, case_insensitive: bool) -> Arc<Regex> {
        let cache_key = (pattern.clone(), case_insensitive);

        // 1. 读锁查询缓存
        {
            let cache_read = REGEX_CACHE.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(re) = cache_read.get(&cache_key) {
                return re.clone();
            }
        }

        // 2. 写锁编译并插入缓存（仅缓存未命中时执行）
        let mut cache_write = REGEX_CACHE.write().unwrap_or_else(PoisonError::into_inner);
        cache_write
            .entry(cache_key)
            .or_insert_with(|| Self::compile_regex(pattern.as_str(), case_insensitive))
            .clone()
    }

    /// 正则编译公共逻辑（失败回退为永不匹配）
    #[inline]
    fn compile_regex(pattern: &str, case_insensitive: bool) -> Arc<Regex> {
        RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_or_else(
                |e| {
                    log::warn!("Regex compilation failed: pattern={} error={}", pattern, e);
                    NEVER_REGEX_ARC.clone()
                },
                Arc::new,
            )
    }

    /// 执行匹配
    #[inline(always)]
    pub fn matches(&self, input: &str) -> bool {
        match self {
            Matcher::Contains(s) => input.contains(s.as_str()),
            Matcher::LazyRegex {
                pattern,
                case_insensitive,
            } => Self::get_compiled_regex(pattern, *case_insensitive).is_match(input),
        }
    }

    /// 匹配并返回有序捕获组
    /// 未参与匹配的可选分组记为空串，保证位置与模式中的分组一一对应
    pub fn capture(&self, input: &str) -> Option<Vec<String>> {
        match self {
            Matcher::Contains(s) => input.contains(s.as_str()).then(Vec::new),
            Matcher::LazyRegex {
                pattern,
                case_insensitive,
            } => {
                let re = Self::get_compiled_regex(pattern, *case_insensitive);
                let caps = re.captures(input)?;
                Some(
                    caps.iter()
                        .skip(1)
                        .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                        .collect(),
                )
            }
        }
    }

    /// 整段匹配的字节区间（用于判断是否覆盖整个目标）
    pub fn match_span(&self, input: &str) -> Option<(usize, usize)> {
        match self {
            Matcher::Contains(s) => input.find(s.as_str()).map(|start| (start, start + s.len())),
            Matcher::LazyRegex {
                pattern,
                case_insensitive,
            } => Self::get_compiled_regex(pattern, *case_insensitive)
                .find(input)
                .map(|m| (m.start(), m.end())),
        }
    }

    /// 描述匹配器规则（用于日志/调试输出）
    #[inline(always)]
    pub fn describe(&self) -> String {
        match self {
            Matcher::Contains(s) => format!("contains: {}", s),
            Matcher::LazyRegex { pattern, .. } => format!("lazy_regex: {}", pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_capture_keeps_group_positions() {
        // 测试场景：可选分组未参与匹配时保留空串占位
        let matcher = Matcher::regex(r"/cards/(\d+)(?:/(settings))?", false);
        assert_eq!(
            matcher.capture("https://x.io/cards/42"),
            Some(vec!["42".to_string(), String::new()])
        );
        assert_eq!(
            matcher.capture("https://x.io/cards/42/settings"),
            Some(vec!["42".to_string(), "settings".to_string()])
        );
        assert_eq!(matcher.capture("https://x.io/boards/42"), None);
    }

    #[test]
    fn test_contains_has_no_captures() {
        let matcher = Matcher::Contains(Arc::new("/inbox".to_string()));
        assert_eq!(matcher.capture("/u/inbox/3"), Some(Vec::new()));
        assert_eq!(matcher.match_span("/u/inbox/3"), Some((2, 8)));
        assert!(!matcher.matches("/u/outbox"));
    }

    #[test]
    fn test_invalid_regex_never_matches() {
        let matcher = Matcher::regex("(unclosed", false);
        assert!(!matcher.matches("(unclosed"));
        assert!(!matcher.matches(""));
    }
}
