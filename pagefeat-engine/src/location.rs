//! 地址解析：把任意输入字符串规整为可匹配的地址
//! 只接受绝对URL或以`/`开头的路径，其余一律视为畸形地址（不匹配，不报错）

use std::borrow::Cow;
use url::Url;

use crate::core::MatchTarget;

/// 已解析的地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location<'a> {
    full: &'a str,
    path_and_query: Cow<'a, str>,
}

impl<'a> Location<'a> {
    /// 解析地址，畸形输入返回None
    pub fn parse(raw: &'a str) -> Option<Self> {
        if raw.is_empty() || raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return None;
        }

        if raw.starts_with('/') {
            // 协议相对地址（`//host/...`）按绝对地址处理
            if raw.starts_with("//") {
                return None;
            }
            let end = raw.find('#').unwrap_or(raw.len());
            return Some(Self {
                full: raw,
                path_and_query: Cow::Borrowed(&raw[..end]),
            });
        }

        let parsed = Url::parse(raw).ok()?;
        if parsed.cannot_be_a_base() {
            return None;
        }
        let path_and_query = match parsed.query() {
            Some(query) => Cow::Owned(format!("{}?{}", parsed.path(), query)),
            None => Cow::Owned(parsed.path().to_string()),
        };
        Some(Self {
            full: raw,
            path_and_query,
        })
    }

    /// 原始完整地址
    #[inline(always)]
    pub fn full(&self) -> &str {
        self.full
    }

    /// 路径 + 查询串（不含片段）
    #[inline(always)]
    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }

    /// 按匹配目标取出待匹配文本
    #[inline(always)]
    pub fn target(&self, target: MatchTarget) -> &str {
        match target {
            MatchTarget::FullUrl => self.full(),
            MatchTarget::PathAndQuery => self.path_and_query(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute_url() {
        let loc = Location::parse("https://board.example.com/cards/5/settings?tab=a#top").unwrap();
        assert_eq!(loc.path_and_query(), "/cards/5/settings?tab=a");
        assert_eq!(loc.target(MatchTarget::FullUrl), "https://board.example.com/cards/5/settings?tab=a#top");
    }

    #[test]
    fn test_parse_bare_path() {
        let loc = Location::parse("/unrelated/path#frag").unwrap();
        assert_eq!(loc.path_and_query(), "/unrelated/path");
    }

    #[test]
    fn test_reject_malformed() {
        // 测试场景：空串、空白、相对路径、非法URL均视为畸形
        assert!(Location::parse("").is_none());
        assert!(Location::parse("cards/5").is_none());
        assert!(Location::parse("https://exa mple.com/").is_none());
        assert!(Location::parse("http://[::1").is_none());
        assert!(Location::parse("mailto:someone@example.com").is_none());
        assert!(Location::parse("//cdn.example.com/x").is_none());
    }
}
