use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::enums::PatternSyntax;
use crate::error::CoreError;

/// 通配符语法的书写前缀
pub const GLOB_PREFIX: &str = "glob:";

/// 单条原始匹配模式（未编译）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PatternSpec {
    pub source: String,
    #[serde(default)]
    pub syntax: PatternSyntax,
}

impl PatternSpec {
    pub fn regex(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            syntax: PatternSyntax::Regex,
        }
    }

    pub fn glob(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            syntax: PatternSyntax::Glob,
        }
    }

    /// 从书写形式解析：`glob:` 前缀为通配符，其余均视为正则
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix(GLOB_PREFIX) {
            Some(rest) => Self::glob(rest),
            None => Self::regex(text),
        }
    }

    /// 去除首尾空白后是否为空
    pub fn is_blank(&self) -> bool {
        self.source.trim().is_empty()
    }
}

impl FromStr for PatternSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = Self::parse(s);
        if spec.is_blank() {
            return Err(CoreError::EmptyPattern);
        }
        Ok(spec)
    }
}

impl From<&str> for PatternSpec {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for PatternSpec {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl Display for PatternSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.syntax {
            PatternSyntax::Regex => write!(f, "{}", self.source),
            PatternSyntax::Glob => write!(f, "{}{}", GLOB_PREFIX, self.source),
        }
    }
}
