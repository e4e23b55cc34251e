use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// 模式语法枚举，标记每条模式的书写方式
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatternSyntax {
    /// 正则表达式（默认）
    #[default]
    Regex,
    /// 路径通配符（`*` 单段，`**` 任意）
    Glob,
}

impl Display for PatternSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternSyntax::Regex => write!(f, "regex"),
            PatternSyntax::Glob => write!(f, "glob"),
        }
    }
}

/// 匹配目标：模式作用于地址的哪一部分
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum MatchTarget {
    /// 完整地址字符串
    FullUrl,
    /// 路径 + `?query`
    PathAndQuery,
}

impl MatchTarget {
    /// 按语法确定默认匹配目标
    pub fn for_syntax(syntax: PatternSyntax) -> Self {
        match syntax {
            PatternSyntax::Regex => MatchTarget::FullUrl,
            PatternSyntax::Glob => MatchTarget::PathAndQuery,
        }
    }
}
