use serde::{Deserialize, Serialize};

/// 模式结构画像（编译期从正则HIR提取）
/// 评分与校验告警都只依赖这份画像
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternProfile {
    /// 纯字面量路径段数量（以`/`切分后完全由字面量组成的非空段）
    pub literal_segments: u32,
    /// 字面量字符总数
    pub literal_chars: u32,
    /// 通配/贪婪量词数量（`.*`、`+`、宽字符类等）
    pub wildcards: u32,
    /// 是否包含必需的查询参数约束（字面量 `?key`）
    pub has_query_constraint: bool,
    /// 捕获组数量
    pub captures: u32,
    /// 起始锚定
    pub anchored_start: bool,
    /// 结束锚定
    pub anchored_end: bool,
}

impl PatternProfile {
    /// 通配符是否主导整个模式
    /// 通配数量超过字面量路径段数量，且字面量字符不足以撑起模式时视为主导
    pub fn wildcard_dominant(&self) -> bool {
        self.wildcards > 0
            && self.wildcards > self.literal_segments
            && self.literal_chars < self.wildcards * 4
    }
}
