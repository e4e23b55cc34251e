//! 特异性评分
//! 纯函数：相同 (模式, 地址) 永远得到相同分数，是并列裁决的唯一输入

use crate::compiler::CompiledPattern;
use crate::core::PatternProfile;

/// 每个字面量路径段加分
pub const SEGMENT_WEIGHT: i64 = 100;
/// 必需查询约束加分
pub const QUERY_BONUS: i64 = 50;
/// 每个通配/贪婪量词扣分
pub const WILDCARD_PENALTY: i64 = 20;
/// 字面量长度加分上限（每个字符 1 分）
pub const LENGTH_BONUS_CAP: i64 = 48;
/// 每个锚定端加分
pub const ANCHOR_BONUS: i64 = 5;
/// 匹配覆盖整个目标时加分（仅在提供地址时生效）
pub const FULL_MATCH_BONUS: i64 = 10;

/// 仅基于结构画像的静态评分
pub fn score_profile(profile: &PatternProfile) -> i64 {
    let mut score = i64::from(profile.literal_segments) * SEGMENT_WEIGHT;
    if profile.has_query_constraint {
        score += QUERY_BONUS;
    }
    score -= i64::from(profile.wildcards) * WILDCARD_PENALTY;
    score += i64::from(profile.literal_chars).min(LENGTH_BONUS_CAP);
    if profile.anchored_start {
        score += ANCHOR_BONUS;
    }
    if profile.anchored_end {
        score += ANCHOR_BONUS;
    }
    score
}

/// 计算模式特异性，提供地址时对整段覆盖的匹配额外加分
pub fn compute_specificity(pattern: &CompiledPattern, url: Option<&str>) -> i64 {
    let mut score = score_profile(&pattern.profile);
    if let Some(url) = url {
        if pattern.covers_whole_target(url) {
            score += FULL_MATCH_BONUS;
        }
    }
    score
}
