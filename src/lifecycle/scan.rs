//! 单次扫描：匹配结果计算 + 排序，以及扫描报告

use serde::Serialize;

use crate::feature::FeatureFailure;
use crate::registry::FeatureRegistry;

/// 单个功能的匹配结果，每次扫描重新生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub feature_name: String,
    pub capture_groups: Vec<String>,
    pub specificity_score: i64,
    pub registration_index: usize,
}

/// 初始化失败的功能
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFeature {
    pub feature_name: String,
    pub failure: FeatureFailure,
}

/// 一次 check_page 的结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub url: String,
    /// 与上次扫描的地址不同
    pub navigated: bool,
    pub generation: u64,
    /// 排序后的全部匹配
    pub matches: Vec<MatchResult>,
    /// 本次新激活（按激活顺序）
    pub activated: Vec<String>,
    /// 已处于 Active/Error 而跳过
    pub retained: Vec<String>,
    /// 被互斥规则压制
    pub excluded: Vec<String>,
    pub failed: Vec<FailedFeature>,
    /// 导航时被清理（按清理顺序）
    pub cleaned_up: Vec<String>,
}

impl ScanReport {
    pub(crate) fn new(url: &str, navigated: bool, generation: u64) -> Self {
        Self {
            url: url.to_string(),
            navigated,
            generation,
            ..Self::default()
        }
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.feature_name.as_str()).collect()
    }
}

/// 计算所有匹配并按特异性降序排列，同分保持注册顺序
pub fn collect_matches(registry: &FeatureRegistry, url: &str) -> Vec<MatchResult> {
    let mut matches: Vec<MatchResult> = registry
        .entries()
        .filter_map(|(idx, descriptor, compiled)| {
            compiled.match_and_capture(url).map(|captures| MatchResult {
                feature_name: descriptor.name().to_string(),
                capture_groups: captures,
                specificity_score: compiled.specificity(Some(url)),
                registration_index: idx,
            })
        })
        .collect();
    // sort_by 为稳定排序
    matches.sort_by(|a, b| b.specificity_score.cmp(&a.specificity_score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{FeatureDescriptor, MatchContext};

    fn feature(name: &str, pattern: &str) -> FeatureDescriptor {
        FeatureDescriptor::builder(name)
            .pattern(pattern)
            .on_init(|_ctx: MatchContext| async { Ok(()) })
            .build()
            .unwrap()
    }

    #[test]
    fn test_matches_sorted_by_specificity() {
        let registry = FeatureRegistry::with_features(vec![
            feature("card", r"/c/([A-Za-z0-9]+)"),
            feature("card_settings", r"/c/([A-Za-z0-9]+)/settings"),
            feature("board", r"/b/([A-Za-z0-9]+)"),
        ])
        .unwrap();

        let matches = collect_matches(&registry, "https://example.com/c/x1/settings");
        let names: Vec<_> = matches.iter().map(|m| m.feature_name.as_str()).collect();
        assert_eq!(names, vec!["card_settings", "card"]);
        assert_eq!(matches[0].capture_groups, vec!["x1".to_string()]);
        assert_eq!(matches[0].registration_index, 1);
        assert!(collect_matches(&registry, "https://example.com/home").is_empty());
    }

    #[test]
    fn test_equal_scores_keep_registration_order() {
        let registry = FeatureRegistry::with_features(vec![
            feature("second", r"/p/(\d+)"),
            feature("first", r"/p/(\d+)"),
        ])
        .unwrap();
        let matches = collect_matches(&registry, "/p/7");
        assert_eq!(matches[0].specificity_score, matches[1].specificity_score);
        assert_eq!(matches[0].feature_name, "second");
        assert_eq!(matches[1].feature_name, "first");
    }
}
