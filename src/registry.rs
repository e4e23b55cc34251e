//! 功能注册表：启动期构建，之后只读

use log::{debug, warn};
use pagefeat_engine::{CompiledPattern, PatternMatcher};
use rustc_hash::FxHashMap;

use crate::error::{FeatResult, PageFeatError};
use crate::feature::FeatureDescriptor;

/// 功能注册表
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    /// 按注册顺序保存
    descriptors: Vec<FeatureDescriptor>,
    /// 与 descriptors 一一对应的编译结果
    compiled: Vec<CompiledPattern>,
    /// 名称 -> 注册序号
    positions: FxHashMap<String, usize>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 批量注册，任一失败即返回错误
    pub fn with_features<I>(descriptors: I) -> FeatResult<Self>
    where
        I: IntoIterator<Item = FeatureDescriptor>,
    {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        registry.warn_dangling_exclusions();
        Ok(registry)
    }

    /// 注册一个功能
    pub fn register(&mut self, descriptor: FeatureDescriptor) -> FeatResult<()> {
        let name = descriptor.name();
        if name.trim().is_empty() {
            return Err(PageFeatError::ValidationError("功能缺少名称".to_string()));
        }
        if self.positions.contains_key(name) {
            return Err(PageFeatError::DuplicateNameError(name.to_string()));
        }

        let report = PatternMatcher::validate(descriptor.pattern());
        if !report.is_valid {
            return Err(PageFeatError::ValidationError(format!(
                "功能 [{}] 的模式 `{}` 无效：{}",
                name,
                descriptor.pattern(),
                report.error_summary()
            )));
        }
        for warning in &report.warnings {
            warn!("功能 [{}] 模式告警：{}", name, warning);
        }
        if descriptor.excludes().contains(name) {
            warn!("功能 [{}] 声明了对自身的互斥，已忽略", name);
        }

        let compiled = PatternMatcher::compile(descriptor.pattern())?;
        debug!(
            "注册功能 [{}] 模式={} 正则={}",
            name, descriptor.pattern(), compiled.regex_source
        );

        self.positions.insert(name.to_string(), self.descriptors.len());
        self.descriptors.push(descriptor);
        self.compiled.push(compiled);
        Ok(())
    }

    /// 全部描述符（注册顺序）
    pub fn all(&self) -> &[FeatureDescriptor] {
        &self.descriptors
    }

    pub fn lookup(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.position(name).map(|idx| &self.descriptors[idx])
    }

    /// 注册序号
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn compiled(&self, index: usize) -> Option<&CompiledPattern> {
        self.compiled.get(index)
    }

    /// 描述符与编译结果成对迭代
    pub fn entries(&self) -> impl Iterator<Item = (usize, &FeatureDescriptor, &CompiledPattern)> {
        self.descriptors
            .iter()
            .zip(self.compiled.iter())
            .enumerate()
            .map(|(idx, (d, c))| (idx, d, c))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(FeatureDescriptor::name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// 指向未注册功能的互斥声明：(声明方, 目标)
    pub fn dangling_exclusions(&self) -> Vec<(String, String)> {
        self.descriptors
            .iter()
            .flat_map(|d| {
                d.excludes()
                    .iter()
                    .filter(|target| !self.contains(target))
                    .map(move |target| (d.name().to_string(), target.clone()))
            })
            .collect()
    }

    /// 所有功能注册完成后调用，记录悬空的互斥声明
    pub fn warn_dangling_exclusions(&self) {
        for (owner, target) in self.dangling_exclusions() {
            warn!("功能 [{}] 互斥声明指向未注册的功能 [{}]", owner, target);
        }
    }
}
