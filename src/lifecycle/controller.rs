//! 生命周期控制器：每次触发时计算匹配、按特异性排序、应用互斥、驱动 init/cleanup

use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashSet;
use tokio::sync::{Mutex as AsyncMutex, RwLock as AsyncRwLock};
use tokio::task::JoinError;

use crate::config::DispatchConfig;
use crate::detector::{
    ChangeDetector, ChangeListener, ChangeSource, DetectorHandle, LocationProvider, PollingSource,
};
use crate::error::PageFeatError;
use crate::feature::{FeatureFailure, FeatureHandler, FeatureOutcome, MatchContext};
use crate::health::{HealthReporter, HealthStatus, Operation};
use crate::lifecycle::scan::{collect_matches, FailedFeature, ScanReport};
use crate::lifecycle::state::{ActiveFeatureSet, FeatureEntry, FeatureState};
use crate::registry::FeatureRegistry;
use crate::utils::{panic_message, preview_url};

type SharedFeatureSet = Arc<RwLock<ActiveFeatureSet>>;

/// 生命周期控制器
pub struct LifecycleController {
    registry: Arc<FeatureRegistry>,
    health: Arc<HealthReporter>,
    config: DispatchConfig,
    /// 串行化扫描
    pass_lock: AsyncMutex<()>,
    features: SharedFeatureSet,
    /// 回调任务持有读锁；扫描开始前取一次写锁，等待被放弃的回调任务落定
    inflight: Arc<AsyncRwLock<()>>,
    last_url: RwLock<Option<String>>,
    generation: Arc<AtomicU64>,
}

impl LifecycleController {
    pub fn new(registry: Arc<FeatureRegistry>, config: DispatchConfig) -> Self {
        registry.warn_dangling_exclusions();
        let health = Arc::new(HealthReporter::new(&config));
        Self {
            registry,
            health,
            config,
            pass_lock: AsyncMutex::new(()),
            features: Arc::new(RwLock::new(ActiveFeatureSet::new())),
            inflight: Arc::new(AsyncRwLock::new(())),
            last_url: RwLock::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    pub fn health(&self) -> &Arc<HealthReporter> {
        &self.health
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// 启动：先扫描当前地址，再启动变更检测
    /// 地址轮询总是启用，`sources` 为额外的信号源（如结构变更）
    pub async fn init(
        self: &Arc<Self>,
        location: Arc<dyn LocationProvider>,
        sources: Vec<Box<dyn ChangeSource>>,
    ) -> DetectorHandle {
        let url = location.current_url();
        let report = self.check_page(&url).await;
        info!(
            "启动完成：{} 激活 {} 个功能，{} 个失败",
            preview_url(&url),
            report.activated.len(),
            report.failed.len()
        );

        let polling = PollingSource::new(location.clone(), self.config.poll_interval()).with_baseline(url.clone());
        let mut detector = ChangeDetector::new(self.config.clone(), location).with_source(Box::new(polling));
        for source in sources {
            detector = detector.with_source(source);
        }
        detector.start(self.clone(), Some(url))
    }

    /// 停止变更检测并结束会话：清理全部功能
    pub async fn shutdown(&self, handle: DetectorHandle) -> Vec<String> {
        handle.stop().await;
        self.teardown().await
    }

    /// 结束会话，不涉及变更检测
    pub async fn teardown(&self) -> Vec<String> {
        let _pass = self.pass_lock.lock().await;
        self.settle_inflight().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cleaned = self.teardown_features(generation).await;
        *self.last_url.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("会话结束，清理了 {} 个功能", cleaned.len());
        cleaned
    }

    /// 针对一个地址执行一次扫描；功能失败不会作为错误返回
    /// 扫描中途被取消时，已发起的回调仍会完成并写回状态
    pub async fn check_page(&self, url: &str) -> ScanReport {
        let _pass = self.pass_lock.lock().await;
        self.settle_inflight().await;

        let navigated = self.current_url().as_deref() != Some(url);
        let generation = if navigated {
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.generation()
        };
        let mut report = ScanReport::new(url, navigated, generation);

        if navigated {
            debug!("导航到 {}，代数 {}", preview_url(url), generation);
            report.cleaned_up = self.teardown_features(generation).await;
            *self.last_url.write().unwrap_or_else(PoisonError::into_inner) = Some(url.to_string());
        }

        report.matches = collect_matches(&self.registry, url);
        let mut skip: FxHashSet<String> = FxHashSet::default();

        for matched in &report.matches {
            let name = matched.feature_name.as_str();
            if skip.contains(name) {
                debug!("功能 [{}] 被互斥规则压制", name);
                report.excluded.push(name.to_string());
                continue;
            }
            let Some(descriptor) = self.registry.lookup(name) else {
                continue;
            };

            match self.feature_state(name) {
                FeatureState::Active => {
                    skip.extend(descriptor.excludes().iter().cloned());
                    report.retained.push(name.to_string());
                    continue;
                }
                FeatureState::Error => {
                    report.retained.push(name.to_string());
                    continue;
                }
                _ => {}
            }

            let ctx = MatchContext::new(
                name,
                url,
                matched.capture_groups.clone(),
                matched.specificity_score,
                self.generation.clone(),
            );
            let Some(outcome) = self.run_init(name, descriptor.handler().clone(), ctx, generation).await else {
                continue;
            };

            match outcome {
                Ok(()) => {
                    skip.extend(descriptor.excludes().iter().cloned());
                    debug!("功能 [{}] 已激活，特异性 {}", name, matched.specificity_score);
                    report.activated.push(name.to_string());
                }
                Err(failure) => {
                    report.failed.push(FailedFeature {
                        feature_name: name.to_string(),
                        failure,
                    });
                }
            }
        }

        report
    }

    /// 进入 Initializing 后立即派生任务执行 init 并写回 Active/Error
    /// 状态转换与派生之间没有 await 点；非法转换返回 None
    async fn run_init(
        &self,
        name: &str,
        handler: Arc<dyn FeatureHandler>,
        ctx: MatchContext,
        generation: u64,
    ) -> Option<FeatureOutcome> {
        let settle = self.inflight.clone().read_owned().await;
        if let Err(e) = self.transition(name, FeatureState::Initializing, generation) {
            error!("{}", e);
            return None;
        }

        let features = self.features.clone();
        let health = self.health.clone();
        let name = name.to_string();
        let task = tokio::spawn(async move {
            let _settle = settle;
            let outcome = health.measure(&name, Operation::Init, invoke_init(handler, ctx)).await;
            let next = match &outcome {
                Ok(()) => FeatureState::Active,
                Err(failure) => {
                    let err = PageFeatError::InitializationError {
                        feature: name.clone(),
                        detail: failure.to_string(),
                    };
                    warn!("{}", err);
                    FeatureState::Error
                }
            };
            if let Err(e) = write_set(&features).transition(&name, next, generation) {
                error!("{}", e);
            }
            outcome
        });
        Some(join_outcome(task.await))
    }

    /// 进入 Deactivating 后派生任务执行 cleanup 并移出集合
    async fn run_cleanup(&self, name: &str, handler: Arc<dyn FeatureHandler>, generation: u64) -> bool {
        let settle = self.inflight.clone().read_owned().await;
        if let Err(e) = self.transition(name, FeatureState::Deactivating, generation) {
            error!("{}", e);
            return false;
        }

        let features = self.features.clone();
        let health = self.health.clone();
        let name = name.to_string();
        let task_name = name.clone();
        let task = tokio::spawn(async move {
            let name = task_name;
            let _settle = settle;
            let outcome = health.measure(&name, Operation::Cleanup, invoke_cleanup(handler)).await;
            if let Err(failure) = outcome {
                let err = PageFeatError::CleanupError {
                    feature: name.clone(),
                    detail: failure.to_string(),
                };
                warn!("{}", err);
            }
            if let Err(e) = write_set(&features).transition(&name, FeatureState::Inactive, generation) {
                error!("{}", e);
            }
        });
        if let Err(e) = task.await {
            error!("功能 [{}] 清理任务异常退出：{}", name, e);
        }
        true
    }

    /// 等待所有被放弃的回调任务结束
    async fn settle_inflight(&self) {
        drop(self.inflight.write().await);
    }

    /// 按激活顺序逆序清理所有 Initializing/Active/Error 功能，然后清空集合
    async fn teardown_features(&self, generation: u64) -> Vec<String> {
        let order = self.read_features().teardown_order();
        let mut cleaned = Vec::with_capacity(order.len());

        for name in order {
            let Some(descriptor) = self.registry.lookup(&name) else {
                continue;
            };
            if self.run_cleanup(&name, descriptor.handler().clone(), generation).await {
                cleaned.push(name);
            }
        }

        self.write_features().clear();
        cleaned
    }

    /// 当前 Active 的功能
    pub fn get_active_features(&self) -> BTreeSet<String> {
        self.read_features().active_names()
    }

    pub fn feature_state(&self, name: &str) -> FeatureState {
        self.read_features().state_of(name)
    }

    /// 活跃集合快照
    pub fn feature_entries(&self) -> BTreeMap<String, FeatureEntry> {
        self.read_features().snapshot()
    }

    /// 所有已注册功能的健康视图
    pub fn get_health_status(&self) -> BTreeMap<String, HealthStatus> {
        let features = self.read_features();
        self.registry
            .names()
            .map(|name| {
                let mut status = self.health.status(name);
                status.state = features.state_of(name);
                (name.to_string(), status)
            })
            .collect()
    }

    pub fn current_url(&self) -> Option<String> {
        self.last_url.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn transition(&self, name: &str, to: FeatureState, generation: u64) -> Result<(), PageFeatError> {
        self.write_features().transition(name, to, generation)
    }

    fn read_features(&self) -> RwLockReadGuard<'_, ActiveFeatureSet> {
        self.features.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_features(&self) -> RwLockWriteGuard<'_, ActiveFeatureSet> {
        write_set(&self.features)
    }
}

fn write_set(features: &RwLock<ActiveFeatureSet>) -> RwLockWriteGuard<'_, ActiveFeatureSet> {
    features.write().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ChangeListener for LifecycleController {
    async fn on_location_change(&self, url: &str) {
        let report = self.check_page(url).await;
        debug!(
            "地址变更 {}：激活 {:?}，清理 {:?}",
            preview_url(url),
            report.activated,
            report.cleaned_up
        );
    }
}

/// 回调在独立任务中执行并立即等待，panic 被收敛为 Panicked
async fn invoke_init(handler: Arc<dyn FeatureHandler>, ctx: MatchContext) -> FeatureOutcome {
    join_outcome(tokio::spawn(async move { handler.init(ctx).await }).await)
}

async fn invoke_cleanup(handler: Arc<dyn FeatureHandler>) -> FeatureOutcome {
    join_outcome(tokio::spawn(async move { handler.cleanup().await }).await)
}

fn join_outcome(joined: Result<FeatureOutcome, JoinError>) -> FeatureOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => Err(FeatureFailure::panicked(panic_message(e.into_panic()))),
        Err(e) => Err(FeatureFailure::aborted(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::SharedLocation;
    use crate::feature::{FailureKind, FeatureDescriptor};
    use std::sync::Mutex;
    use std::time::Duration;

    /// 记录回调调用顺序
    #[derive(Clone, Default)]
    struct CallLog(Arc<Mutex<Vec<String>>>);

    impl CallLog {
        fn push(&self, entry: String) {
            self.0.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn count(&self, entry: &str) -> usize {
            self.entries().iter().filter(|e| e.as_str() == entry).count()
        }
    }

    fn tracked(name: &str, pattern: &str, log: &CallLog) -> crate::feature::FeatureDescriptorBuilder {
        let init_log = log.clone();
        let cleanup_log = log.clone();
        let init_name = name.to_string();
        let cleanup_name = name.to_string();
        FeatureDescriptor::builder(name)
            .pattern(pattern)
            .on_init(move |ctx: MatchContext| {
                let log = init_log.clone();
                let entry = format!("init:{}:{}", init_name, ctx.captures().join(","));
                async move {
                    log.push(entry);
                    Ok(())
                }
            })
            .on_cleanup(move || {
                let log = cleanup_log.clone();
                let entry = format!("cleanup:{}", cleanup_name);
                async move {
                    log.push(entry);
                    Ok(())
                }
            })
    }

    fn controller(features: Vec<FeatureDescriptor>) -> LifecycleController {
        let registry = FeatureRegistry::with_features(features).unwrap();
        LifecycleController::new(Arc::new(registry), DispatchConfig::default())
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_more_specific_feature_excludes_generic_one() {
        // 测试场景：A=/cards/(id)/，B=/cards/(id)/settings 且 B 互斥 A
        let log = CallLog::default();
        let controller = controller(vec![
            tracked("A", r"/cards/(\d+)/", &log).build().unwrap(),
            tracked("B", r"/cards/(\d+)/settings", &log).exclude("A").build().unwrap(),
        ]);

        let report = controller.check_page("https://board.example.com/cards/5/settings").await;
        assert_eq!(names(&controller.get_active_features()), vec!["B"]);
        assert_eq!(report.activated, vec!["B"]);
        assert_eq!(report.excluded, vec!["A"]);
        assert_eq!(log.entries(), vec!["init:B:5"]);
    }

    #[tokio::test]
    async fn test_unrelated_url_activates_nothing() {
        let log = CallLog::default();
        let controller = controller(vec![
            tracked("A", r"/cards/(\d+)", &log).build().unwrap(),
            tracked("B", r"/boards/(\d+)", &log).build().unwrap(),
            tracked("C", "glob:/members/*", &log).build().unwrap(),
        ]);

        let report = controller.check_page("https://board.example.com/unrelated/path").await;
        assert!(controller.get_active_features().is_empty());
        assert!(report.matches.is_empty());
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_cleans_up_exactly_once() {
        let log = CallLog::default();
        let controller = controller(vec![tracked("A", r"/cards/(\d+)", &log).build().unwrap()]);

        controller.check_page("https://board.example.com/cards/1").await;
        assert_eq!(names(&controller.get_active_features()), vec!["A"]);

        let report = controller.check_page("https://board.example.com/home").await;
        assert_eq!(report.cleaned_up, vec!["A"]);
        assert!(controller.get_active_features().is_empty());
        assert_eq!(log.count("cleanup:A"), 1);

        // 再次扫描同一地址不会重复清理
        controller.check_page("https://board.example.com/home").await;
        assert_eq!(log.count("cleanup:A"), 1);
    }

    #[tokio::test]
    async fn test_equal_specificity_activates_in_registration_order() {
        let log = CallLog::default();
        let controller = controller(vec![
            tracked("first", r"/lists/(\d+)", &log).build().unwrap(),
            tracked("second", r"/lists/(\d+)", &log).build().unwrap(),
        ]);

        let report = controller.check_page("/lists/9").await;
        assert_eq!(report.activated, vec!["first", "second"]);
        assert_eq!(log.entries(), vec!["init:first:9", "init:second:9"]);
    }

    #[tokio::test]
    async fn test_repeated_url_is_idempotent() {
        let log = CallLog::default();
        let controller = controller(vec![
            tracked("card", r"/cards/(\d+)", &log).build().unwrap(),
            tracked("settings", r"/cards/(\d+)/settings", &log).exclude("card").build().unwrap(),
        ]);

        let url = "/cards/3/settings";
        let first = controller.check_page(url).await;
        let generation = controller.generation();
        let second = controller.check_page(url).await;

        assert!(first.navigated);
        assert!(!second.navigated);
        assert!(second.activated.is_empty());
        assert_eq!(second.excluded, vec!["card"]);
        assert_eq!(controller.generation(), generation);
        assert_eq!(log.count("init:settings:3"), 1);
        assert_eq!(names(&controller.get_active_features()), vec!["settings"]);
    }

    #[tokio::test]
    async fn test_failing_init_only_marks_that_feature() {
        let log = CallLog::default();
        let broken = FeatureDescriptor::builder("broken")
            .pattern(r"/cards/(\d+)/settings")
            .on_init(|_ctx: MatchContext| async { Err(FeatureFailure::failed("selector missing")) })
            .build()
            .unwrap();
        let controller = controller(vec![broken, tracked("card", r"/cards/(\d+)", &log).build().unwrap()]);

        let report = controller.check_page("/cards/4/settings").await;
        assert_eq!(report.failed_names(), vec!["broken"]);
        assert_eq!(controller.feature_state("broken"), FeatureState::Error);
        assert_eq!(controller.feature_state("card"), FeatureState::Active);

        let health = controller.get_health_status();
        assert!(!health["broken"].is_healthy);
        assert_eq!(health["broken"].state, FeatureState::Error);
        assert!(health["card"].is_healthy);

        // 同一地址重复扫描不会再次初始化失败的功能
        let again = controller.check_page("/cards/4/settings").await;
        assert!(again.failed.is_empty());
        assert_eq!(controller.get_health_status()["broken"].error_count, 1);
    }

    #[tokio::test]
    async fn test_panicking_init_is_contained() {
        let panicky = FeatureDescriptor::builder("panicky")
            .pattern(r"/cards/(\d+)")
            .on_init(|ctx: MatchContext| async move {
                assert!(ctx.capture(0).is_none(), "init exploded");
                Ok(())
            })
            .build()
            .unwrap();
        let log = CallLog::default();
        let controller = controller(vec![panicky, tracked("card", r"/cards/(\d+)", &log).build().unwrap()]);

        let report = controller.check_page("/cards/1").await;
        assert_eq!(report.failed[0].failure.kind, FailureKind::Panicked);
        assert!(report.failed[0].failure.detail.contains("init exploded"));
        assert_eq!(report.activated, vec!["card"]);
    }

    #[tokio::test]
    async fn test_error_feature_gets_cleanup_on_navigation() {
        let log = CallLog::default();
        let cleanup_log = log.clone();
        let broken = FeatureDescriptor::builder("broken")
            .pattern(r"/cards/(\d+)")
            .on_init(|_ctx: MatchContext| async { Err(FeatureFailure::failed("nope")) })
            .on_cleanup(move || {
                let log = cleanup_log.clone();
                async move {
                    log.push("cleanup:broken".to_string());
                    Ok(())
                }
            })
            .build()
            .unwrap();
        let controller = controller(vec![broken]);

        controller.check_page("/cards/1").await;
        controller.check_page("/cards/2").await;
        // 第二次导航先清理再重新初始化（再次失败）
        assert_eq!(log.count("cleanup:broken"), 1);
        assert_eq!(controller.feature_state("broken"), FeatureState::Error);
    }

    #[tokio::test]
    async fn test_cleanup_runs_in_reverse_activation_order() {
        let log = CallLog::default();
        let controller = controller(vec![
            tracked("outer", r"/boards/(\d+)", &log).build().unwrap(),
            tracked("inner", r"/boards/(\d+)/lists", &log).build().unwrap(),
        ]);

        controller.check_page("/boards/1/lists").await;
        let cleaned = controller.teardown().await;
        assert_eq!(cleaned, vec!["outer", "inner"]);
        assert!(controller.feature_entries().is_empty());
        assert_eq!(controller.current_url(), None);
    }

    #[tokio::test]
    async fn test_failed_cleanup_still_deactivates() {
        let failing = FeatureDescriptor::builder("sticky")
            .pattern(r"/cards/(\d+)")
            .on_init(|_ctx: MatchContext| async { Ok(()) })
            .on_cleanup(|| async { Err(FeatureFailure::failed("detach failed")) })
            .build()
            .unwrap();
        let controller = controller(vec![failing]);

        controller.check_page("/cards/1").await;
        let report = controller.check_page("/home").await;
        assert_eq!(report.cleaned_up, vec!["sticky"]);
        assert_eq!(controller.feature_state("sticky"), FeatureState::Inactive);
        assert_eq!(controller.get_health_status()["sticky"].error_count, 1);
    }

    #[tokio::test]
    async fn test_context_reports_staleness_after_navigation() {
        let captured: Arc<Mutex<Option<MatchContext>>> = Arc::default();
        let slot = captured.clone();
        let feature = FeatureDescriptor::builder("card")
            .pattern(r"/cards/(\d+)")
            .on_init(move |ctx: MatchContext| {
                let slot = slot.clone();
                async move {
                    *slot.lock().unwrap() = Some(ctx);
                    Ok(())
                }
            })
            .build()
            .unwrap();
        let controller = controller(vec![feature]);

        controller.check_page("/cards/1").await;
        let ctx = captured.lock().unwrap().take().unwrap();
        assert!(!ctx.is_stale());
        assert_eq!(ctx.capture(0), Some("1"));

        controller.check_page("/home").await;
        assert!(ctx.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bootstrap_follows_navigation_until_shutdown() {
        // 不提供任何额外信号源，依靠内置的地址轮询跟随导航
        let log = CallLog::default();
        let controller = Arc::new(controller(vec![tracked("card", r"/cards/(\d+)", &log).build().unwrap()]));
        let location = SharedLocation::new("/cards/1");

        let handle = controller.init(Arc::new(location.clone()), Vec::new()).await;
        assert_eq!(names(&controller.get_active_features()), vec!["card"]);

        location.set("/cards/2");
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(controller.current_url().as_deref(), Some("/cards/2"));
        assert_eq!(log.entries(), vec!["init:card:1", "cleanup:card", "init:card:2"]);

        let cleaned = controller.shutdown(handle).await;
        assert_eq!(cleaned, vec!["card"]);
        assert!(controller.get_active_features().is_empty());
    }

    fn slow_card(log: &CallLog) -> FeatureDescriptor {
        let init_log = log.clone();
        let cleanup_log = log.clone();
        FeatureDescriptor::builder("card")
            .pattern(r"/cards/(\d+)")
            .on_init(move |_ctx: MatchContext| {
                let log = init_log.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    log.push("init:card".to_string());
                    Ok(())
                }
            })
            .on_cleanup(move || {
                let log = cleanup_log.clone();
                async move {
                    log.push("cleanup:card".to_string());
                    Ok(())
                }
            })
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_pass_still_settles_feature_state() {
        let log = CallLog::default();
        let controller = controller(vec![slow_card(&log)]);

        let cancelled = tokio::time::timeout(Duration::from_millis(10), controller.check_page("/cards/1")).await;
        assert!(cancelled.is_err());

        // 同一地址再次扫描：等待被放弃的 init 完成，功能已是 Active，不会重复初始化
        let report = controller.check_page("/cards/1").await;
        assert_eq!(controller.feature_state("card"), FeatureState::Active);
        assert!(report.activated.is_empty());
        assert_eq!(report.retained, vec!["card"]);
        assert_eq!(log.count("init:card"), 1);

        let report = controller.check_page("/home").await;
        assert_eq!(report.cleaned_up, vec!["card"]);
        assert_eq!(log.count("cleanup:card"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_after_cancelled_pass_cleans_up_before_reinit() {
        let log = CallLog::default();
        let controller = controller(vec![slow_card(&log)]);

        let cancelled = tokio::time::timeout(Duration::from_millis(10), controller.check_page("/cards/1")).await;
        assert!(cancelled.is_err());

        let report = controller.check_page("/cards/2").await;
        assert_eq!(report.cleaned_up, vec!["card"]);
        assert_eq!(report.activated, vec!["card"]);
        assert_eq!(log.entries(), vec!["init:card", "cleanup:card", "init:card"]);
    }
}
