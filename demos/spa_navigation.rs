//! 模拟单页应用导航：注册三个功能，依次切换地址，观察激活/互斥/清理与健康数据

use std::sync::Arc;
use std::time::Duration;

use pagefeat::detector::MutationRecord;
use pagefeat::{
    CustomConfigBuilder, FeatureDescriptor, FeatureFailure, FeatureRegistry, LifecycleController,
    LocationProvider, MatchContext, MutationSource, SharedLocation,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let registry = FeatureRegistry::with_features(vec![
        FeatureDescriptor::builder("board_toolbar")
            .pattern(r"/b/([A-Za-z0-9]+)")
            .on_init(|ctx: MatchContext| async move {
                println!("  board_toolbar 初始化，看板 {}", ctx.capture(0).unwrap_or("?"));
                Ok(())
            })
            .on_cleanup(|| async {
                println!("  board_toolbar 清理");
                Ok(())
            })
            .build()?,
        FeatureDescriptor::builder("card_badges")
            .pattern(r"/c/([A-Za-z0-9]+)")
            .on_init(|ctx: MatchContext| async move {
                println!("  card_badges 初始化，卡片 {}", ctx.capture(0).unwrap_or("?"));
                Ok(())
            })
            .build()?,
        FeatureDescriptor::builder("card_settings")
            .pattern("glob:/c/*/settings")
            .exclude("card_badges")
            .on_init(|ctx: MatchContext| async move {
                if ctx.capture(0) == Some("locked") {
                    return Err(FeatureFailure::failed("settings panel is locked"));
                }
                println!("  card_settings 初始化，卡片 {}", ctx.capture(0).unwrap_or("?"));
                Ok(())
            })
            .build()?,
    ])?;

    let config = CustomConfigBuilder::new()
        .poll_interval(Duration::from_millis(100))
        .debounce(Duration::from_millis(30))
        .build();
    let controller = Arc::new(LifecycleController::new(Arc::new(registry), config.clone()));

    let location = SharedLocation::new("https://tracker.example.com/b/roadmap");
    let provider: Arc<dyn LocationProvider> = Arc::new(location.clone());
    let (feed, mutations) = MutationSource::channel(&config.mutation_filter, 32);

    // 地址轮询由 init 内置，这里只补充结构变更信号
    let handle = controller.init(provider, vec![Box::new(mutations)]).await;
    println!("启动后活跃功能：{:?}", controller.get_active_features());

    for url in [
        "https://tracker.example.com/c/k42",
        "https://tracker.example.com/c/k42/settings",
        "https://tracker.example.com/c/locked/settings",
        "https://tracker.example.com/about",
    ] {
        println!("导航到 {}", url);
        location.set(url);
        feed.push(vec![MutationRecord::child_list(Some("content"), 4, 4)]);
        tokio::time::sleep(Duration::from_millis(300)).await;
        println!("活跃功能：{:?}", controller.get_active_features());
    }

    for (name, status) in controller.get_health_status() {
        println!(
            "{}: healthy={} state={} errors={} last_error={:?}",
            name, status.is_healthy, status.state, status.error_count, status.last_error
        );
    }

    controller.shutdown(handle).await;
    println!("{}", controller.health().to_json()?);
    Ok(())
}
