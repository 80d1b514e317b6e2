//! 日志工具模块
//!
//! 日志初始化和统一格式的横幅输出

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::workflow::HarvestStats;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，开启详细日志时为 `debug`。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // 重复初始化（例如测试中）时忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 京东商家后台当日订单抓取");
    info!(
        "⏰ 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 首页: {}", config.browser.home_url);
    match &config.sink.url {
        Some(url) => info!("📤 推送地址: {}", url),
        None => info!("📤 输出文件: {}", config.sink.output_file),
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &HarvestStats) {
    info!("{}", "=".repeat(60));
    info!("📊 抓取完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 页数: {}", stats.pages);
    info!("✅ 已推送: {}", stats.emitted);
    info!("⏭️ 跳过: {}", stats.skipped);
    info!("❌ 推送失败: {}", stats.sink_failures);
    info!("{}", "=".repeat(60));
}
