use std::path::Path;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig as LaunchConfig, Page};
use futures::StreamExt;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::config::BrowserConfig;
use crate::error::BrowserError;

/// 启动浏览器并导航到商家后台首页
pub async fn launch_browser(config: &BrowserConfig) -> Result<(Browser, Page)> {
    info!(
        "🚀 启动浏览器 ({})...",
        if config.headless { "无头" } else { "有界面" }
    );

    let mut builder = LaunchConfig::builder();
    builder = if config.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = &config.chrome_executable {
        debug!("浏览器路径: {}", executable);
        builder = builder.chrome_executable(Path::new(executable));
    }
    let launch = builder
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            // 登录框是跨域 iframe，需要和主页面同进程才能进入
            "--disable-site-isolation-trials",
            "--disable-features=IsolateOrigins,site-per-process",
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            BrowserError::LaunchFailed(e)
        })?;

    let (browser, mut handler) = Browser::launch(launch).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed(e.to_string())
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(Duration::from_millis(300)).await;

    let page = browser
        .new_page(config.home_url.as_str())
        .await
        .map_err(|source| BrowserError::NavigationFailed {
            url: config.home_url.clone(),
            source,
        })?;
    info!("✅ 已导航到: {}", config.home_url);

    Ok((browser, page))
}
