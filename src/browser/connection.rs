use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info};

use crate::error::{AppError, BrowserError};

/// 连接到已运行的浏览器，优先复用已打开的商家后台页面
pub async fn connect_to_browser_and_page(port: u16, home_url: &str) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            if url.starts_with(home_url) {
                info!("✓ 复用已打开的页面: {}", url);
                return Ok((browser, p.clone()));
            }
        }
    }

    debug!("创建新页面并导航到: {}", home_url);
    let page = browser
        .new_page(home_url)
        .await
        .map_err(|source| BrowserError::NavigationFailed {
            url: home_url.to_string(),
            source,
        })?;
    info!("已导航到: {}", home_url);
    Ok((browser, page))
}
