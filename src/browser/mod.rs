//! 浏览器接入
//!
//! 配置了调试端口时连接已运行的浏览器，否则自行启动。

mod connection;
mod headless;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_browser;

use anyhow::Result;
use chromiumoxide::{Browser, Page};

use crate::config::BrowserConfig;

/// 按配置获取浏览器和商家后台页面
pub async fn open_portal(config: &BrowserConfig) -> Result<(Browser, Page)> {
    match config.debug_port {
        Some(port) => connect_to_browser_and_page(port, &config.home_url).await,
        None => launch_browser(config).await,
    }
}
