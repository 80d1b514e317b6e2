//! 应用入口 - 编排层
//!
//! 1. **应用初始化**：输出启动信息、连接或启动浏览器
//! 2. **组装依赖**：验证码识别客户端、订单推送目标
//! 3. **运行**：交给 `ShopDay` 完成当日订单抓取，输出统计
//!
//! 只有本模块持有 Browser。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{error, info};

use crate::browser;
use crate::clients::{HttpCaptchaDecoder, HttpSink, JsonLinesSink, OrderSink};
use crate::config::{Config, SinkConfig};
use crate::error::AppResult;
use crate::infrastructure::ChromePage;
use crate::orchestrator::shop_day::{ShopDay, ShopDayOutcome};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Arc<Browser>,
    page: ChromePage,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let (browser, page) = browser::open_portal(&config.browser).await?;
        let browser = Arc::new(browser);
        let page = ChromePage::new(browser.clone(), page);

        Ok(Self {
            config,
            _browser: browser,
            page,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ShopDayOutcome> {
        let decoder = Arc::new(HttpCaptchaDecoder::new(
            &self.config.captcha.decoder_url,
            Duration::from_secs(self.config.captcha.request_timeout_secs),
        )?);
        let sink = build_sink(&self.config.sink)?;
        let today = chrono::Local::now().date_naive();
        info!("📅 抓取日期: {}", today.format("%Y-%m-%d"));

        let outcome = ShopDay::new(&self.config, decoder, sink, today)
            .run(&self.page)
            .await?;

        match &outcome {
            ShopDayOutcome::LoginFailed => error!("❌ 登录失败，程序结束"),
            ShopDayOutcome::Finished(stats) => print_final_stats(stats),
        }
        Ok(outcome)
    }
}

/// 配置了推送地址时走 HTTP，否则写本地文件
pub fn build_sink(config: &SinkConfig) -> AppResult<Arc<dyn OrderSink>> {
    match &config.url {
        Some(url) => {
            info!("订单推送到: {}", url);
            let timeout = Duration::from_secs(config.request_timeout_secs);
            Ok(Arc::new(HttpSink::new(url.clone(), timeout)?))
        }
        None => {
            info!("订单写入: {}", config.output_file);
            Ok(Arc::new(JsonLinesSink::new(config.output_file.clone())))
        }
    }
}
