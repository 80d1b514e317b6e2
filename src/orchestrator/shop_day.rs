//! 店铺当日订单 - 编排层
//!
//! 检查登录 → 关闭公告 → 进入订单查询 → 逐页抓取，直到遇到非今天的订单。

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::clients::{CaptchaDecoder, OrderSink};
use crate::config::{Config, Timings};
use crate::infrastructure::wait::{wait_more_than, wait_present, wait_text_changed, wait_visible};
use crate::infrastructure::PortalPage;
use crate::services::login::SHOP_NAME;
use crate::services::{DetailReader, LoginFlow};
use crate::workflow::harvest::{FIRST_ORDER_ID, ORDER_ROWS};
use crate::workflow::{DayHarvest, HarvestStats, PageOutcome};

/// 已登录时页面上的"退出"链接
pub const LOGOUT_LINK: &str = "//a[contains(text(),'退出')]";
pub const ANNOUNCE_CLOSE: &str = "div.news-announce i.el-dialog__close";
pub const ORDER_MENU: &str =
    "//div[@class='shop-pageframe-sidebar__fixed-list']//span[contains(text(),'订单查询与跟踪')]";
pub const NEXT_PAGE: &str = "li.ivu-page-next:not(.ivu-page-disabled)";

/// 表头 + 至少两条订单才算列表加载完成
const LIST_READY_ROWS: usize = 2;

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopDayOutcome {
    /// 登录失败，没有做任何后续操作
    LoginFailed,
    Finished(HarvestStats),
}

/// 店铺当日订单抓取
pub struct ShopDay {
    login: LoginFlow,
    harvest: DayHarvest,
    timings: Timings,
    max_pages: usize,
}

impl ShopDay {
    pub fn new(
        config: &Config,
        decoder: Arc<dyn CaptchaDecoder>,
        sink: Arc<dyn OrderSink>,
        today: NaiveDate,
    ) -> Self {
        let timings = config.timings.clone();
        let reader = DetailReader::new(
            timings.element(),
            timings.element(),
            timings.mobile_reveal_pause(),
        );
        Self {
            login: LoginFlow::new(config, decoder),
            harvest: DayHarvest::new(reader, sink, today),
            timings,
            max_pages: config.harvest.max_pages,
        }
    }

    /// 已登录直接返回 true，否则执行登录
    pub async fn ensure_login(&self, page: &dyn PortalPage) -> Result<bool> {
        if wait_visible(page, LOGOUT_LINK, self.timings.element()).await {
            info!("✓ 已处于登录状态");
            return Ok(true);
        }
        info!("🔐 未登录，开始登录");
        self.login.run(page).await
    }

    pub async fn run(mut self, page: &dyn PortalPage) -> Result<ShopDayOutcome> {
        if !self.ensure_login(page).await? {
            return Ok(ShopDayOutcome::LoginFailed);
        }

        if wait_present(page, ANNOUNCE_CLOSE, self.timings.quick()).await {
            debug!("关闭公告弹窗");
            page.click(ANNOUNCE_CLOSE).await?;
        }

        if !page.click(ORDER_MENU).await? {
            bail!("找不到订单查询菜单");
        }
        if !wait_more_than(page, ORDER_ROWS, LIST_READY_ROWS, self.timings.list()).await {
            debug!("订单列表加载等待超时，继续处理");
        }

        let shop_name = page.text(SHOP_NAME).await?.unwrap_or_default();
        info!("🏪 店铺: {}", shop_name);

        let mut outcome = self.harvest.parse_today(&shop_name, page).await?;
        while outcome == PageOutcome::Continue {
            if self.harvest.stats().pages >= self.max_pages {
                warn!("⚠️ 已达到最大翻页数 {}，停止", self.max_pages);
                break;
            }
            if !self.next_page(page).await? {
                info!("已是最后一页");
                break;
            }
            outcome = self.harvest.parse_today(&shop_name, page).await?;
        }

        Ok(ShopDayOutcome::Finished(self.harvest.into_stats()))
    }

    /// 点击下一页并等待列表刷新，没有下一页时返回 false
    async fn next_page(&self, page: &dyn PortalPage) -> Result<bool> {
        let first_id = page.text(FIRST_ORDER_ID).await?.unwrap_or_default();
        if !page.click(NEXT_PAGE).await? {
            return Ok(false);
        }

        let list_wait = self.timings.list();
        if !wait_text_changed(page, FIRST_ORDER_ID, &first_id, list_wait).await {
            debug!("翻页后第一条订单没有变化");
        }
        if !wait_more_than(page, ORDER_ROWS, LIST_READY_ROWS, list_wait).await {
            debug!("翻页后订单数量不足 {} 条", LIST_READY_ROWS);
        }
        Ok(true)
    }
}
