//! 当日订单抓取 - 流程层
//!
//! 定义"一页订单列表"的处理流程：逐行打开详情 → 解析 → 判断日期 → 推送。
//! 列表按下单时间倒序，遇到第一条非今天的订单即认为今天的数据已经取完。

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::clients::OrderSink;
use crate::infrastructure::PortalPage;
use crate::models::OrderRecord;
use crate::services::order_parser::{is_today, parse_detail, strip_label};
use crate::services::{DetailOutcome, DetailReader, SkipReason};

/// 订单列表中的每个订单块，第一个是表头
pub const ORDER_ROWS: &str = "div.shopweb-table-wrapper";
pub const ORDER_LINK: &str = "a.orderid-mr10";
pub const ORDER_TIMES: &str = "span.ml10";
/// 当前页第一条订单的订单号
pub const FIRST_ORDER_ID: &str = "div.shopweb-table-wrapper a.orderid-mr10";

/// 一页处理完后的结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// 本页全是今天的订单，可以继续翻页
    Continue,
    /// 遇到了非今天的订单，停止
    Boundary,
}

/// 单行处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// 已推送
    Emitted,
    /// 解析成功但推送失败
    SinkFailed,
    /// 跳过
    Skipped(SkipReason),
    /// 非今天的订单
    Boundary { created_time: String },
}

/// 抓取统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    pub pages: usize,
    pub emitted: usize,
    pub skipped: usize,
    pub sink_failures: usize,
}

/// 当日订单抓取流程
///
/// - 不持有页面，每次调用由上层传入
/// - 每个详情页打开后无论成功失败都会关闭
pub struct DayHarvest {
    reader: DetailReader,
    sink: Arc<dyn OrderSink>,
    today: NaiveDate,
    stats: HarvestStats,
}

impl DayHarvest {
    pub fn new(reader: DetailReader, sink: Arc<dyn OrderSink>, today: NaiveDate) -> Self {
        Self {
            reader,
            sink,
            today,
            stats: HarvestStats::default(),
        }
    }

    pub fn stats(&self) -> &HarvestStats {
        &self.stats
    }

    pub fn into_stats(self) -> HarvestStats {
        self.stats
    }

    /// 处理当前页的全部订单
    ///
    /// # 参数
    /// - `shop_name`: 店铺名称，写入每条订单
    /// - `page`: 订单列表页
    ///
    /// # 返回
    /// 遇到非今天的订单时返回 `PageOutcome::Boundary`，否则返回 `PageOutcome::Continue`。
    /// 单行出错只跳过该行，列表本身无法读取时才返回错误。
    pub async fn parse_today(&mut self, shop_name: &str, page: &dyn PortalPage) -> Result<PageOutcome> {
        self.stats.pages += 1;
        let rows = page.count(ORDER_ROWS).await?;
        info!("📄 第 {} 页，共 {} 条订单", self.stats.pages, rows.saturating_sub(1));

        // 从 1 开始，0 是表头
        for index in 1..rows {
            match self.process_row(shop_name, page, index).await {
                RowOutcome::Emitted => self.stats.emitted += 1,
                RowOutcome::SinkFailed => self.stats.sink_failures += 1,
                RowOutcome::Skipped(reason) => {
                    info!("[第 {} 行] 跳过: {}", index, reason);
                    self.stats.skipped += 1;
                }
                RowOutcome::Boundary { created_time } => {
                    info!("今天最后一条数据日期: {}", created_time);
                    return Ok(PageOutcome::Boundary);
                }
            }
        }
        Ok(PageOutcome::Continue)
    }

    /// 处理一行订单
    pub async fn process_row(&self, shop_name: &str, page: &dyn PortalPage, index: usize) -> RowOutcome {
        let (order_id, url, created) = match read_row(page, index).await {
            Ok(row) => row,
            Err(e) => return RowOutcome::Skipped(SkipReason::DetailUnavailable(e.to_string())),
        };
        let (Some(order_id), Some(url)) = (order_id, url) else {
            return RowOutcome::Skipped(SkipReason::MissingOrderLink);
        };
        let Some(created) = created else {
            return RowOutcome::Skipped(SkipReason::MissingCreatedTime);
        };

        let mut record = OrderRecord::new(shop_name);
        record.id = order_id;
        record.created_time = strip_label(&created, "下单时间");
        debug!("[第 {} 行] 订单 {} 下单时间 {}", index, record.id, record.created_time);

        match self.parse_in_detail_tab(page, &url, &mut record).await {
            DetailOutcome::Skipped(reason) => return RowOutcome::Skipped(reason),
            DetailOutcome::Parsed { dropped_items } if !dropped_items.is_empty() => {
                debug!("订单 {} 丢弃了 {} 行 sku", record.id, dropped_items.len());
            }
            DetailOutcome::Parsed { .. } => {}
        }

        if !is_today(&record.created_time, self.today) {
            return RowOutcome::Boundary {
                created_time: record.created_time,
            };
        }

        match self.sink.send(&record).await {
            Ok(()) => {
                info!("✓ 订单 {} 已推送", record.id);
                RowOutcome::Emitted
            }
            Err(e) => {
                warn!("⚠️ 订单 {} 推送失败: {}", record.id, e);
                RowOutcome::SinkFailed
            }
        }
    }

    /// 打开详情页 → 解析 → 关闭
    async fn parse_in_detail_tab(
        &self,
        page: &dyn PortalPage,
        url: &str,
        record: &mut OrderRecord,
    ) -> DetailOutcome {
        let detail = match page.open_tab(url).await {
            Ok(detail) => detail,
            Err(e) => return DetailOutcome::Skipped(SkipReason::DetailUnavailable(e.to_string())),
        };

        let outcome = match self.reader.read(detail.as_ref()).await {
            Ok(snapshot) => parse_detail(&snapshot, record),
            Err(e) => DetailOutcome::Skipped(SkipReason::DetailUnavailable(e.to_string())),
        };

        if let Err(e) = detail.close().await {
            warn!("关闭详情页失败 ({}): {}", url, e);
        }
        outcome
    }
}

async fn read_row(
    page: &dyn PortalPage,
    index: usize,
) -> Result<(Option<String>, Option<String>, Option<String>)> {
    let order_id = page
        .scoped_texts(ORDER_ROWS, index, ORDER_LINK)
        .await?
        .into_iter()
        .next()
        .filter(|id| !id.is_empty());
    let url = page
        .scoped_attr(ORDER_ROWS, index, ORDER_LINK, "href")
        .await?
        .filter(|url| !url.is_empty());
    let created = page
        .scoped_texts(ORDER_ROWS, index, ORDER_TIMES)
        .await?
        .into_iter()
        .next();
    Ok((order_id, url, created))
}
