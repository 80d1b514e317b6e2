//! 订单详情页读取 - 业务能力层
//!
//! 只负责从详情页读出原始文本，解析交给 [`super::order_parser`]

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::debug;

use crate::infrastructure::wait::wait_text;
use crate::infrastructure::{PortalPage, WaitPolicy};
use crate::services::order_parser::{DetailSnapshot, AWAITING_PAYMENT};

pub const STATUS: &str = "span.wb-green";
pub const LOGISTICS_ID: &str = "#waybillid-1";
pub const LOGISTICS_NAME: &str = "div.logistics-tab-left a.wb-blue";
pub const DONGDONG: &str = "//table[@id='receiveData']//tr[@name='dongdongICON']";
pub const RECEIVER: &str = "//table[@id='receiveData']//tr[@class='copyable']";
pub const VIEW_MOBILE: &str = "#viewOrderMobile";
pub const MOBILE: &str = "#mobile";
pub const INFO_TABLES: &str = "td.ordinf-td table";
pub const SKU_ROWS: &str = "div.mtb20 table.wb-table-b tr";

/// 付款信息是第三个表格
const PAYMENT_TABLE_INDEX: usize = 2;

/// 详情页读取器
pub struct DetailReader {
    /// 状态标记等待
    status_wait: WaitPolicy,
    /// 其他字段等待
    field_wait: WaitPolicy,
    /// 点击"查看手机号"后的停顿
    mobile_reveal_pause: Duration,
}

impl DetailReader {
    pub fn new(status_wait: WaitPolicy, field_wait: WaitPolicy, mobile_reveal_pause: Duration) -> Self {
        Self {
            status_wait,
            field_wait,
            mobile_reveal_pause,
        }
    }

    /// 读取详情页
    ///
    /// # 参数
    /// - `page`: 已打开的订单详情标签页，由调用方负责关闭
    ///
    /// # 返回
    /// 详情页原始文本。没有状态标记或等待付款时直接返回，其余字段不再读取。
    pub async fn read(&self, page: &dyn PortalPage) -> Result<DetailSnapshot> {
        let Some(status) = wait_text(page, STATUS, self.status_wait).await else {
            debug!("详情页没有状态标记");
            return Ok(DetailSnapshot::default());
        };
        if status == AWAITING_PAYMENT {
            return Ok(DetailSnapshot {
                status: Some(status),
                ..Default::default()
            });
        }

        let mut snapshot = DetailSnapshot {
            status: Some(status),
            logistics_id: wait_text(page, LOGISTICS_ID, self.field_wait).await,
            logistics_name: wait_text(page, LOGISTICS_NAME, self.field_wait).await,
            dongdong: wait_text(page, DONGDONG, self.field_wait).await,
            receiver: wait_text(page, RECEIVER, self.field_wait).await,
            ..Default::default()
        };

        // 手机号默认打码，点击后才显示
        if page.click(VIEW_MOBILE).await? {
            sleep(self.mobile_reveal_pause).await;
        }
        snapshot.mobile = page.text(MOBILE).await?;

        if page.count(INFO_TABLES).await? > PAYMENT_TABLE_INDEX {
            snapshot.payment_lines = Some(
                page.scoped_texts(INFO_TABLES, PAYMENT_TABLE_INDEX, "tr")
                    .await?,
            );
            // 第一行是表头
            snapshot.sku_rows = page.table_rows(SKU_ROWS).await?.into_iter().skip(1).collect();
        }

        Ok(snapshot)
    }
}
