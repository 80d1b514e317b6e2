//! 订单解析 - 业务能力层
//!
//! 只做纯文本 → 结构化数据的转换，不接触页面。页面读取见 [`super::detail_reader`]。

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Customer, OrderRecord, SkuItem};

/// 等待付款状态文案
pub const AWAITING_PAYMENT: &str = "等待付款";

/// sku 表格至少需要的列数
pub const SKU_MIN_CELLS: usize = 7;

static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*-\s*(\d{1,2})\s*-\s*(\d{1,2})").expect("valid regex"));

/// 从订单详情页读取到的原始文本
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailSnapshot {
    /// 订单状态（`span.wb-green`），为空说明已取消
    pub status: Option<String>,
    pub logistics_id: Option<String>,
    pub logistics_name: Option<String>,
    pub dongdong: Option<String>,
    /// 收货人行，带 "收货人:" 标签
    pub receiver: Option<String>,
    pub mobile: Option<String>,
    /// 付款信息表格的每一行；表格不存在时为 None
    pub payment_lines: Option<Vec<String>>,
    /// sku 表格的数据行（不含表头）
    pub sku_rows: Vec<Vec<String>>,
}

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 没有状态标记（已取消）
    NoStatusMarker,
    /// 等待付款
    AwaitingPayment,
    /// 列表行缺少订单号或链接
    MissingOrderLink,
    /// 列表行缺少下单时间
    MissingCreatedTime,
    /// 读取详情页失败
    DetailUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoStatusMarker => write!(f, "没有状态标记（已取消）"),
            SkipReason::AwaitingPayment => write!(f, "等待付款"),
            SkipReason::MissingOrderLink => write!(f, "缺少订单号或详情链接"),
            SkipReason::MissingCreatedTime => write!(f, "缺少下单时间"),
            SkipReason::DetailUnavailable(e) => write!(f, "读取详情页失败: {}", e),
        }
    }
}

/// 详情解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    /// 已写入记录；`dropped_items` 为被丢弃的 sku 行
    Parsed { dropped_items: Vec<SkuSkip> },
    Skipped(SkipReason),
}

impl DetailOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, DetailOutcome::Parsed { .. })
    }
}

/// sku 行被丢弃的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkuSkip {
    TooFewCells { found: usize },
    InvalidNumber { column: usize, value: String },
}

/// 单行 sku 的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum SkuRow {
    Parsed(SkuItem),
    Skipped(SkuSkip),
}

/// 付款信息中的一个字段
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentField {
    PaidTime(String),
    Amount(Decimal),
    FreightAmount(Decimal),
    PromotionPrice(Decimal),
    Coupon(Decimal),
    Bean(Decimal),
    PaidAmount(Decimal),
}

/// 解析详情页，写入 `record`
///
/// 订单没有状态标记或处于等待付款时返回 `Skipped`，且不修改 `record`。
pub fn parse_detail(snapshot: &DetailSnapshot, record: &mut OrderRecord) -> DetailOutcome {
    match snapshot.status.as_deref().map(str::trim) {
        None => return DetailOutcome::Skipped(SkipReason::NoStatusMarker),
        Some(AWAITING_PAYMENT) => return DetailOutcome::Skipped(SkipReason::AwaitingPayment),
        Some(_) => {}
    }

    record.logistics_id = snapshot.logistics_id.clone().unwrap_or_default();
    record.logistics_name = snapshot.logistics_name.clone().unwrap_or_default();
    record.customer = Customer {
        name: snapshot
            .receiver
            .as_deref()
            .map(|r| strip_label(r, "收货人"))
            .unwrap_or_default(),
        mobile: snapshot.mobile.clone().unwrap_or_default(),
        dongdong: snapshot.dongdong.clone().unwrap_or_default(),
    };

    let mut dropped_items = Vec::new();
    // 付款表格不存在时，付款字段和 sku 都不读取
    if let Some(lines) = &snapshot.payment_lines {
        for line in lines {
            match parse_payment_line(line) {
                Some(field) => apply_payment_field(record, field),
                None => debug!("忽略付款行: {}", line),
            }
        }

        record.items.clear();
        for cells in &snapshot.sku_rows {
            match parse_sku_row(cells) {
                SkuRow::Parsed(item) => record.items.push(item),
                SkuRow::Skipped(reason) => {
                    debug!("丢弃 sku 行 {:?}: {:?}", cells, reason);
                    dropped_items.push(reason);
                }
            }
        }
    }

    DetailOutcome::Parsed { dropped_items }
}

fn apply_payment_field(record: &mut OrderRecord, field: PaymentField) {
    match field {
        PaymentField::PaidTime(v) => record.paid_time = Some(v),
        PaymentField::Amount(v) => record.amount = Some(v),
        PaymentField::FreightAmount(v) => record.freight_amount = Some(v),
        PaymentField::PromotionPrice(v) => record.promotion_price = Some(v),
        PaymentField::Coupon(v) => record.coupon = Some(v),
        PaymentField::Bean(v) => record.bean = Some(v),
        PaymentField::PaidAmount(v) => record.paid_amount = Some(v),
    }
}

/// 按 "标签:值" 拆分，标签必须完全匹配
pub fn split_label(line: &str) -> Option<(&str, &str)> {
    let idx = line.find([':', '：'])?;
    let (label, rest) = line.split_at(idx);
    // 跳过分隔符本身（全角冒号占 3 字节）
    let sep_len = rest.chars().next().map(char::len_utf8).unwrap_or(0);
    Some((label.trim(), rest[sep_len..].trim()))
}

/// 解析付款信息中的一行
pub fn parse_payment_line(line: &str) -> Option<PaymentField> {
    let (label, value) = split_label(line)?;
    let field = match label {
        "付款时间" => PaymentField::PaidTime(value.to_string()),
        "商品总额" => PaymentField::Amount(parse_money(value)?),
        "运费金额" => PaymentField::FreightAmount(parse_money(value)?),
        "促销价格" => PaymentField::PromotionPrice(parse_money(value)?),
        "优惠券" => PaymentField::Coupon(parse_money(value)?),
        "京豆" => PaymentField::Bean(parse_money(value)?),
        "应支付金额" => PaymentField::PaidAmount(parse_money(value)?),
        _ => return None,
    };
    Some(field)
}

/// 去掉货币符号和千分位后解析为金额
pub fn parse_money(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '￥' | '¥' | ',' | '，') && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned).ok()
}

/// 解析 sku 表格的一行：0 货品代码，1 名称，2 单价，3 折扣，6 数量
pub fn parse_sku_row(cells: &[String]) -> SkuRow {
    if cells.len() < SKU_MIN_CELLS {
        return SkuRow::Skipped(SkuSkip::TooFewCells { found: cells.len() });
    }
    let invalid = |column: usize| {
        SkuRow::Skipped(SkuSkip::InvalidNumber {
            column,
            value: cells[column].clone(),
        })
    };

    let Some(price) = parse_money(&cells[2]) else {
        return invalid(2);
    };
    let Some(discount) = parse_money(&cells[3]) else {
        return invalid(3);
    };
    let Ok(qty) = cells[6].trim().parse::<i64>() else {
        return invalid(6);
    };

    SkuRow::Parsed(SkuItem {
        id: cells[0].trim().to_string(),
        name: cells[1].trim().to_string(),
        price,
        discount,
        qty,
    })
}

/// 下单日期的月、日是否与 `today` 相同（年份不参与比较）
pub fn is_today(created: &str, today: NaiveDate) -> bool {
    let Some(caps) = MONTH_DAY.captures(created) else {
        return false;
    };
    let month = caps[1].parse::<u32>().ok();
    let day = caps[2].parse::<u32>().ok();
    month == Some(today.month()) && day == Some(today.day())
}

/// 去掉文本开头的 "标签:"，没有该标签时原样返回（去空白）
pub fn strip_label(text: &str, label: &str) -> String {
    match split_label(text) {
        Some((found, value)) if found == label => value.to_string(),
        _ => text.trim().to_string(),
    }
}
