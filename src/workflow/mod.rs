//! 流程层（Workflow Layer）
//!
//! 定义"一页订单列表"的处理流程，组合 services 中的能力：
//!
//! ```text
//! 订单行 → 打开详情 → DetailReader → parse_detail → 日期判断 → OrderSink
//! ```
//!
//! 本层不持有浏览器，也不负责翻页。

pub mod harvest;

pub use harvest::{DayHarvest, HarvestStats, PageOutcome, RowOutcome};
