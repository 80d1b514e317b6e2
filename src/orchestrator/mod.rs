//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 负责资源管理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理浏览器生命周期
//! - 组装验证码识别客户端和订单推送目标
//! - 输出全局统计信息
//!
//! ### `shop_day` - 店铺当日订单
//! - 检查登录状态，必要时登录
//! - 进入订单查询页
//! - 翻页，直到遇到非今天的订单
//!
//! ## 层次关系
//!
//! ```text
//! app (持有 Browser)
//!     ↓
//! shop_day (登录 + 翻页)
//!     ↓
//! workflow::DayHarvest (处理一页订单)
//!     ↓
//! services (能力层：login / detail_reader / order_parser)
//!     ↓
//! infrastructure (基础设施：PortalPage)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有 Browser
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **无解析逻辑**：只做调度和统计

pub mod app;
pub mod shop_day;

pub use app::App;
pub use shop_day::{ShopDay, ShopDayOutcome};
