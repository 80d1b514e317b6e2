//! # JD Shop Day
//!
//! 抓取京东商家后台当天的订单，逐条推送到下游
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PortalPage` - 页面操作接口，业务代码只依赖它
//! - `ChromePage` - 基于 chromiumoxide 的实现
//! - `WaitPolicy` - 统一的等待策略
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `LoginFlow` - 账号密码 + 滑块验证码登录
//! - `DetailReader` - 读取订单详情页
//! - `order_parser` - 把详情页内容解析成订单
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一页订单"的处理流程
//! - `DayHarvest` - 打开详情 → 解析 → 日期判断 → 推送
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 管理浏览器和依赖
//! - `orchestrator/shop_day` - 登录、进入订单页、翻页
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromePage, PortalPage, WaitPolicy};
pub use models::{Customer, OrderRecord, SkuItem};
pub use orchestrator::{App, ShopDay, ShopDayOutcome};
pub use workflow::{DayHarvest, HarvestStats, PageOutcome};
