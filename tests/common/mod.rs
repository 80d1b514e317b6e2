//! 集成测试共用的假页面、假识别服务和假推送目标
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use jd_shop_day::clients::{CaptchaDecoder, OrderSink, SliderSolution};
use jd_shop_day::config::{Config, Timings};
use jd_shop_day::error::{ApiError, AppResult};
use jd_shop_day::orchestrator::shop_day::{LOGOUT_LINK, NEXT_PAGE, ORDER_MENU};
use jd_shop_day::services::detail_reader::{
    DONGDONG, INFO_TABLES, LOGISTICS_ID, LOGISTICS_NAME, MOBILE, RECEIVER, SKU_ROWS, STATUS,
    VIEW_MOBILE,
};
use jd_shop_day::services::login::{
    BIG_IMAGE, LOGIN_FRAME, LOGIN_TABS, REFRESH_BUTTON, SHOP_NAME, SLIDER_BUTTON, SMALL_IMAGE,
    SUBMIT_BUTTON,
};
use jd_shop_day::workflow::harvest::{FIRST_ORDER_ID, ORDER_LINK, ORDER_ROWS, ORDER_TIMES};
use jd_shop_day::{OrderRecord, PortalPage};

pub const SHOP: &str = "测试旗舰店";
pub const DETAIL_BASE: &str = "https://shop.jd.com/order/detail?id=";

/// 所有等待都缩短到几十毫秒
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.credentials.username = "shop-admin".to_string();
    config.credentials.password = "secret".to_string();
    config.timings = Timings {
        element_wait_ms: 20,
        quick_wait_ms: 10,
        login_check_ms: 20,
        list_wait_ms: 30,
        poll_interval_ms: 5,
        captcha_refresh_pause_ms: 1,
        mobile_reveal_pause_ms: 1,
    };
    config
}

// ---------- 订单详情 ----------

#[derive(Clone, Debug)]
pub struct FakeDetail {
    pub status: Option<String>,
    pub texts: HashMap<&'static str, String>,
    pub payment_lines: Option<Vec<String>>,
    pub sku_rows: Vec<Vec<String>>,
    /// 点击"查看手机号"时页面报错
    pub broken: bool,
}

impl FakeDetail {
    /// 已付款、等待出库的订单
    pub fn paid() -> Self {
        let texts = HashMap::from([
            (LOGISTICS_ID, "JDV012345678".to_string()),
            (LOGISTICS_NAME, "京东快递".to_string()),
            (DONGDONG, "jd_buyer_01".to_string()),
            (RECEIVER, "收货人：张三".to_string()),
            (MOBILE, "13800000000".to_string()),
        ]);
        Self {
            status: Some("等待出库".to_string()),
            texts,
            payment_lines: Some(vec![
                "付款时间：2024-03-05 10:02:11".to_string(),
                "商品总额：￥1,199.50".to_string(),
                "运费金额：￥0.00".to_string(),
                "应支付金额：￥1,189.50".to_string(),
            ]),
            sku_rows: vec![
                cells(&["商品编号", "商品名称", "单价", "优惠", "", "", "数量"]),
                cells(&["100012", "保温杯 500ml", "￥1,199.50", "10.00", "", "", "1"]),
            ],
            broken: false,
        }
    }

    /// 读取到一半页面出错（例如标签页崩溃）
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::paid()
        }
    }

    pub fn awaiting_payment() -> Self {
        Self {
            status: Some("等待付款".to_string()),
            ..Self::paid()
        }
    }

    /// 已取消的订单没有状态标记
    pub fn cancelled() -> Self {
        Self {
            status: None,
            ..Self::paid()
        }
    }
}

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[derive(Clone, Debug)]
pub struct FakeOrder {
    pub id: String,
    pub created: String,
    pub detail: FakeDetail,
}

impl FakeOrder {
    pub fn new(id: &str, created: &str) -> Self {
        Self {
            id: id.to_string(),
            created: created.to_string(),
            detail: FakeDetail::paid(),
        }
    }

    pub fn with_detail(mut self, detail: FakeDetail) -> Self {
        self.detail = detail;
        self
    }
}

// ---------- 订单列表页 ----------

#[derive(Debug, Default)]
pub struct ShopState {
    /// 当前页（从 0 开始）
    pub current: usize,
    pub clicks: Vec<String>,
    pub opened: Vec<String>,
    pub closed: usize,
}

/// 已登录的商家后台，订单列表按页给出
pub struct FakeShop {
    pages: Vec<Vec<FakeOrder>>,
    pub state: Arc<Mutex<ShopState>>,
}

impl FakeShop {
    pub fn new(pages: Vec<Vec<FakeOrder>>) -> Self {
        Self {
            pages,
            state: Arc::new(Mutex::new(ShopState::default())),
        }
    }

    fn current_orders(&self) -> &[FakeOrder] {
        let current = self.state.lock().unwrap().current;
        self.pages.get(current).map(Vec::as_slice).unwrap_or(&[])
    }

    fn row(&self, scope: &str, index: usize) -> Option<FakeOrder> {
        if scope != ORDER_ROWS || index == 0 {
            return None;
        }
        self.current_orders().get(index - 1).cloned()
    }
}

#[async_trait]
impl PortalPage for FakeShop {
    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(match selector {
            ORDER_ROWS => self.current_orders().len() + 1,
            _ => 0,
        })
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        Ok(selector == LOGOUT_LINK || selector == SHOP_NAME)
    }

    async fn text(&self, selector: &str) -> Result<Option<String>> {
        Ok(match selector {
            SHOP_NAME => Some(SHOP.to_string()),
            FIRST_ORDER_ID => self.current_orders().first().map(|o| o.id.clone()),
            _ => None,
        })
    }

    async fn attr(&self, _selector: &str, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn scoped_texts(&self, scope: &str, index: usize, selector: &str) -> Result<Vec<String>> {
        let Some(order) = self.row(scope, index) else {
            return Ok(vec![]);
        };
        Ok(match selector {
            ORDER_LINK => vec![order.id],
            ORDER_TIMES => vec![format!("下单时间：{}", order.created), "备注".to_string()],
            _ => vec![],
        })
    }

    async fn scoped_attr(
        &self,
        scope: &str,
        index: usize,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .row(scope, index)
            .filter(|_| selector == ORDER_LINK && name == "href")
            .map(|order| format!("{}{}", DETAIL_BASE, order.id)))
    }

    async fn table_rows(&self, _row_selector: &str) -> Result<Vec<Vec<String>>> {
        Ok(vec![])
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(selector.to_string());
        Ok(match selector {
            ORDER_MENU => true,
            NEXT_PAGE if state.current + 1 < self.pages.len() => {
                state.current += 1;
                true
            }
            _ => false,
        })
    }

    async fn click_nth(&self, selector: &str, _index: usize) -> Result<bool> {
        self.state.lock().unwrap().clicks.push(selector.to_string());
        Ok(false)
    }

    async fn set_value(&self, _selector: &str, _value: &str) -> Result<bool> {
        Ok(false)
    }

    async fn mouse_drag(&self, _selector: &str, _offset_x: f64) -> Result<()> {
        Ok(())
    }

    async fn image_data(&self, _selector: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn frame(&self, _selector: &str) -> Result<Option<Box<dyn PortalPage>>> {
        Ok(None)
    }

    async fn open_tab(&self, url: &str) -> Result<Box<dyn PortalPage>> {
        self.state.lock().unwrap().opened.push(url.to_string());
        let id = url
            .strip_prefix(DETAIL_BASE)
            .ok_or_else(|| anyhow!("未知链接: {}", url))?;
        let order = self
            .current_orders()
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("当前页没有订单 {}", id))?;
        Ok(Box::new(FakeDetailPage {
            detail: order.detail,
            state: self.state.clone(),
        }))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// 订单详情标签页，关闭时计数
pub struct FakeDetailPage {
    detail: FakeDetail,
    state: Arc<Mutex<ShopState>>,
}

#[async_trait]
impl PortalPage for FakeDetailPage {
    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(match (selector, &self.detail.payment_lines) {
            (INFO_TABLES, Some(_)) => 3,
            (INFO_TABLES, None) => 1,
            _ => 0,
        })
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        Ok(self.text(selector).await?.is_some())
    }

    async fn text(&self, selector: &str) -> Result<Option<String>> {
        if selector == STATUS {
            return Ok(self.detail.status.clone());
        }
        Ok(self.detail.texts.get(selector).cloned())
    }

    async fn attr(&self, _selector: &str, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn scoped_texts(&self, scope: &str, index: usize, selector: &str) -> Result<Vec<String>> {
        if scope == INFO_TABLES && index == 2 && selector == "tr" {
            return Ok(self.detail.payment_lines.clone().unwrap_or_default());
        }
        Ok(vec![])
    }

    async fn scoped_attr(
        &self,
        _scope: &str,
        _index: usize,
        _selector: &str,
        _name: &str,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    async fn table_rows(&self, row_selector: &str) -> Result<Vec<Vec<String>>> {
        if row_selector == SKU_ROWS {
            return Ok(self.detail.sku_rows.clone());
        }
        Ok(vec![])
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        if self.detail.broken && selector == VIEW_MOBILE {
            return Err(anyhow!("Target closed: {}", selector));
        }
        Ok(selector == VIEW_MOBILE)
    }

    async fn click_nth(&self, _selector: &str, _index: usize) -> Result<bool> {
        Ok(false)
    }

    async fn set_value(&self, _selector: &str, _value: &str) -> Result<bool> {
        Ok(false)
    }

    async fn mouse_drag(&self, _selector: &str, _offset_x: f64) -> Result<()> {
        Ok(())
    }

    async fn image_data(&self, _selector: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn frame(&self, _selector: &str) -> Result<Option<Box<dyn PortalPage>>> {
        Ok(None)
    }

    async fn open_tab(&self, url: &str) -> Result<Box<dyn PortalPage>> {
        Err(anyhow!("详情页不应再打开新标签: {}", url))
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}

// ---------- 登录页 ----------

#[derive(Debug, Default)]
pub struct LoginState {
    pub logged_in: bool,
    pub clicks: Vec<String>,
    pub values: Vec<(String, String)>,
    pub drags: Vec<f64>,
    pub refreshes: usize,
    pub opened: usize,
}

/// 未登录的首页，登录框在 iframe 中
pub struct FakeLoginPage {
    /// 第几次拖动后登录成功，None 表示永远失败
    succeed_on_drag: Option<usize>,
    /// 进入登录框时报错
    frame_error: bool,
    pub state: Arc<Mutex<LoginState>>,
}

impl FakeLoginPage {
    pub fn new(succeed_on_drag: Option<usize>) -> Self {
        Self {
            succeed_on_drag,
            frame_error: false,
            state: Arc::new(Mutex::new(LoginState::default())),
        }
    }

    pub fn with_broken_frame() -> Self {
        Self {
            frame_error: true,
            ..Self::new(None)
        }
    }
}

#[async_trait]
impl PortalPage for FakeLoginPage {
    async fn count(&self, _selector: &str) -> Result<usize> {
        Ok(0)
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(match selector {
            LOGIN_FRAME => true,
            SHOP_NAME | LOGOUT_LINK => state.logged_in,
            _ => false,
        })
    }

    async fn text(&self, _selector: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn attr(&self, _selector: &str, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn scoped_texts(&self, _scope: &str, _index: usize, _selector: &str) -> Result<Vec<String>> {
        Ok(vec![])
    }

    async fn scoped_attr(
        &self,
        _scope: &str,
        _index: usize,
        _selector: &str,
        _name: &str,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    async fn table_rows(&self, _row_selector: &str) -> Result<Vec<Vec<String>>> {
        Ok(vec![])
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        self.state.lock().unwrap().clicks.push(selector.to_string());
        Ok(false)
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<bool> {
        self.state.lock().unwrap().clicks.push(format!("{}#{}", selector, index));
        Ok(selector == LOGIN_TABS && index == 1)
    }

    async fn set_value(&self, _selector: &str, _value: &str) -> Result<bool> {
        Ok(false)
    }

    async fn mouse_drag(&self, _selector: &str, _offset_x: f64) -> Result<()> {
        Ok(())
    }

    async fn image_data(&self, _selector: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn frame(&self, selector: &str) -> Result<Option<Box<dyn PortalPage>>> {
        if selector != LOGIN_FRAME {
            return Ok(None);
        }
        if self.frame_error {
            return Err(anyhow!("找不到 frame: {}", selector));
        }
        Ok(Some(Box::new(FakeLoginFrame {
            succeed_on_drag: self.succeed_on_drag,
            state: self.state.clone(),
        })))
    }

    async fn open_tab(&self, url: &str) -> Result<Box<dyn PortalPage>> {
        self.state.lock().unwrap().opened += 1;
        Err(anyhow!("未登录时不应打开: {}", url))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// 登录 iframe：每次刷新换一组验证码图片
pub struct FakeLoginFrame {
    succeed_on_drag: Option<usize>,
    state: Arc<Mutex<LoginState>>,
}

#[async_trait]
impl PortalPage for FakeLoginFrame {
    async fn count(&self, _selector: &str) -> Result<usize> {
        Ok(0)
    }

    async fn is_visible(&self, _selector: &str) -> Result<bool> {
        Ok(false)
    }

    async fn text(&self, _selector: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        Ok((selector == BIG_IMAGE && name == "width").then(|| "278".to_string()))
    }

    async fn scoped_texts(&self, _scope: &str, _index: usize, _selector: &str) -> Result<Vec<String>> {
        Ok(vec![])
    }

    async fn scoped_attr(
        &self,
        _scope: &str,
        _index: usize,
        _selector: &str,
        _name: &str,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    async fn table_rows(&self, _row_selector: &str) -> Result<Vec<Vec<String>>> {
        Ok(vec![])
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(selector.to_string());
        if selector == REFRESH_BUTTON {
            state.refreshes += 1;
        }
        Ok(selector == REFRESH_BUTTON || selector == SUBMIT_BUTTON)
    }

    async fn click_nth(&self, _selector: &str, _index: usize) -> Result<bool> {
        Ok(false)
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<bool> {
        self.state
            .lock()
            .unwrap()
            .values
            .push((selector.to_string(), value.to_string()));
        Ok(true)
    }

    async fn mouse_drag(&self, selector: &str, offset_x: f64) -> Result<()> {
        if selector != SLIDER_BUTTON {
            return Err(anyhow!("找不到元素: {}", selector));
        }
        let mut state = self.state.lock().unwrap();
        state.drags.push(offset_x);
        if Some(state.drags.len()) == self.succeed_on_drag {
            state.logged_in = true;
        }
        Ok(())
    }

    async fn image_data(&self, selector: &str) -> Result<Option<String>> {
        let refreshes = self.state.lock().unwrap().refreshes;
        Ok(match selector {
            BIG_IMAGE => Some(format!("data:image/png;base64,big-{}", refreshes)),
            SMALL_IMAGE => Some(format!("data:image/png;base64,small-{}", refreshes)),
            _ => None,
        })
    }

    async fn frame(&self, _selector: &str) -> Result<Option<Box<dyn PortalPage>>> {
        Ok(None)
    }

    async fn open_tab(&self, url: &str) -> Result<Box<dyn PortalPage>> {
        Err(anyhow!("登录框中不应打开: {}", url))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

// ---------- 识别服务 / 推送目标 ----------

/// 记录调用参数，返回固定结果；`solution` 为 None 时模拟服务出错
pub struct ScriptedDecoder {
    solution: Option<SliderSolution>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedDecoder {
    pub fn solving(x: f64, w: f64) -> Self {
        Self {
            solution: Some(SliderSolution {
                is_success: true,
                x: Some(x),
                w: Some(w),
            }),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        Self {
            solution: None,
            calls: Mutex::new(vec![]),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CaptchaDecoder for ScriptedDecoder {
    async fn decode(&self, template: &str, background: &str) -> AppResult<SliderSolution> {
        self.calls
            .lock()
            .unwrap()
            .push((template.to_string(), background.to_string()));
        match &self.solution {
            Some(solution) => Ok(solution.clone()),
            None => Err(ApiError::BadStatus {
                endpoint: "fake".to_string(),
                status: 500,
            }
            .into()),
        }
    }
}

/// 收集推送的订单
#[derive(Default)]
pub struct RecordingSink {
    fail: bool,
    pub records: Mutex<Vec<OrderRecord>>,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            records: Mutex::new(vec![]),
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }
}

#[async_trait]
impl OrderSink for RecordingSink {
    async fn send(&self, record: &OrderRecord) -> AppResult<()> {
        self.records.lock().unwrap().push(record.clone());
        if self.fail {
            return Err(ApiError::BadStatus {
                endpoint: "fake-sink".to_string(),
                status: 503,
            }
            .into());
        }
        Ok(())
    }
}
