//! 商家后台登录 - 业务能力层
//!
//! 账号密码登录 + 滑块验证码。识别失败时刷新验证码重试。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::clients::CaptchaDecoder;
use crate::config::{Config, Credentials};
use crate::infrastructure::wait::{image_changed, image_ready, wait_visible};
use crate::infrastructure::{PortalPage, WaitPolicy};

pub const LOGIN_TABS: &str = "div.tabs-header-item";
pub const LOGIN_FRAME: &str = "#loginFrame";
pub const USERNAME_INPUT: &str = "input#loginname";
pub const PASSWORD_INPUT: &str = "input#nloginpwd";
pub const SUBMIT_BUTTON: &str = "div.login-btn2013";
pub const BIG_IMAGE: &str = "div.JDJRV-bigimg img";
pub const SMALL_IMAGE: &str = "div.JDJRV-smallimg img";
pub const SLIDER_BUTTON: &str = "div.JDJRV-slide-btn";
pub const REFRESH_BUTTON: &str = "div.JDJRV-img-refresh";
/// 登录成功后才会出现的店铺名
pub const SHOP_NAME: &str = "span.shop-pageframe-navigation__shop-name";

/// 账号登录在第二个标签
const ACCOUNT_TAB_INDEX: usize = 1;

/// 去掉 data URL 前缀，只保留 base64 内容
pub fn base64_payload(data_url: &str) -> &str {
    data_url
        .split_once("base64,")
        .map(|(_, payload)| payload)
        .unwrap_or(data_url)
}

/// 登录流程
pub struct LoginFlow {
    credentials: Credentials,
    decoder: Arc<dyn CaptchaDecoder>,
    max_retries: usize,
    drag_trim: f64,
    element_wait: WaitPolicy,
    check_wait: WaitPolicy,
    refresh_pause: Duration,
}

impl LoginFlow {
    pub fn new(config: &Config, decoder: Arc<dyn CaptchaDecoder>) -> Self {
        Self {
            credentials: config.credentials.clone(),
            decoder,
            max_retries: config.captcha.max_retries,
            drag_trim: config.captcha.drag_trim,
            element_wait: config.timings.element(),
            check_wait: config.timings.login_check(),
            refresh_pause: config.timings.captcha_refresh_pause(),
        }
    }

    /// 执行登录
    ///
    /// # 参数
    /// - `page`: 商家后台首页，登录框在其中的 iframe 里
    ///
    /// # 返回
    /// 登录成功返回 true。首次尝试加 `max_retries` 次重试全部失败，
    /// 或页面操作出错时返回 false，不会返回错误。
    pub async fn run(&self, page: &dyn PortalPage) -> Result<bool> {
        match self.login(page).await {
            Ok(logged_in) => Ok(logged_in),
            Err(e) => {
                warn!("❌ 登录过程出错: {}", e);
                Ok(false)
            }
        }
    }

    async fn login(&self, page: &dyn PortalPage) -> Result<bool> {
        if !page.click_nth(LOGIN_TABS, ACCOUNT_TAB_INDEX).await? {
            warn!("找不到账号登录标签");
            return Ok(false);
        }
        if !wait_visible(page, LOGIN_FRAME, self.element_wait).await {
            warn!("登录框没有出现");
            return Ok(false);
        }
        let Some(frame) = page.frame(LOGIN_FRAME).await? else {
            warn!("无法进入登录框");
            return Ok(false);
        };
        let frame = frame.as_ref();

        frame
            .set_value(USERNAME_INPUT, &self.credentials.username)
            .await?;
        frame
            .set_value(PASSWORD_INPUT, &self.credentials.password)
            .await?;
        frame.click(SUBMIT_BUTTON).await?;

        // 处理登录图片
        let (Some(mut big), Some(mut small)) = (
            image_ready(frame, BIG_IMAGE, self.element_wait).await,
            image_ready(frame, SMALL_IMAGE, self.element_wait).await,
        ) else {
            warn!("验证码图片没有加载");
            return Ok(false);
        };
        let Some(width) = frame
            .attr(BIG_IMAGE, "width")
            .await?
            .and_then(|w| w.trim().parse::<f64>().ok())
        else {
            warn!("读取验证码图片宽度失败");
            return Ok(false);
        };

        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            info!("🔐 滑块验证第 {}/{} 次", attempt, attempts);
            if self.attempt(page, frame, &small, &big, width).await {
                info!("✓ 登录成功");
                return Ok(true);
            }
            if attempt == attempts {
                break;
            }

            frame.click(REFRESH_BUTTON).await?;
            big = match image_changed(frame, BIG_IMAGE, &big, self.element_wait).await {
                Some(changed) => changed,
                None => {
                    debug!("大图没有变化");
                    big
                }
            };
            small = match image_changed(frame, SMALL_IMAGE, &small, self.element_wait).await {
                Some(changed) => changed,
                None => {
                    debug!("小图没有变化");
                    small
                }
            };
            sleep(self.refresh_pause).await;
        }

        warn!("❌ 登录失败，已尝试 {} 次", attempts);
        Ok(false)
    }

    /// 识别一次并拖动，返回登录成功标记是否出现
    async fn attempt(
        &self,
        page: &dyn PortalPage,
        frame: &dyn PortalPage,
        small: &str,
        big: &str,
        width: f64,
    ) -> bool {
        let solution = match self
            .decoder
            .decode(base64_payload(small), base64_payload(big))
            .await
        {
            Ok(solution) => solution,
            Err(e) => {
                warn!("验证码识别失败: {}", e);
                return false;
            }
        };
        let Some(offset) = solution.drag_offset(width, self.drag_trim) else {
            warn!("验证码识别服务未给出有效结果: {:?}", solution);
            return false;
        };
        if let Err(e) = frame.mouse_drag(SLIDER_BUTTON, offset).await {
            warn!("拖动滑块失败: {}", e);
            return false;
        }
        wait_visible(page, SHOP_NAME, self.check_wait).await
    }
}
