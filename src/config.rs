//! 程序配置
//!
//! 先读取 TOML 配置文件（不存在时全部使用默认值），再用环境变量覆盖。

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError, FileError};
use crate::infrastructure::WaitPolicy;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "jd_shop.toml";

/// 程序配置文件
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub credentials: Credentials,
    pub captcha: CaptchaConfig,
    pub sink: SinkConfig,
    pub timings: Timings,
    pub harvest: HarvestConfig,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

/// 浏览器配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// 已运行浏览器的调试端口，为空时自行启动浏览器
    pub debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    /// 是否无头模式
    pub headless: bool,
    /// 商家后台首页
    pub home_url: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: None,
            chrome_executable: None,
            headless: true,
            home_url: "https://shop.jd.com".to_string(),
        }
    }
}

/// 登录账号
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 滑块验证码配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// 识别服务地址
    pub decoder_url: String,
    /// 首次尝试之后的重试次数
    pub max_retries: usize,
    /// 拖动距离修正（像素）
    pub drag_trim: f64,
    /// 识别请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            decoder_url: "http://127.0.0.1:8090".to_string(),
            max_retries: 3,
            drag_trim: 2.0,
            request_timeout_secs: 30,
        }
    }
}

/// 订单数据推送配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// 推送地址，为空时写入本地文件
    pub url: Option<String>,
    /// 本地 JSON Lines 文件
    pub output_file: String,
    /// 推送请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: None,
            output_file: "orders.jsonl".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// 各类等待时间（毫秒）
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// 普通元素等待
    pub element_wait_ms: u64,
    /// 可有可无的元素（如公告弹窗）等待
    pub quick_wait_ms: u64,
    /// 登录成功标记等待
    pub login_check_ms: u64,
    /// 订单列表加载等待
    pub list_wait_ms: u64,
    /// 轮询间隔
    pub poll_interval_ms: u64,
    /// 刷新验证码后的停顿
    pub captcha_refresh_pause_ms: u64,
    /// 点击查看手机号后的停顿
    pub mobile_reveal_pause_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            element_wait_ms: 2_000,
            quick_wait_ms: 1_000,
            login_check_ms: 5_000,
            list_wait_ms: 30_000,
            poll_interval_ms: 200,
            captcha_refresh_pause_ms: 1_000,
            mobile_reveal_pause_ms: 500,
        }
    }
}

impl Timings {
    fn policy(&self, timeout_ms: u64) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    pub fn element(&self) -> WaitPolicy {
        self.policy(self.element_wait_ms)
    }

    pub fn quick(&self) -> WaitPolicy {
        self.policy(self.quick_wait_ms)
    }

    pub fn login_check(&self) -> WaitPolicy {
        self.policy(self.login_check_ms)
    }

    pub fn list(&self) -> WaitPolicy {
        self.policy(self.list_wait_ms)
    }

    pub fn captcha_refresh_pause(&self) -> Duration {
        Duration::from_millis(self.captcha_refresh_pause_ms)
    }

    pub fn mobile_reveal_pause(&self) -> Duration {
        Duration::from_millis(self.mobile_reveal_pause_ms)
    }
}

/// 翻页配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// 最多翻页数
    pub max_pages: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self { max_pages: 200 }
    }
}

impl Config {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str, path: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.to_string(),
                source,
            }
            .into()
        })
    }

    /// 读取配置文件，文件不存在时使用默认配置；随后应用环境变量覆盖
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let mut config = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
                    path: display.clone(),
                    source,
                })?;
            Self::from_toml_str(&content, &display)?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 使用 `JD_SHOP_CONFIG` 指定的路径（或默认路径）加载
    pub fn from_env() -> AppResult<Self> {
        let path =
            std::env::var("JD_SHOP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// 用环境变量覆盖配置项
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("JD_USERNAME") {
            self.credentials.username = v;
        }
        if let Some(v) = lookup("JD_PASSWORD") {
            self.credentials.password = v;
        }
        if let Some(v) = lookup("BROWSER_DEBUG_PORT") {
            self.browser.debug_port = Some(parse_var("BROWSER_DEBUG_PORT", &v, "u16")?);
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.browser.chrome_executable = Some(v);
        }
        if let Some(v) = lookup("HEADLESS") {
            self.browser.headless = parse_var("HEADLESS", &v, "bool")?;
        }
        if let Some(v) = lookup("CAPTCHA_DECODER_URL") {
            self.captcha.decoder_url = v;
        }
        if let Some(v) = lookup("SINK_URL") {
            self.sink.url = Some(v);
        }
        if let Some(v) = lookup("SINK_OUTPUT_FILE") {
            self.sink.output_file = v;
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", &v, "bool")?;
        }
        Ok(())
    }

    /// 检查必填项
    pub fn validate(&self) -> AppResult<()> {
        if self.credentials.username.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "credentials.username",
            }
            .into());
        }
        if self.credentials.password.is_empty() {
            return Err(ConfigError::MissingField {
                field: "credentials.password",
            }
            .into());
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str, expected_type: &'static str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::EnvVarParseFailed {
            var_name: name.to_string(),
            value: value.to_string(),
            expected_type,
        }
        .into()
    })
}
