//! 滑块验证码识别客户端
//!
//! 封装与识别服务的 HTTP 调用

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{ApiError, AppError, AppResult};

/// 识别结果
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderSolution {
    #[serde(default)]
    pub is_success: bool,
    /// 缺口在识别图片中的横坐标
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x: Option<f64>,
    /// 识别时使用的图片宽度
    #[serde(default, deserialize_with = "lenient_f64")]
    pub w: Option<f64>,
}

impl SliderSolution {
    /// 换算成页面上的拖动距离：`width / w * x - trim`
    pub fn drag_offset(&self, rendered_width: f64, trim: f64) -> Option<f64> {
        if !self.is_success {
            return None;
        }
        let (x, w) = (self.x?, self.w?);
        if w <= 0.0 {
            return None;
        }
        Some(rendered_width / w * x - trim)
    }
}

/// 数字或数字字符串
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value as f64))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value as f64))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value.trim().parse().ok())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

/// 滑块验证码识别
#[async_trait]
pub trait CaptchaDecoder: Send + Sync {
    /// `template` 为滑块小图，`background` 为带缺口的大图，均为 base64（不带 data URL 前缀）
    async fn decode(&self, template: &str, background: &str) -> AppResult<SliderSolution>;
}

/// 通过 HTTP 调用识别服务
pub struct HttpCaptchaDecoder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCaptchaDecoder {
    /// `base_url` 为识别服务根地址，请求发往 `{base_url}/DecodeSlider2`
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let endpoint = format!("{}/DecodeSlider2", base_url.trim_end_matches('/'));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::api_request_failed(endpoint.clone(), e))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CaptchaDecoder for HttpCaptchaDecoder {
    async fn decode(&self, template: &str, background: &str) -> AppResult<SliderSolution> {
        debug!(
            "请求验证码识别: {} (小图 {} 字节, 大图 {} 字节)",
            self.endpoint,
            template.len(),
            background.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "background": background,
                "template": template,
                "debug": false,
            }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(self.endpoint.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("验证码识别服务返回 {}", status);
            return Err(ApiError::BadStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        let solution: SliderSolution =
            response
                .json()
                .await
                .map_err(|source| ApiError::JsonParseFailed {
                    endpoint: self.endpoint.clone(),
                    source,
                })?;
        debug!("识别结果: {:?}", solution);
        Ok(solution)
    }
}
