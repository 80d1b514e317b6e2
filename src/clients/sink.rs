//! 订单数据推送
//!
//! 每条订单单独推送，失败只记录日志，不重试

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{ApiError, AppError, AppResult, FileError};
use crate::models::OrderRecord;

/// 订单接收方
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn send(&self, record: &OrderRecord) -> AppResult<()>;
}

/// POST JSON 到推送地址
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
}

impl HttpSink {
    /// `timeout` 为单次推送的超时，避免下游卡住整个抓取
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::api_request_failed(url.clone(), e))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl OrderSink for HttpSink {
    async fn send(&self, record: &OrderRecord) -> AppResult<()> {
        debug!("推送订单 {} → {}", record.id, self.url);
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(self.url.clone(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::BadStatus {
                endpoint: self.url.clone(),
                status: status.as_u16(),
            }
            .into());
        }
        Ok(())
    }
}

/// 追加写入 JSON Lines 文件
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl OrderSink for JsonLinesSink {
    async fn send(&self, record: &OrderRecord) -> AppResult<()> {
        let write_failed = |source: std::io::Error| {
            AppError::from(FileError::WriteFailed {
                path: self.path.display().to_string(),
                source,
            })
        };

        let mut line = serde_json::to_string(record)
            .map_err(|e| write_failed(std::io::Error::other(e)))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_failed)?;
        file.write_all(line.as_bytes()).await.map_err(write_failed)?;
        file.flush().await.map_err(write_failed)?;
        debug!("订单 {} 已写入 {}", record.id, self.path.display());
        Ok(())
    }
}
