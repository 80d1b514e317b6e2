//! 轮询等待
//!
//! 所有等待都有超时；超时按"元素不存在"处理，不产生错误。

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time::{sleep, Instant};
use tracing::debug;

use super::PortalPage;

/// 等待策略：超时时间 + 轮询间隔
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    timeout: Duration,
    interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// 只查询一次
    pub fn once() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 反复执行 `check` 直到返回 `Some` 或超时
    ///
    /// 至少执行一次；`check` 出错视为本轮没有结果。
    pub async fn until<T, F, Fut>(&self, mut check: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            match check().await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(e) => debug!("轮询出错: {}", e),
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(self.interval).await;
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_millis(200))
    }
}

/// 等待元素出现并可见
pub async fn wait_visible(page: &dyn PortalPage, selector: &str, policy: WaitPolicy) -> bool {
    policy
        .until(|| async move { Ok(page.is_visible(selector).await?.then_some(())) })
        .await
        .is_some()
}

/// 等待元素存在（不要求可见）
pub async fn wait_present(page: &dyn PortalPage, selector: &str, policy: WaitPolicy) -> bool {
    policy
        .until(|| async move { Ok((page.count(selector).await? > 0).then_some(())) })
        .await
        .is_some()
}

/// 等待匹配元素数量大于 `count`
pub async fn wait_more_than(
    page: &dyn PortalPage,
    selector: &str,
    count: usize,
    policy: WaitPolicy,
) -> bool {
    policy
        .until(|| async move { Ok((page.count(selector).await? > count).then_some(())) })
        .await
        .is_some()
}

/// 等待元素出现并返回其文本
pub async fn wait_text(page: &dyn PortalPage, selector: &str, policy: WaitPolicy) -> Option<String> {
    policy.until(|| async move { page.text(selector).await }).await
}

/// 等待元素文本不同于 `old`
pub async fn wait_text_changed(
    page: &dyn PortalPage,
    selector: &str,
    old: &str,
    policy: WaitPolicy,
) -> bool {
    policy
        .until(|| async move {
            Ok(page
                .text(selector)
                .await?
                .filter(|text| text != old)
                .map(|_| ()))
        })
        .await
        .is_some()
}

/// 等待图片加载完成，返回 data URL
pub async fn image_ready(
    page: &dyn PortalPage,
    selector: &str,
    policy: WaitPolicy,
) -> Option<String> {
    policy.until(|| async move { page.image_data(selector).await }).await
}

/// 等待图片内容变化，返回新的 data URL
pub async fn image_changed(
    page: &dyn PortalPage,
    selector: &str,
    old: &str,
    policy: WaitPolicy,
) -> Option<String> {
    policy
        .until(|| async move {
            Ok(page
                .image_data(selector)
                .await?
                .filter(|data| data != old))
        })
        .await
}
