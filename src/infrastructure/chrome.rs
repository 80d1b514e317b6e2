//! 基于 chromiumoxide 的 [`PortalPage`] 实现
//!
//! DOM 读取与点击都通过 JS 完成；拖动使用 CDP 原生鼠标事件。

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::dom::DescribeNodeParams;
use chromiumoxide::cdp::browser_protocol::page::{CreateIsolatedWorldParams, FrameId};
use chromiumoxide::{Browser, Page};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info};

use super::drag::build_tracks;
use super::selector::{js_string, Selector};
use super::{JsExecutor, PortalPage};
use crate::error::BrowserError;

/// 松开鼠标前的停顿
const DRAG_RELEASE_PAUSE: Duration = Duration::from_millis(740);

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct Point {
    x: f64,
    y: f64,
}

/// 浏览器中的一个标签页或 iframe
pub struct ChromePage {
    browser: Arc<Browser>,
    executor: JsExecutor,
    /// iframe 左上角在主页面视口中的位置；主 frame 为 (0, 0)
    origin: Point,
    is_frame: bool,
}

impl ChromePage {
    pub fn new(browser: Arc<Browser>, page: Page) -> Self {
        Self {
            browser,
            executor: JsExecutor::new(page),
            origin: Point::default(),
            is_frame: false,
        }
    }

    pub fn page(&self) -> &Page {
        self.executor.page()
    }

    /// 第一个匹配元素的 JS 表达式
    fn first(selector: &str) -> String {
        format!(
            "({})[0]",
            Selector::parse(selector).query_all_js("document")
        )
    }

    /// 第 `index` 个 `scope` 内所有 `selector` 的 JS 表达式
    fn scoped_all(scope: &str, index: usize, selector: &str) -> String {
        format!(
            "(() => {{ const s = ({})[{index}]; return s ? {} : []; }})()",
            Selector::parse(scope).query_all_js("document"),
            Selector::parse(selector).query_all_js("s"),
        )
    }

    async fn center_of(&self, selector: &str) -> Result<Option<Point>> {
        let js = format!(
            "(() => {{ const el = {}; if (!el) return null; \
             el.scrollIntoView({{block: 'center'}}); const r = el.getBoundingClientRect(); \
             return {{x: r.left + r.width / 2, y: r.top + r.height / 2}}; }})()",
            Self::first(selector)
        );
        self.executor.eval_as(js).await
    }

    /// iframe 元素对应的 frame id
    ///
    /// 直接从元素节点取，不依赖 iframe 当前的 url（登录框加载后会跳转）。
    async fn frame_id_of(&self, selector: &str) -> Result<Option<FrameId>> {
        let Some(object_id) = self.executor.eval_handle(Self::first(selector)).await? else {
            return Ok(None);
        };
        let node = self
            .page()
            .execute(DescribeNodeParams::builder().object_id(object_id).build())
            .await?
            .result
            .node;
        Ok(node
            .frame_id
            .or_else(|| node.content_document.and_then(|doc| doc.frame_id)))
    }

    async fn dispatch_mouse(&self, kind: DispatchMouseEventType, at: Point) -> Result<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(at.x)
            .y(at.y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(BrowserError::ScriptExecutionFailed)?;
        self.page().execute(params).await?;
        Ok(())
    }
}

#[async_trait]
impl PortalPage for ChromePage {
    async fn count(&self, selector: &str) -> Result<usize> {
        let js = format!(
            "({}).length",
            Selector::parse(selector).query_all_js("document")
        );
        self.executor.eval_as(js).await
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let js = format!(
            "(() => {{ const el = {}; return !!el && !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length); }})()",
            Self::first(selector)
        );
        self.executor.eval_as(js).await
    }

    async fn text(&self, selector: &str) -> Result<Option<String>> {
        let js = format!(
            "(() => {{ const el = {}; return el ? (el.innerText || el.textContent || '').trim() : null; }})()",
            Self::first(selector)
        );
        self.executor.eval_as(js).await
    }

    async fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let js = format!(
            "(() => {{ const el = {}; return el ? el.getAttribute({}) : null; }})()",
            Self::first(selector),
            js_string(name)
        );
        self.executor.eval_as(js).await
    }

    async fn scoped_texts(
        &self,
        scope: &str,
        index: usize,
        selector: &str,
    ) -> Result<Vec<String>> {
        let js = format!(
            "({}).map(el => (el.innerText || el.textContent || '').trim())",
            Self::scoped_all(scope, index, selector)
        );
        self.executor.eval_as(js).await
    }

    async fn scoped_attr(
        &self,
        scope: &str,
        index: usize,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>> {
        // href 取属性值会是相对地址，这里读 DOM property 拿到完整 URL
        let js = format!(
            "(() => {{ const el = ({})[0]; if (!el) return null; const n = {}; \
             const v = (n === 'href' || n === 'src') ? el[n] : el.getAttribute(n); \
             return v == null ? null : String(v); }})()",
            Self::scoped_all(scope, index, selector),
            js_string(name)
        );
        self.executor.eval_as(js).await
    }

    async fn table_rows(&self, row_selector: &str) -> Result<Vec<Vec<String>>> {
        let js = format!(
            "({}).map(tr => Array.from(tr.querySelectorAll('td')).map(td => (td.innerText || td.textContent || '').trim()))",
            Selector::parse(row_selector).query_all_js("document")
        );
        self.executor.eval_as(js).await
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        self.click_nth(selector, 0).await
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<bool> {
        debug!("点击: {} [{}]", selector, index);
        let js = format!(
            "(() => {{ const el = ({})[{index}]; if (!el) return false; \
             el.scrollIntoView({{block: 'center'}}); el.click(); return true; }})()",
            Selector::parse(selector).query_all_js("document")
        );
        self.executor.eval_as(js).await
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<bool> {
        // 走原生 setter，前端框架才能感知到输入
        let js = format!(
            "(() => {{ const el = {}; if (!el) return false; el.focus(); \
             const proto = Object.getPrototypeOf(el); \
             const desc = Object.getOwnPropertyDescriptor(proto, 'value'); \
             if (desc && desc.set) desc.set.call(el, {v}); else el.value = {v}; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); return true; }})()",
            Self::first(selector),
            v = js_string(value)
        );
        self.executor.eval_as(js).await
    }

    async fn mouse_drag(&self, selector: &str, offset_x: f64) -> Result<()> {
        info!("拖动滑块: {} 偏移 {:.1}", selector, offset_x);
        let center = self
            .center_of(selector)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        let mut at = Point {
            x: self.origin.x + center.x,
            y: self.origin.y + center.y,
        };

        self.dispatch_mouse(DispatchMouseEventType::MousePressed, at)
            .await?;
        for step in build_tracks(offset_x) {
            at.x += step;
            self.dispatch_mouse(DispatchMouseEventType::MouseMoved, at)
                .await?;
        }
        sleep(DRAG_RELEASE_PAUSE).await;
        self.dispatch_mouse(DispatchMouseEventType::MouseReleased, at)
            .await
    }

    async fn image_data(&self, selector: &str) -> Result<Option<String>> {
        let js = format!(
            "(() => {{ const el = {}; if (!el || !el.complete || !el.naturalWidth) return null; \
             if (el.src && el.src.startsWith('data:')) return el.src; \
             try {{ const c = document.createElement('canvas'); \
             c.width = el.naturalWidth; c.height = el.naturalHeight; \
             c.getContext('2d').drawImage(el, 0, 0); return c.toDataURL('image/png'); }} \
             catch (e) {{ return null; }} }})()",
            Self::first(selector)
        );
        self.executor.eval_as(js).await
    }

    async fn frame(&self, selector: &str) -> Result<Option<Box<dyn PortalPage>>> {
        #[derive(Deserialize)]
        struct FrameRect {
            x: f64,
            y: f64,
        }

        let js = format!(
            "(() => {{ const el = {}; if (!el) return null; const r = el.getBoundingClientRect(); \
             return {{x: r.left + el.clientLeft, y: r.top + el.clientTop}}; }})()",
            Self::first(selector)
        );
        let Some(rect) = self.executor.eval_as::<Option<FrameRect>>(js).await? else {
            return Ok(None);
        };

        let frame_id = self
            .frame_id_of(selector)
            .await?
            .ok_or_else(|| BrowserError::FrameNotFound {
                selector: selector.to_string(),
            })?;
        let context = self
            .page()
            .execute(CreateIsolatedWorldParams::new(frame_id))
            .await?
            .result
            .execution_context_id;
        debug!("进入 iframe: {}", selector);

        Ok(Some(Box::new(ChromePage {
            browser: Arc::clone(&self.browser),
            executor: JsExecutor::in_context(self.page().clone(), context),
            origin: Point {
                x: self.origin.x + rect.x,
                y: self.origin.y + rect.y,
            },
            is_frame: true,
        })))
    }

    async fn open_tab(&self, url: &str) -> Result<Box<dyn PortalPage>> {
        debug!("打开新标签页: {}", url);
        // new_page 返回时页面已加载完成
        let page = self
            .browser
            .new_page(url)
            .await
            .with_context(|| format!("打开新标签页失败: {}", url))?;
        Ok(Box::new(ChromePage::new(Arc::clone(&self.browser), page)))
    }

    async fn close(&self) -> Result<()> {
        if self.is_frame {
            return Ok(());
        }
        self.page().clone().close().await?;
        Ok(())
    }
}
