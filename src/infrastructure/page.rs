//! 页面能力抽象 - 基础设施层
//!
//! 业务代码只通过 [`PortalPage`] 操作页面，不直接接触浏览器。
//! 选择器以 `//` 开头时按 XPath 处理，否则按 CSS 处理。

use anyhow::Result;
use async_trait::async_trait;

/// 一个可操作的页面（或页面中的某个 iframe）
///
/// 所有查询都是"立即查询"，不做等待；需要等待时使用 [`super::wait`] 中的函数。
#[async_trait]
pub trait PortalPage: Send + Sync {
    /// 匹配元素数量
    async fn count(&self, selector: &str) -> Result<usize>;

    /// 第一个匹配元素是否可见
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    /// 第一个匹配元素的文本（已去除首尾空白）
    async fn text(&self, selector: &str) -> Result<Option<String>>;

    /// 第一个匹配元素的属性
    async fn attr(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// 在第 `index` 个 `scope` 元素内查询 `selector`，返回全部文本
    async fn scoped_texts(&self, scope: &str, index: usize, selector: &str)
        -> Result<Vec<String>>;

    /// 在第 `index` 个 `scope` 元素内查询 `selector`，返回第一个匹配元素的属性
    async fn scoped_attr(
        &self,
        scope: &str,
        index: usize,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>>;

    /// 每个匹配行内 `td` 单元格的文本
    async fn table_rows(&self, row_selector: &str) -> Result<Vec<Vec<String>>>;

    /// 点击第一个匹配元素，元素不存在时返回 false
    async fn click(&self, selector: &str) -> Result<bool>;

    /// 点击第 `index` 个匹配元素，元素不存在时返回 false
    async fn click_nth(&self, selector: &str, index: usize) -> Result<bool>;

    /// 设置输入框的值，元素不存在时返回 false
    async fn set_value(&self, selector: &str, value: &str) -> Result<bool>;

    /// 按住元素中心水平拖动 `offset_x` 像素
    async fn mouse_drag(&self, selector: &str, offset_x: f64) -> Result<()>;

    /// 已加载完成的图片数据（data URL），未就绪时为 None
    async fn image_data(&self, selector: &str) -> Result<Option<String>>;

    /// 进入 iframe
    async fn frame(&self, selector: &str) -> Result<Option<Box<dyn PortalPage>>>;

    /// 在新标签页中打开链接
    async fn open_tab(&self, url: &str) -> Result<Box<dyn PortalPage>>;

    /// 关闭当前标签页
    async fn close(&self) -> Result<()>;
}
