//! JS 执行器 - 基础设施层
//!
//! 持有 page 资源，只暴露"执行 JS"的能力。可以绑定到某个 iframe 的执行上下文。

use anyhow::{anyhow, Result};
use chromiumoxide::cdp::js_protocol::runtime::{EvaluateParams, ExecutionContextId, RemoteObjectId};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// JS 执行器
///
/// - 持有 Page
/// - `context` 为空时在主 frame 执行，否则在指定执行上下文（iframe）中执行
/// - 不认识订单 / 登录
#[derive(Clone)]
pub struct JsExecutor {
    page: Page,
    context: Option<ExecutionContextId>,
}

impl JsExecutor {
    /// 创建主 frame 上的执行器
    pub fn new(page: Page) -> Self {
        Self {
            page,
            context: None,
        }
    }

    /// 创建绑定到指定执行上下文的执行器
    pub fn in_context(page: Page, context: ExecutionContextId) -> Self {
        Self {
            page,
            context: Some(context),
        }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = match &self.context {
            None => self.page.evaluate(js_code.into()).await?,
            Some(context) => {
                let params = EvaluateParams::builder()
                    .expression(js_code.into())
                    .context_id(context.clone())
                    .await_promise(true)
                    .return_by_value(true)
                    .build()
                    .map_err(|e| anyhow!("构造 Runtime.evaluate 参数失败: {}", e))?;
                self.page.evaluate_expression(params).await?
            }
        };
        // JS 返回 undefined 时没有 value
        Ok(result.value().cloned().unwrap_or(JsonValue::Null))
    }

    /// 执行 JS 代码，返回结果对象的句柄（用于 DOM 域命令）
    ///
    /// # 参数
    /// - `js_code`: 结果为 DOM 元素的表达式
    ///
    /// # 返回
    /// 表达式结果为 null / undefined 时返回 None
    pub async fn eval_handle(&self, js_code: impl Into<String>) -> Result<Option<RemoteObjectId>> {
        let mut builder = EvaluateParams::builder()
            .expression(js_code.into())
            .return_by_value(false);
        if let Some(context) = &self.context {
            builder = builder.context_id(context.clone());
        }
        let params = builder
            .build()
            .map_err(|e| anyhow!("构造 Runtime.evaluate 参数失败: {}", e))?;
        let returns = self.page.execute(params).await?.result;
        if let Some(details) = returns.exception_details {
            return Err(anyhow!("JS 执行异常: {}", details.text));
        }
        Ok(returns.result.object_id)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}
