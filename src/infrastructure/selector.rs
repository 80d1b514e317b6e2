//! 选择器 → JS 查询表达式

use std::fmt;

/// 页面选择器
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    /// `//` 开头按 XPath，否则按 CSS
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("//") {
            Selector::XPath(raw.to_string())
        } else {
            Selector::Css(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selector::Css(s) | Selector::XPath(s) => s,
        }
    }

    /// 生成在 `root`（JS 表达式，元素或 document）下查询全部匹配元素的表达式，结果为数组
    pub fn query_all_js(&self, root: &str) -> String {
        let literal = js_string(self.as_str());
        match self {
            Selector::Css(_) => format!("Array.from(({root}).querySelectorAll({literal}))"),
            Selector::XPath(xpath) => {
                // 在元素内查询时，XPath 以 `//` 开头会回到文档根，改成相对路径
                let relative = if root == "document" {
                    literal
                } else {
                    js_string(&format!(".{xpath}"))
                };
                format!(
                    "(() => {{ const r = ({root}); const doc = r.ownerDocument || r; \
                     const snap = doc.evaluate({relative}, r, null, \
                     XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                     const out = []; for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i)); \
                     return out; }})()"
                )
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 转成 JS 字符串字面量
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
