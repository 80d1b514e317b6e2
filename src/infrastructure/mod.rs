//! 基础设施层：持有浏览器资源，只暴露页面操作能力

pub mod chrome;
pub mod drag;
pub mod js_executor;
pub mod page;
pub mod selector;
pub mod wait;

pub use chrome::ChromePage;
pub use js_executor::JsExecutor;
pub use page::PortalPage;
pub use wait::WaitPolicy;
