//! 浏览器 API 适配层
//!
//! 核心 crate 中各个 trait 的浏览器实现，以及基于 History API 的路由。

mod dialog;
mod http;
pub mod router;
mod signal_cell;
mod storage;

pub use dialog::BrowserPrompter;
pub use http::GlooHttpClient;
pub use signal_cell::SignalCell;
pub use storage::BrowserStorage;
