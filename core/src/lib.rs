//! Propiscineiro 前端核心
//!
//! 与平台无关的业务逻辑：领域模型、接口协议、会话、路由守卫和页面视图模型。
//! 浏览器相关的实现（HTTP、LocalStorage、对话框）通过 trait 注入，
//! 因此本 crate 可以在原生环境下直接测试。

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod models;
pub mod protocol;
pub mod route;
pub mod session;
pub mod storage;
pub mod viewmodel;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use guard::{DashboardView, GuardState, Navigation};
pub use route::{AppRoute, RouteAccess};
pub use session::{Resolution, Session, SessionStore};
