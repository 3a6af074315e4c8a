//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM。定义应用的所有路由及其访问级别。

use std::fmt::Display;

use crate::models::RecordId;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    Login,
    Register,
    /// 控制面板，按用户角色分派到不同视图
    #[default]
    Dashboard,
    Clients,
    NewClient,
    ClientDetail(RecordId),
    AdminUsers,
    AdminSettings,
    SystemLogs,
    NotFound,
}

/// 路由的访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// 任何状态都可访问
    Public,
    /// 仅限未登录用户（登录、注册），已认证用户会被送回面板
    Guest,
    /// 需要已认证的会话
    Protected,
    /// 需要超级用户
    Superuser,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// 忽略查询串、片段和结尾的 `/`。`/` 与 `/dashboard` 等价。
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" | "/dashboard" => Self::Dashboard,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard/clientes" => Self::Clients,
            "/dashboard/clientes/novo" => Self::NewClient,
            "/admin/users" => Self::AdminUsers,
            "/admin/settings" => Self::AdminSettings,
            "/admin/system-logs" => Self::SystemLogs,
            other => other
                .strip_prefix("/dashboard/clientes/")
                .and_then(|id| id.parse::<RecordId>().ok())
                .map(Self::ClientDetail)
                .unwrap_or(Self::NotFound),
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Clients => "/dashboard/clientes".to_string(),
            Self::NewClient => "/dashboard/clientes/novo".to_string(),
            Self::ClientDetail(id) => format!("/dashboard/clientes/{}", id),
            Self::AdminUsers => "/admin/users".to_string(),
            Self::AdminSettings => "/admin/settings".to_string(),
            Self::SystemLogs => "/admin/system-logs".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    pub fn access(&self) -> RouteAccess {
        match self {
            Self::Login | Self::Register => RouteAccess::Guest,
            Self::Dashboard | Self::Clients | Self::NewClient | Self::ClientDetail(_) => {
                RouteAccess::Protected
            }
            Self::AdminUsers | Self::AdminSettings | Self::SystemLogs => RouteAccess::Superuser,
            Self::NotFound => RouteAccess::Public,
        }
    }

    /// 是否需要认证
    pub fn requires_auth(&self) -> bool {
        matches!(self.access(), RouteAccess::Protected | RouteAccess::Superuser)
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 已认证用户离开访客页面、或权限不足时的重定向目标
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
