//! 路由守卫状态机
//!
//! `NoSession` → `Pending` → `Authenticated` → `NoSession`。
//! 守卫只读取会话快照和持久化的 token，不产生副作用；
//! 需要解析用户时由调用方触发 [`SessionStore::fetch_user`](crate::session::SessionStore::fetch_user)。

use crate::models::User;
use crate::route::{AppRoute, RouteAccess};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// 内存和持久化存储中都没有 token
    NoSession,
    /// 有 token，用户资料尚未解析
    Pending,
    Authenticated { superuser: bool },
}

impl GuardState {
    /// 计算守卫状态
    ///
    /// token 只要存在于会话或持久化存储之一，就视为存在。
    pub fn evaluate(session: &Session, persisted_token: Option<&str>) -> Self {
        if let (Some(_), Some(user)) = (session.token(), session.user()) {
            return Self::Authenticated {
                superuser: user.is_superuser,
            };
        }
        let has_token = session.token().is_some() || persisted_token.is_some_and(|t| !t.is_empty());
        if has_token {
            Self::Pending
        } else {
            Self::NoSession
        }
    }
}

/// 是否应该触发一次用户解析
///
/// 条件：token 存在、用户未加载、没有正在进行的解析。
pub fn needs_resolution(session: &Session, persisted_token: Option<&str>, in_flight: bool) -> bool {
    !in_flight && GuardState::evaluate(session, persisted_token) == GuardState::Pending
}

/// 面板视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView {
    Superuser,
    Standard,
}

impl DashboardView {
    pub fn for_user(user: &User) -> Self {
        if user.is_superuser {
            Self::Superuser
        } else {
            Self::Standard
        }
    }
}

/// 导航决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(AppRoute),
    /// 显示加载占位，既不渲染内容也不跳转
    Loading,
    Redirect(AppRoute),
}

/// 对目标路由做守卫判断
pub fn decide(route: AppRoute, state: GuardState) -> Navigation {
    match (route.access(), state) {
        (RouteAccess::Public, _) => Navigation::Render(route),

        (RouteAccess::Guest, GuardState::Authenticated { .. }) => {
            Navigation::Redirect(AppRoute::auth_success_redirect())
        }
        (RouteAccess::Guest, GuardState::Pending) => Navigation::Loading,
        (RouteAccess::Guest, GuardState::NoSession) => Navigation::Render(route),

        (_, GuardState::NoSession) => Navigation::Redirect(AppRoute::auth_failure_redirect()),
        (_, GuardState::Pending) => Navigation::Loading,

        (RouteAccess::Superuser, GuardState::Authenticated { superuser: false }) => {
            Navigation::Redirect(AppRoute::auth_success_redirect())
        }
        (_, GuardState::Authenticated { .. }) => Navigation::Render(route),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::{HttpMethod, MockHttpClient};
    use crate::session::SessionStore;
    use crate::storage::{MemoryStorage, TokenStorage};
    use serde_json::json;
    use std::rc::Rc;

    fn user(superuser: bool) -> serde_json::Value {
        json!({"id": 1, "email": "a@b.c", "username": "alice", "is_superuser": superuser})
    }

    fn store(storage: MemoryStorage) -> (Rc<MockHttpClient>, SessionStore<Rc<MockHttpClient>, MemoryStorage>) {
        let mock = Rc::new(MockHttpClient::new());
        let config = ClientConfig::from_overrides(Some("http://api.test"), None, None);
        (mock.clone(), SessionStore::new(&config, mock, storage))
    }

    #[test]
    fn test_empty_session_is_no_session() {
        let state = GuardState::evaluate(&Session::default(), None);
        assert_eq!(state, GuardState::NoSession);
        assert_eq!(
            decide(AppRoute::Dashboard, state),
            Navigation::Redirect(AppRoute::Login)
        );
        assert_eq!(decide(AppRoute::Login, state), Navigation::Render(AppRoute::Login));
    }

    #[test]
    fn test_persisted_token_alone_is_pending() {
        let state = GuardState::evaluate(&Session::default(), Some("T"));
        assert_eq!(state, GuardState::Pending);
        assert_eq!(decide(AppRoute::Clients, state), Navigation::Loading);
        assert_eq!(decide(AppRoute::SystemLogs, state), Navigation::Loading);
        // 访客页面同样等待解析，不会先闪出登录页
        assert_eq!(decide(AppRoute::Login, state), Navigation::Loading);
        assert_eq!(decide(AppRoute::Register, state), Navigation::Loading);
        assert!(needs_resolution(&Session::default(), Some("T"), false));
        assert!(!needs_resolution(&Session::default(), Some("T"), true));
        assert!(!needs_resolution(&Session::default(), None, false));
    }

    #[test]
    fn test_non_superuser_bounced_from_admin() {
        let state = GuardState::Authenticated { superuser: false };
        assert_eq!(
            decide(AppRoute::AdminUsers, state),
            Navigation::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            decide(AppRoute::ClientDetail(3), state),
            Navigation::Render(AppRoute::ClientDetail(3))
        );
        assert_eq!(
            decide(AppRoute::Login, state),
            Navigation::Redirect(AppRoute::Dashboard)
        );
    }

    #[test]
    fn test_superuser_reaches_admin() {
        let state = GuardState::Authenticated { superuser: true };
        assert_eq!(
            decide(AppRoute::AdminSettings, state),
            Navigation::Render(AppRoute::AdminSettings)
        );
        assert_eq!(
            decide(AppRoute::NotFound, GuardState::NoSession),
            Navigation::Render(AppRoute::NotFound)
        );
    }

    #[test]
    fn test_dashboard_view_has_two_outcomes() {
        let mut u = User {
            id: 1,
            email: "a@b.c".to_string(),
            username: "a".to_string(),
            is_superuser: true,
        };
        assert_eq!(DashboardView::for_user(&u), DashboardView::Superuser);
        u.is_superuser = false;
        assert_eq!(DashboardView::for_user(&u), DashboardView::Standard);
    }

    #[tokio::test]
    async fn test_login_flow_reaches_standard_dashboard() {
        let (mock, store) = store(MemoryStorage::new());
        mock.mock_response(HttpMethod::Post, "http://api.test/auth/token", 200, json!({"access_token": "T"}));
        mock.mock_response(HttpMethod::Get, "http://api.test/users/me", 200, user(false));

        store.login("alice", "secret").await.unwrap();

        let session = store.snapshot();
        let state = GuardState::evaluate(&session, store.persisted_token().as_deref());
        assert_eq!(state, GuardState::Authenticated { superuser: false });
        assert_eq!(decide(AppRoute::Dashboard, state), Navigation::Render(AppRoute::Dashboard));
        assert_eq!(
            DashboardView::for_user(session.user().unwrap()),
            DashboardView::Standard
        );
    }

    #[tokio::test]
    async fn test_reload_resolves_superuser() {
        let storage = MemoryStorage::new();
        storage.save("token", "T");
        let (mock, store) = store(storage);
        mock.mock_response(HttpMethod::Get, "http://api.test/users/me", 200, user(true));

        store.restore();
        let persisted = store.persisted_token();
        assert!(needs_resolution(&store.snapshot(), persisted.as_deref(), store.is_resolving()));

        store.fetch_user().await;

        let state = GuardState::evaluate(&store.snapshot(), store.persisted_token().as_deref());
        assert_eq!(state, GuardState::Authenticated { superuser: true });
        assert!(!needs_resolution(&store.snapshot(), persisted.as_deref(), false));
    }

    #[tokio::test]
    async fn test_rejected_token_lands_on_login() {
        let storage = MemoryStorage::new();
        storage.save("token", "stale");
        let (mock, store) = store(storage);
        mock.mock_response(HttpMethod::Get, "http://api.test/users/me", 401, json!({"detail": "expired"}));

        store.restore();
        store.fetch_user().await;

        let state = GuardState::evaluate(&store.snapshot(), store.persisted_token().as_deref());
        assert_eq!(state, GuardState::NoSession);
        assert_eq!(
            decide(AppRoute::Clients, state),
            Navigation::Redirect(AppRoute::Login)
        );
    }

    #[tokio::test]
    async fn test_logout_then_reload_starts_without_session() {
        let storage = MemoryStorage::new();
        let (mock, store) = store(storage.clone());
        mock.mock_response(HttpMethod::Post, "http://api.test/auth/token", 200, json!({"access_token": "T"}));
        mock.mock_response(HttpMethod::Get, "http://api.test/users/me", 200, user(false));
        store.login("alice", "secret").await.unwrap();
        store.logout();

        let (_, reloaded) = self::store(storage);
        reloaded.restore();
        let state = GuardState::evaluate(&reloaded.snapshot(), reloaded.persisted_token().as_deref());
        assert_eq!(state, GuardState::NoSession);
    }
}
