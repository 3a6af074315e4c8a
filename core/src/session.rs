//! 会话管理
//!
//! 会话是应用中唯一共享的可变状态：当前 token 和解析出的用户资料。
//! 它在启动时创建一次，以显式的上下文对象向下传递，而不是全局单例。
//!
//! - 只有 token 会被持久化；用户资料每次都通过 `fetch_user` 重新解析。
//! - “已认证”由 token 与用户同时存在推导得出，不单独存储。
//! - `fetch_user` 失败是发现 token 过期/失效的唯一途径，失败时整个会话被清空。

use std::cell::RefCell;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::HttpClient;
use crate::models::{RegisterPayload, User};
use crate::protocol::{ApiRequest, CurrentUserRequest, TokenRequest};
use crate::storage::TokenStorage;

/// 会话快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// token 和用户资料都已就绪
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    /// 持有 token 但用户资料尚未解析
    pub fn is_pending(&self) -> bool {
        self.token.is_some() && self.user.is_none()
    }

    pub fn is_superuser(&self) -> bool {
        self.is_authenticated() && self.user.as_ref().is_some_and(|u| u.is_superuser)
    }
}

/// `fetch_user` 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// 用户资料已解析，会话进入已认证状态
    Resolved(User),
    /// 同一个 token 的解析已在进行中，本次调用什么都没做
    InFlight,
    /// 请求期间 token 已被替换（登出或重新登录），结果被丢弃
    Superseded,
    /// 解析失败，会话已清空
    Failed(ApiError),
}

type Listener = Box<dyn Fn(&Session)>;

/// 会话存储
pub struct SessionStore<C, S> {
    api: ApiClient<C>,
    storage: S,
    token_key: String,
    state: RefCell<Session>,
    /// 正在解析的 token
    resolving: RefCell<Option<String>>,
    listeners: RefCell<Vec<Listener>>,
}

impl<C: HttpClient, S: TokenStorage> SessionStore<C, S> {
    pub fn new(config: &ClientConfig, http: C, storage: S) -> Self {
        Self {
            api: ApiClient::new(config.api_base_url.clone(), http),
            storage,
            token_key: config.token_storage_key.clone(),
            state: RefCell::new(Session::default()),
            resolving: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        }
    }

    // --- 读取 ---

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    /// 持久化存储中的 token（可能尚未载入内存）
    pub fn persisted_token(&self) -> Option<String> {
        self.storage.load(&self.token_key)
    }

    /// 当前 token 是否正在解析
    pub fn is_resolving(&self) -> bool {
        let current = self.token();
        current.is_some() && *self.resolving.borrow() == current
    }

    /// 注册快照监听器，每次状态提交后调用
    pub fn subscribe(&self, listener: impl Fn(&Session) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// 整体替换状态并通知监听器
    fn commit(&self, next: Session) {
        *self.state.borrow_mut() = next;

        let snapshot = self.snapshot();
        for listener in self.listeners.borrow().iter() {
            listener(&snapshot);
        }
    }

    // --- 生命周期 ---

    /// 启动时把持久化的 token 载入内存（用户资料保持为空，等待解析）
    ///
    /// 返回是否载入了 token。
    pub fn restore(&self) -> bool {
        if self.state.borrow().token.is_some() {
            return false;
        }
        match self.persisted_token() {
            Some(token) if !token.is_empty() => {
                tracing::info!("restored persisted session token");
                self.commit(Session {
                    token: Some(token),
                    user: None,
                });
                true
            }
            _ => false,
        }
    }

    /// 登录
    ///
    /// 成功获取 token 后立即持久化并解析用户资料。token 请求失败时不修改任何状态；
    /// 用户资料解析失败时会话被清空，错误返回给调用方显示。
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        let request = TokenRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.api.send(&request, None).await?;
        let token = response.access_token;

        self.storage.save(&self.token_key, &token);
        self.commit(Session {
            token: Some(token),
            user: None,
        });
        tracing::info!(%username, "login accepted, resolving profile");

        match self.fetch_user().await {
            Resolution::Resolved(_) | Resolution::InFlight => Ok(()),
            Resolution::Superseded => Err(ApiError::unauthorized("sessão substituída durante o login")),
            Resolution::Failed(e) => Err(e),
        }
    }

    /// 注册新账号，不改变会话状态
    pub async fn register(&self, email: &str, username: &str, password: &str) -> ApiResult<()> {
        let payload = RegisterPayload {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        self.api.send(&payload, None).await?;
        tracing::info!(%username, "account registered");
        Ok(())
    }

    /// 登出：清空内存状态与持久化的 token
    pub fn logout(&self) {
        self.storage.remove(&self.token_key);
        *self.resolving.borrow_mut() = None;
        self.commit(Session::default());
        tracing::info!("session cleared by logout");
    }

    /// 用当前 token 解析用户资料
    ///
    /// 任何失败（网络或 token 被拒绝）都会清空整个会话。
    /// 请求返回时如果 token 已经变化，结果被丢弃，不影响新的会话。
    pub async fn fetch_user(&self) -> Resolution {
        let Some(token) = self.token() else {
            self.clear_after_failure();
            return Resolution::Failed(ApiError::unauthorized("nenhuma sessão ativa"));
        };

        if self.resolving.borrow().as_deref() == Some(token.as_str()) {
            return Resolution::InFlight;
        }
        *self.resolving.borrow_mut() = Some(token.clone());

        let result = self.api.send(&CurrentUserRequest, Some(&token)).await;

        let still_current = self.token().as_deref() == Some(token.as_str());
        if self.resolving.borrow().as_deref() == Some(token.as_str()) {
            *self.resolving.borrow_mut() = None;
        }
        if !still_current {
            tracing::debug!("discarding profile resolution for a replaced token");
            return Resolution::Superseded;
        }

        match result {
            Ok(user) => {
                tracing::info!(user = %user.username, superuser = user.is_superuser, "session authenticated");
                self.commit(Session {
                    token: Some(token),
                    user: Some(user.clone()),
                });
                Resolution::Resolved(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile resolution failed, clearing session");
                self.clear_after_failure();
                Resolution::Failed(e)
            }
        }
    }

    fn clear_after_failure(&self) {
        self.storage.remove(&self.token_key);
        self.commit(Session::default());
    }

    /// 使用当前 token 发送任意接口请求
    pub async fn call<R: ApiRequest>(&self, request: &R) -> ApiResult<R::Response> {
        let token = self.token();
        self.api.send(request, token.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::http::{HttpMethod, MockHttpClient};
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use std::rc::Rc;

    const BASE: &str = "http://api.test";
    const TOKEN_URL: &str = "http://api.test/auth/token";
    const ME_URL: &str = "http://api.test/users/me";

    type TestStore = SessionStore<Rc<MockHttpClient>, MemoryStorage>;

    fn config() -> ClientConfig {
        ClientConfig::from_overrides(Some(BASE), None, None)
    }

    fn store_with(storage: MemoryStorage) -> (Rc<MockHttpClient>, TestStore) {
        let mock = Rc::new(MockHttpClient::new());
        let store = SessionStore::new(&config(), mock.clone(), storage);
        (mock, store)
    }

    fn alice() -> serde_json::Value {
        json!({"id": 1, "email": "alice@example.com", "username": "alice", "is_superuser": false})
    }

    fn record_snapshots(store: &TestStore) -> Rc<RefCell<Vec<Session>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |s| sink.borrow_mut().push(s.clone()));
        seen
    }

    #[tokio::test]
    async fn test_login_persists_token_and_resolves_user() {
        let storage = MemoryStorage::new();
        let (mock, store) = store_with(storage.clone());
        mock.mock_response(HttpMethod::Post, TOKEN_URL, 200, json!({"access_token": "T", "token_type": "bearer"}));
        mock.mock_response(HttpMethod::Get, ME_URL, 200, alice());

        store.login("alice", "secret").await.unwrap();

        assert_eq!(storage.load("token").as_deref(), Some("T"));
        let session = store.snapshot();
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().username, "alice");
        assert!(!session.is_superuser());

        let me = mock.last_request().unwrap();
        assert_eq!(me.url, ME_URL);
        assert_eq!(me.header("Authorization"), Some("Bearer T"));
    }

    #[tokio::test]
    async fn test_authenticated_only_after_token_and_user() {
        let (mock, store) = store_with(MemoryStorage::new());
        mock.mock_response(HttpMethod::Post, TOKEN_URL, 200, json!({"access_token": "T"}));
        mock.mock_response(HttpMethod::Get, ME_URL, 200, alice());
        let seen = record_snapshots(&store);

        assert!(!store.snapshot().is_authenticated());
        store.login("alice", "secret").await.unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        // 中间状态：有 token，没有用户，未认证
        assert!(seen[0].is_pending());
        assert!(!seen[0].is_authenticated());
        assert!(seen[1].is_authenticated());
        for s in seen.iter() {
            assert_eq!(s.is_authenticated(), s.token().is_some() && s.user().is_some());
        }
    }

    #[tokio::test]
    async fn test_login_rejected_commits_nothing() {
        let storage = MemoryStorage::new();
        let (mock, store) = store_with(storage.clone());
        mock.mock_response(HttpMethod::Post, TOKEN_URL, 401, json!({"detail": "Incorrect username or password"}));
        let seen = record_snapshots(&store);

        let err = store.login("alice", "wrong").await.unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert_eq!(err.message, "Incorrect username or password");
        assert!(seen.borrow().is_empty());
        assert_eq!(storage.load("token"), None);
        assert_eq!(mock.count(HttpMethod::Get, ME_URL), 0);
    }

    #[tokio::test]
    async fn test_login_with_unresolvable_profile_clears_session() {
        let storage = MemoryStorage::new();
        let (mock, store) = store_with(storage.clone());
        mock.mock_response(HttpMethod::Post, TOKEN_URL, 200, json!({"access_token": "T"}));
        mock.mock_response(HttpMethod::Get, ME_URL, 500, json!({"detail": "boom"}));

        let err = store.login("alice", "secret").await.unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(storage.load("token"), None);
    }

    #[tokio::test]
    async fn test_failed_fetch_user_always_clears() {
        let storage = MemoryStorage::new();
        storage.save("token", "expired");
        let (mock, store) = store_with(storage.clone());
        mock.mock_response(HttpMethod::Get, ME_URL, 401, json!({"detail": "Could not validate credentials"}));

        assert!(store.restore());
        assert!(store.snapshot().is_pending());

        let outcome = store.fetch_user().await;

        assert!(matches!(outcome, Resolution::Failed(ref e) if e.is_unauthorized()));
        let session = store.snapshot();
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
        assert!(!session.is_authenticated());
        assert_eq!(storage.load("token"), None);
    }

    #[tokio::test]
    async fn test_failed_fetch_user_clears_authenticated_session() {
        let storage = MemoryStorage::new();
        let (mock, store) = store_with(storage.clone());
        mock.mock_response(HttpMethod::Post, TOKEN_URL, 200, json!({"access_token": "T"}));
        mock.mock_response(HttpMethod::Get, ME_URL, 200, alice());
        store.login("alice", "secret").await.unwrap();
        assert!(store.snapshot().is_authenticated());

        // token 被后端吊销
        mock.mock_network_error(HttpMethod::Get, ME_URL);
        let outcome = store.fetch_user().await;

        assert!(matches!(outcome, Resolution::Failed(ref e) if e.kind == ApiErrorKind::Network));
        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(storage.load("token"), None);
        assert_eq!(mock.count(HttpMethod::Get, ME_URL), 2);
    }

    #[tokio::test]
    async fn test_fetch_user_without_token_fails_without_request() {
        let (mock, store) = store_with(MemoryStorage::new());
        let outcome = store.fetch_user().await;
        assert!(matches!(outcome, Resolution::Failed(_)));
        assert!(mock.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_persisted_token() {
        let storage = MemoryStorage::new();
        let (mock, store) = store_with(storage.clone());
        mock.mock_response(HttpMethod::Post, TOKEN_URL, 200, json!({"access_token": "T"}));
        mock.mock_response(HttpMethod::Get, ME_URL, 200, alice());
        store.login("alice", "secret").await.unwrap();

        store.logout();

        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(storage.load("token"), None);

        // 模拟刷新页面：新的会话没有可恢复的 token
        let (_, reloaded) = store_with(storage);
        assert!(!reloaded.restore());
        assert_eq!(reloaded.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn test_restore_keeps_user_empty_until_fetch() {
        let storage = MemoryStorage::new();
        storage.save("token", "T");
        let (mock, store) = store_with(storage);
        mock.mock_response(
            HttpMethod::Get,
            ME_URL,
            200,
            json!({"id": 2, "email": "root@example.com", "username": "root", "is_superuser": true}),
        );

        assert!(store.restore());
        assert!(!store.snapshot().is_authenticated());
        // 已经有 token 时不会重复载入
        assert!(!store.restore());

        let outcome = store.fetch_user().await;
        assert!(matches!(outcome, Resolution::Resolved(ref u) if u.is_superuser));
        assert!(store.snapshot().is_superuser());
    }

    #[tokio::test]
    async fn test_register_does_not_touch_session() {
        let (mock, store) = store_with(MemoryStorage::new());
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/register",
            200,
            json!({"id": 9, "email": "new@example.com", "username": "novo", "is_superuser": false}),
        );
        let seen = record_snapshots(&store);

        store.register("new@example.com", "novo", "segredo").await.unwrap();

        assert!(seen.borrow().is_empty());
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"email": "new@example.com", "username": "novo", "password": "segredo"}));
    }

    #[tokio::test]
    async fn test_register_duplicate_is_validation_error() {
        let (mock, store) = store_with(MemoryStorage::new());
        mock.mock_response(
            HttpMethod::Post,
            "http://api.test/auth/register",
            400,
            json!({"detail": "Email already registered"}),
        );

        let err = store.register("a@b.c", "a", "123456").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.message, "Email already registered");
    }

    #[tokio::test]
    async fn test_resolution_for_replaced_token_is_discarded() {
        let storage = MemoryStorage::new();
        storage.save("token", "OLD");
        let (mock, store) = store_with(storage);
        mock.mock_response(HttpMethod::Get, ME_URL, 200, alice());
        store.restore();

        let release = mock.hold_next();
        let (outcome, ()) = futures::join!(store.fetch_user(), async {
            // 在请求返回之前登出
            store.logout();
            let _ = release.send(());
        });

        assert_eq!(outcome, Resolution::Superseded);
        assert_eq!(store.snapshot(), Session::default());
    }

    #[tokio::test]
    async fn test_concurrent_resolution_is_coalesced() {
        let storage = MemoryStorage::new();
        storage.save("token", "T");
        let (mock, store) = store_with(storage);
        mock.mock_response(HttpMethod::Get, ME_URL, 200, alice());
        store.restore();

        let release = mock.hold_next();
        let (first, second, ()) = futures::join!(store.fetch_user(), store.fetch_user(), async {
            let _ = release.send(());
        });

        assert!(matches!(first, Resolution::Resolved(_)));
        assert_eq!(second, Resolution::InFlight);
        assert_eq!(mock.count(HttpMethod::Get, ME_URL), 1);
        assert!(!store.is_resolving());
    }

    #[tokio::test]
    async fn test_call_attaches_current_token() {
        let (mock, store) = store_with(MemoryStorage::new());
        mock.mock_response(HttpMethod::Post, TOKEN_URL, 200, json!({"access_token": "T"}));
        mock.mock_response(HttpMethod::Get, ME_URL, 200, alice());
        mock.mock_response(HttpMethod::Get, "http://api.test/api/v1/clientes/", 200, json!([]));
        store.login("alice", "secret").await.unwrap();

        let clients = store
            .call(&crate::protocol::ListRequest::<crate::models::Client>::new())
            .await
            .unwrap();
        assert!(clients.is_empty());
        assert_eq!(mock.last_request().unwrap().header("Authorization"), Some("Bearer T"));
    }
}
