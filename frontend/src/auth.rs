//! 认证模块
//!
//! 会话存储在启动时创建一次，放进 Context 里向下传递。
//! 存储每次提交新快照都会同步到一个信号，路由守卫和页面都从这个信号读取。

use std::rc::Rc;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;
use propiscineiro_core::guard::{GuardState, needs_resolution};
use propiscineiro_core::viewmodel::Prompter;
use propiscineiro_core::{ApiResult, ClientConfig, Session, SessionStore};

use crate::web::{BrowserPrompter, BrowserStorage, GlooHttpClient};

pub type AppSession = SessionStore<GlooHttpClient, BrowserStorage>;

/// 认证上下文
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 最近一次提交的会话快照
    pub state: ReadSignal<Session>,
    store: StoredValue<Rc<AppSession>, LocalStorage>,
    config: StoredValue<ClientConfig>,
}

impl AuthContext {
    pub fn new(config: ClientConfig) -> Self {
        let store = Rc::new(SessionStore::new(&config, GlooHttpClient, BrowserStorage));
        let (state, set_state) = signal(store.snapshot());

        store.subscribe(move |snapshot| {
            if set_state.try_set(snapshot.clone()).is_some() {
                tracing::debug!("session snapshot dropped: signal disposed");
            }
        });

        Self {
            state,
            store: StoredValue::new_local(store),
            config: StoredValue::new(config),
        }
    }

    pub fn store(&self) -> Rc<AppSession> {
        self.store.get_value()
    }

    pub fn config(&self) -> ClientConfig {
        self.config.get_value()
    }

    pub fn prompter(&self) -> Rc<dyn Prompter> {
        Rc::new(BrowserPrompter)
    }

    /// 守卫状态信号（注入路由服务）
    pub fn guard_signal(&self) -> Signal<GuardState> {
        let state = self.state;
        let store = self.store;
        Signal::derive(move || {
            let session = state.get();
            let persisted = store.with_value(|s| s.persisted_token());
            GuardState::evaluate(&session, persisted.as_deref())
        })
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 载入持久化的 token，并在 token 存在而用户未解析时自动触发解析。
pub fn init_auth(ctx: &AuthContext) {
    ctx.store().restore();

    let ctx = *ctx;
    Effect::new(move |_| {
        let session = ctx.state.get();
        let store = ctx.store();
        let persisted = store.persisted_token();
        if !needs_resolution(&session, persisted.as_deref(), store.is_resolving()) {
            return;
        }
        // token 只存在于持久化存储时先载入内存
        store.restore();
        spawn_local(async move {
            store.fetch_user().await;
        });
    });
}

/// 登录
pub async fn login(ctx: &AuthContext, username: String, password: String) -> ApiResult<()> {
    let store = ctx.store();
    store.login(&username, &password).await
}

pub async fn register(
    ctx: &AuthContext,
    email: String,
    username: String,
    password: String,
) -> ApiResult<()> {
    let store = ctx.store();
    store.register(&email, &username, &password).await
}

/// 注销
///
/// 导航由路由服务的守卫自动处理。
pub fn logout(ctx: &AuthContext) {
    ctx.store().logout();
}
