//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 导航流程："请求 -> 守卫 -> 渲染 / 加载 / 重定向"。
//! 守卫判断本身在 `propiscineiro_core::guard` 中，这里只负责执行结果。

use leptos::prelude::*;
use propiscineiro_core::guard::{GuardState, Navigation, decide};
use propiscineiro_core::route::AppRoute;
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 重定向时使用，不留下历史记录
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// `requested` 是用户想去的路由；守卫状态由认证模块注入，
/// 两者任一变化都会重新执行守卫。
#[derive(Clone, Copy)]
pub struct RouterService {
    requested: RwSignal<AppRoute>,
    guard: Signal<GuardState>,
}

impl RouterService {
    fn new(guard: Signal<GuardState>) -> Self {
        let path = current_path();
        let initial = AppRoute::from_path(&path);
        // `/` 规范化为 `/dashboard`
        if initial.to_path() != path && initial != AppRoute::NotFound {
            replace_history_state(&initial.to_path());
        }

        Self {
            requested: RwSignal::new(initial),
            guard,
        }
    }

    /// 当前路由的守卫结果
    pub fn navigation(&self) -> Signal<Navigation> {
        let requested = self.requested;
        let guard = self.guard;
        Signal::derive(move || decide(requested.get(), guard.get()))
    }

    pub fn navigate_to(&self, route: AppRoute) {
        if self.requested.get_untracked() == route {
            return;
        }
        push_history_state(&route.to_path());
        self.requested.set(route);
    }

    /// 浏览器后退/前进，同样经过守卫
    fn init_popstate_listener(&self) {
        let requested = self.requested;

        let closure = Closure::<dyn Fn()>::new(move || {
            let route = AppRoute::from_path(&current_path());
            requested.set(route);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 守卫结果为重定向时替换地址栏并切换路由
    fn setup_guard_redirect(&self) {
        let requested = self.requested;
        let guard = self.guard;

        Effect::new(move |_| {
            let route = requested.get();
            let state = guard.get();

            if let Navigation::Redirect(target) = decide(route, state) {
                tracing::info!(from = %route, to = %target, ?state, "[Router] guard redirect");
                replace_history_state(&target.to_path());
                requested.set(target);
            }
        });
    }
}

fn provide_router(guard: Signal<GuardState>) -> RouterService {
    let router = RouterService::new(guard);

    router.init_popstate_listener();
    router.setup_guard_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    /// 守卫状态信号
    guard: Signal<GuardState>,
    children: Children,
) -> impl IntoView {
    provide_router(guard);

    children()
}

/// 路由出口组件
///
/// 只有守卫放行的路由才会交给 `matcher`；加载中和重定向途中显示占位。
#[component]
pub fn RouterOutlet(matcher: fn(AppRoute) -> AnyView) -> impl IntoView {
    let navigation = use_router().navigation();

    move || match navigation.get() {
        Navigation::Render(route) => matcher(route),
        Navigation::Loading | Navigation::Redirect(_) => view! {
            <div class="flex items-center justify-center min-h-screen">
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </div>
        }
        .into_any(),
    }
}

/// 站内链接，点击时走路由服务而不是整页刷新
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate_to(to);
    };

    view! {
        <a href=to.to_path() class=class on:click=on_click>
            {children()}
        </a>
    }
}
