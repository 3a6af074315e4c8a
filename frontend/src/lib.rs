//! Propiscineiro 前端应用
//!
//! - `web`: 浏览器适配层与路由服务
//! - `auth`: 会话上下文
//! - `components`: 页面组件
//!
//! 会话、守卫和各页面的视图模型都在 `propiscineiro-core` 中，这里只负责渲染。

mod auth;
mod components {
    pub mod crud;
    pub mod dashboard;
    pub mod layout;
    pub mod login;
    pub mod register;
    pub mod clients {
        pub mod create;
        pub mod detail;
        pub mod list;
    }
    pub mod admin {
        pub mod logs;
        pub mod settings;
        pub mod users;
    }
}
pub mod logging;
pub(crate) mod web;

use leptos::prelude::*;
use propiscineiro_core::{AppRoute, ClientConfig};

use crate::auth::{AuthContext, init_auth};
use crate::components::admin::{logs::SystemLogsPage, settings::AdminSettingsPage, users::AdminUsersPage};
use crate::components::clients::{create::NewClientPage, detail::ClientDetailPage, list::ClientListPage};
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::register::RegisterPage;
use crate::web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Clients => view! { <ClientListPage /> }.into_any(),
        AppRoute::NewClient => view! { <NewClientPage /> }.into_any(),
        AppRoute::ClientDetail(id) => view! { <ClientDetailPage id=id /> }.into_any(),
        AppRoute::AdminUsers => view! { <AdminUsersPage /> }.into_any(),
        AppRoute::AdminSettings => view! { <AdminSettingsPage /> }.into_any(),
        AppRoute::SystemLogs => view! { <SystemLogsPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center space-y-4">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl">"Página não encontrada"</p>
                    <Link to=AppRoute::Dashboard class="btn btn-primary">"Voltar ao painel"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 会话上下文
    let auth_ctx = AuthContext::new(ClientConfig::from_build_env());
    provide_context(auth_ctx);

    // 2. 载入持久化 token 并开始解析用户
    init_auth(&auth_ctx);

    // 3. 守卫状态注入路由服务
    let guard = auth_ctx.guard_signal();

    view! {
        <Router guard=guard>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
