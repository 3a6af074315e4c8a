use leptos::prelude::*;
use propiscineiro_core::AppRoute;

use crate::auth::{logout, use_auth};
use crate::web::router::Link;

/// 已登录页面的外壳：导航栏 + 内容
#[component]
pub fn Layout(
    #[prop(into)] title: String,
    children: Children,
) -> impl IntoView {
    let auth = use_auth();
    let state = auth.state;

    let username = move || {
        state
            .get()
            .user()
            .map(|u| u.username.clone())
            .unwrap_or_default()
    };
    let is_superuser = move || state.get().is_superuser();

    let on_logout = move |_| logout(&auth);

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <div class="navbar bg-base-100 shadow-md px-4">
                <div class="flex-1 gap-2">
                    <Link to=AppRoute::Dashboard class="btn btn-ghost text-xl text-primary">
                        "Propiscineiro"
                    </Link>
                    <ul class="menu menu-horizontal px-1 hidden md:flex">
                        <li><Link to=AppRoute::Dashboard>"Painel"</Link></li>
                        <li><Link to=AppRoute::Clients>"Clientes"</Link></li>
                        <Show when=is_superuser>
                            <li><Link to=AppRoute::AdminUsers>"Usuários"</Link></li>
                            <li><Link to=AppRoute::AdminSettings>"Configurações"</Link></li>
                            <li><Link to=AppRoute::SystemLogs>"Logs"</Link></li>
                        </Show>
                    </ul>
                </div>
                <div class="flex-none gap-3">
                    <span class="text-sm text-base-content/70 hidden sm:inline">{username}</span>
                    <Show when=is_superuser>
                        <span class="badge badge-secondary">"admin"</span>
                    </Show>
                    <button on:click=on_logout class="btn btn-outline btn-error btn-sm">
                        "Sair"
                    </button>
                </div>
            </div>

            <main class="max-w-7xl mx-auto p-4 md:p-8 space-y-6">
                <h1 class="text-2xl font-bold">{title}</h1>
                {children()}
            </main>
        </div>
    }
}

/// 列表上方的内联错误
#[component]
pub fn InlineError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div role="alert" class="alert alert-error text-sm py-2">
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// 加载占位
#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex justify-center py-8">
            <span class="loading loading-spinner loading-md text-primary"></span>
        </div>
    }
}

/// 时间戳只显示日期部分
pub fn date_part(timestamp: &Option<String>) -> String {
    timestamp
        .as_deref()
        .and_then(|t| t.get(..10))
        .unwrap_or("-")
        .to_string()
}
