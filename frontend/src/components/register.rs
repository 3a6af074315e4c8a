use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::AppRoute;

use crate::auth::{register, use_auth};
use crate::web::router::{Link, use_router};

const MIN_PASSWORD_LEN: usize = 6;

/// 校验注册表单，返回首个错误
fn validate(email: &str, username: &str, password: &str, confirm: &str) -> Option<&'static str> {
    if email.trim().is_empty() || username.trim().is_empty() {
        return Some("Preencha todos os campos");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some("A senha deve ter pelo menos 6 caracteres");
    }
    if password != confirm {
        return Some("As senhas não coincidem");
    }
    None
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let email = RwSignal::new(String::new());
    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if let Some(problem) = validate(&email.get(), &username.get(), &password.get(), &confirm.get()) {
            set_error_msg.set(Some(problem.to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            let result = register(
                &auth,
                email.get_untracked().trim().to_string(),
                username.get_untracked().trim().to_string(),
                password.get_untracked(),
            )
            .await;
            set_is_submitting.set(false);
            match result {
                Ok(()) => {
                    auth.prompter().alert("Cadastro realizado com sucesso! Faça login.");
                    router.navigate_to(AppRoute::Login);
                }
                Err(e) => set_error_msg.set(Some(e.message)),
            }
        });
    };

    let field = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    on:input=move |ev| value.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                    required
                />
            </div>
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold text-primary">"Criar conta"</h1>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        {field("email", "E-mail", "email", email)}
                        {field("username", "Usuário", "text", username)}
                        {field("password", "Senha", "password", password)}
                        {field("confirm", "Confirmar senha", "password", confirm)}

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() { "Cadastrando..." } else { "Cadastrar" }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "Já tem conta? "
                            <Link to=AppRoute::Login class="link link-primary">"Entrar"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
