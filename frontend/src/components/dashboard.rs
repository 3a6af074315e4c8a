use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::guard::DashboardView;
use propiscineiro_core::models::{Project, RecordId};
use propiscineiro_core::viewmodel::{CollectionState, Editor, ProjectDraft};
use propiscineiro_core::AppRoute;

use crate::auth::use_auth;
use crate::components::crud::{crud_model, load_on_mount};
use crate::components::layout::{InlineError, Layout, Spinner, date_part};
use crate::web::router::Link;

/// 控制面板：按角色分派
#[component]
pub fn DashboardPage() -> impl IntoView {
    let state = use_auth().state;

    move || {
        let dashboard = state.with(|s| s.user().map(DashboardView::for_user));
        match dashboard {
            Some(DashboardView::Superuser) => view! { <SuperuserDashboard /> }.into_any(),
            Some(DashboardView::Standard) => view! { <StandardDashboard /> }.into_any(),
            None => view! { <Spinner /> }.into_any(),
        }
    }
}

#[component]
fn SuperuserDashboard() -> impl IntoView {
    let card = |to: AppRoute, title: &'static str, desc: &'static str| {
        view! {
            <Link to=to class="card bg-base-100 shadow-xl hover:shadow-2xl transition-shadow">
                <div class="card-body">
                    <h2 class="card-title">{title}</h2>
                    <p class="text-base-content/70">{desc}</p>
                </div>
            </Link>
        }
    };

    view! {
        <Layout title="Painel do administrador">
            <div class="grid gap-4 md:grid-cols-2 lg:grid-cols-4">
                {card(AppRoute::Clients, "Clientes", "Cadastro de clientes, piscinas, serviços e orçamentos.")}
                {card(AppRoute::AdminUsers, "Usuários", "Editar e remover contas.")}
                {card(AppRoute::AdminSettings, "Configurações", "Parâmetros globais do sistema.")}
                {card(AppRoute::SystemLogs, "Logs do sistema", "Últimas linhas do log do servidor.")}
            </div>
        </Layout>
    }
}

/// 普通用户面板：项目列表
#[component]
fn StandardDashboard() -> impl IntoView {
    let auth = use_auth();
    let projects = RwSignal::new(CollectionState::<Project>::default());
    let editor = RwSignal::new(Editor::<RecordId, ProjectDraft>::default());

    load_on_mount(auth, projects);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let current = editor.get_untracked();
        let payload = match current.draft.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                auth.prompter().alert(&e.message);
                return;
            }
        };
        spawn_local(async move {
            let model = crud_model(auth, projects);
            let outcome = match current.target {
                Some(id) => model.update(id, payload).await,
                None => model.create(payload).await,
            };
            if outcome.is_applied() {
                editor.update(|e| e.close());
            }
        });
    };

    let on_delete = move |project: Project| {
        spawn_local(async move {
            crud_model(auth, projects).delete(&project).await;
        });
    };

    let refresh = move |_| {
        spawn_local(async move { crud_model(auth, projects).refresh().await });
    };

    view! {
        <Layout title="Meus projetos">
            <div class="flex gap-2">
                <button class="btn btn-primary" on:click=move |_| editor.update(|e| e.open_create())>
                    "Novo projeto"
                </button>
                <button class="btn btn-ghost" on:click=refresh disabled=move || projects.with(|p| p.loading)>
                    "Atualizar"
                </button>
                <Link to=AppRoute::Clients class="btn btn-outline">"Clientes"</Link>
            </div>

            <Show when=move || editor.with(|e| e.open)>
                <form class="card bg-base-100 shadow-xl" on:submit=on_submit>
                    <div class="card-body space-y-2">
                        <h2 class="card-title">
                            {move || if editor.with(|e| e.is_editing()) { "Editar projeto" } else { "Novo projeto" }}
                        </h2>
                        <input
                            class="input input-bordered w-full"
                            placeholder="Nome"
                            prop:value=move || editor.with(|e| e.draft.name.clone())
                            on:input=move |ev| editor.update(|e| e.draft.name = event_target_value(&ev))
                            required
                        />
                        <textarea
                            class="textarea textarea-bordered w-full"
                            placeholder="Descrição"
                            prop:value=move || editor.with(|e| e.draft.description.clone())
                            on:input=move |ev| editor.update(|e| e.draft.description = event_target_value(&ev))
                        ></textarea>
                        <div class="card-actions justify-end">
                            <button type="button" class="btn btn-ghost" on:click=move |_| editor.update(|e| e.close())>
                                "Cancelar"
                            </button>
                            <button type="submit" class="btn btn-primary">"Salvar"</button>
                        </div>
                    </div>
                </form>
            </Show>

            <InlineError message=Signal::derive(move || projects.with(|p| p.error.clone())) />

            <div class="card bg-base-100 shadow-xl">
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Nome"</th>
                                <th>"Descrição"</th>
                                <th class="hidden md:table-cell">"Criado em"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || projects.with(|p| p.loaded && p.items.is_empty())>
                                <tr>
                                    <td colspan="4" class="text-center py-8 text-base-content/50">
                                        "Nenhum projeto cadastrado."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || projects.with(|p| p.items.clone())
                                key=|p| (p.id, p.updated_at.clone(), p.name.clone())
                                children=move |project| {
                                    let edit_target = project.clone();
                                    let delete_target = project.clone();
                                    view! {
                                        <tr>
                                            <td class="font-medium">{project.name.clone()}</td>
                                            <td>{project.description.clone().unwrap_or_default()}</td>
                                            <td class="hidden md:table-cell">{date_part(&project.created_at)}</td>
                                            <td class="text-right space-x-1">
                                                <button class="btn btn-ghost btn-xs"
                                                    on:click=move |_| {
                                                        let draft = ProjectDraft::from(&edit_target);
                                                        editor.update(|e| e.open_edit(edit_target.id, draft));
                                                    }
                                                >"Editar"</button>
                                                <button class="btn btn-ghost btn-xs text-error"
                                                    on:click=move |_| on_delete(delete_target.clone())
                                                >"Excluir"</button>
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </Layout>
    }
}
