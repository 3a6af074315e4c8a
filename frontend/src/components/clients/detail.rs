use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::models::{Budget, Client, Pool, RecordId, Service};
use propiscineiro_core::viewmodel::{
    BudgetDraft, ClientDetailModel, ClientDetailState, PoolDraft, ServiceDraft,
};
use propiscineiro_core::AppRoute;

use crate::auth::{AuthContext, use_auth};
use crate::components::layout::{Layout, Spinner, date_part};
use crate::web::router::Link;
use crate::web::{BrowserStorage, GlooHttpClient, SignalCell};

type DetailModel = ClientDetailModel<GlooHttpClient, BrowserStorage, SignalCell<ClientDetailState>>;

fn detail_model(auth: AuthContext, id: RecordId, state: RwSignal<ClientDetailState>) -> DetailModel {
    ClientDetailModel::new(auth.store(), id, SignalCell(state), auth.prompter())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[component]
pub fn ClientDetailPage(id: RecordId) -> impl IntoView {
    let auth = use_auth();
    let state = RwSignal::new(ClientDetailState::default());

    spawn_local(async move { detail_model(auth, id, state).refresh().await });

    let title = move || {
        state.with(|s| {
            s.client
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("Cliente #{}", id))
        })
    };

    view! {
        <Layout title="Detalhes do cliente">
            <div class="flex items-center justify-between">
                <h2 class="text-xl font-semibold">{title}</h2>
                <Link to=AppRoute::Clients class="btn btn-ghost btn-sm">"Voltar"</Link>
            </div>

            <For
                each=move || state.with(|s| s.errors.clone())
                key=|e| e.clone()
                children=|message| view! {
                    <div role="alert" class="alert alert-error text-sm py-2"><span>{message}</span></div>
                }
            />

            <Show when=move || state.with(|s| s.is_loading() && s.client.is_none())>
                <Spinner />
            </Show>

            <ClientInfo state=state />
            <PoolsSection auth=auth id=id state=state />
            <ServicesSection auth=auth id=id state=state />
            <BudgetsSection auth=auth id=id state=state />
        </Layout>
    }
}

#[component]
fn ClientInfo(state: RwSignal<ClientDetailState>) -> impl IntoView {
    let row = move |label: &'static str, get: fn(&Client) -> Option<String>| {
        view! {
            <div>
                <div class="text-xs text-base-content/60">{label}</div>
                <div>{move || state.with(|s| s.client.as_ref().and_then(get)).unwrap_or_else(|| "-".to_string())}</div>
            </div>
        }
    };

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body grid gap-3 md:grid-cols-4">
                {row("E-mail", |c| c.email.clone())}
                {row("Telefone", |c| c.phone.clone())}
                {row("CPF/CNPJ", |c| c.cpf_cnpj.clone())}
                {row("Endereço", |c| c.address.clone())}
            </div>
        </div>
    }
}

// --- 泳池 ---

#[component]
fn PoolsSection(auth: AuthContext, id: RecordId, state: RwSignal<ClientDetailState>) -> impl IntoView {
    let draft = RwSignal::new(PoolDraft::default());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let current = draft.get_untracked();
        spawn_local(async move {
            if detail_model(auth, id, state).create_pool(&current).await.is_applied() {
                draft.set(PoolDraft::default());
            }
        });
    };

    let on_delete = move |pool: Pool| {
        spawn_local(async move {
            detail_model(auth, id, state).delete_pool(&pool).await;
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">"Piscinas"</h3>
                <table class="table table-sm">
                    <thead>
                        <tr><th>"Tipo"</th><th>"Volume (L)"</th><th>"Revestimento"</th><th>"Profundidade"</th><th></th></tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || state.with(|s| s.pools.clone())
                            key=|p| (p.id, p.updated_at.clone())
                            children=move |pool| {
                                let target = pool.clone();
                                view! {
                                    <tr>
                                        <td>{pool.pool_type.clone()}</td>
                                        <td>{pool.volume}</td>
                                        <td>{pool.coating.clone().unwrap_or_default()}</td>
                                        <td>{pool.depth.clone().unwrap_or_default()}</td>
                                        <td class="text-right">
                                            <button class="btn btn-ghost btn-xs text-error"
                                                on:click=move |_| on_delete(target.clone())
                                            >"Excluir"</button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                <form class="grid gap-2 md:grid-cols-5 items-end" on:submit=on_submit>
                    <select
                        class="select select-bordered select-sm"
                        prop:value=move || draft.with(|d| d.pool_type.clone())
                        on:change=move |ev| draft.update(|d| d.pool_type = event_target_value(&ev))
                    >
                        <option value="alvenaria">"Alvenaria"</option>
                        <option value="fibra">"Fibra"</option>
                        <option value="vinil">"Vinil"</option>
                    </select>
                    <input class="input input-bordered input-sm" placeholder="Volume (L)" inputmode="numeric"
                        prop:value=move || draft.with(|d| d.volume.clone())
                        on:input=move |ev| draft.update(|d| d.volume = event_target_value(&ev))
                    />
                    <input class="input input-bordered input-sm" placeholder="Revestimento"
                        prop:value=move || draft.with(|d| d.coating.clone())
                        on:input=move |ev| draft.update(|d| d.coating = event_target_value(&ev))
                    />
                    <input class="input input-bordered input-sm" placeholder="Profundidade"
                        prop:value=move || draft.with(|d| d.depth.clone())
                        on:input=move |ev| draft.update(|d| d.depth = event_target_value(&ev))
                    />
                    <button type="submit" class="btn btn-primary btn-sm">"Adicionar piscina"</button>
                </form>
            </div>
        </div>
    }
}

// --- 服务 ---

#[component]
fn ServicesSection(auth: AuthContext, id: RecordId, state: RwSignal<ClientDetailState>) -> impl IntoView {
    let draft = RwSignal::new(ServiceDraft::dated(today()));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let current = draft.get_untracked();
        spawn_local(async move {
            if detail_model(auth, id, state).create_service(&current).await.is_applied() {
                draft.set(ServiceDraft::dated(today()));
            }
        });
    };

    let on_delete = move |service: Service| {
        spawn_local(async move {
            detail_model(auth, id, state).delete_service(&service).await;
        });
    };

    let services = move || {
        state.with(|s| s.client_services().into_iter().cloned().collect::<Vec<_>>())
    };
    let pool_label = move |pool_id: RecordId| {
        state.with(|s| {
            s.pool(pool_id)
                .map(|p| format!("{} ({} L)", p.pool_type, p.volume))
                .unwrap_or_else(|| format!("#{}", pool_id))
        })
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">"Serviços"</h3>
                <table class="table table-sm">
                    <thead>
                        <tr><th>"Data"</th><th>"Tipo"</th><th>"Piscina"</th><th>"Valor"</th><th>"Tempo"</th><th></th></tr>
                    </thead>
                    <tbody>
                        <For
                            each=services
                            key=|s| s.id
                            children=move |service| {
                                let target = service.clone();
                                let pool_id = service.pool_id;
                                view! {
                                    <tr>
                                        <td>{date_part(&service.date)}</td>
                                        <td title=service.description.clone().unwrap_or_default()>{service.service_type.clone()}</td>
                                        <td>{move || pool_label(pool_id)}</td>
                                        <td>{service.value.clone().unwrap_or_default()}</td>
                                        <td>{service.time_spent.clone().unwrap_or_default()}</td>
                                        <td class="text-right">
                                            <button class="btn btn-ghost btn-xs text-error"
                                                on:click=move |_| on_delete(target.clone())
                                            >"Excluir"</button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                <form class="grid gap-2 md:grid-cols-3 items-end" on:submit=on_submit>
                    <select
                        class="select select-bordered select-sm"
                        on:change=move |ev| draft.update(|d| d.pool_id = event_target_value(&ev).parse().ok())
                    >
                        <option value="" selected=move || draft.with(|d| d.pool_id.is_none())>"Selecione a piscina"</option>
                        <For
                            each=move || state.with(|s| s.pools.clone())
                            key=|p| p.id
                            children=move |pool| {
                                let pool_id = pool.id;
                                view! {
                                    <option
                                        value=pool_id.to_string()
                                        selected=move || draft.with(|d| d.pool_id == Some(pool_id))
                                    >
                                        {format!("{} ({} L)", pool.pool_type, pool.volume)}
                                    </option>
                                }
                            }
                        />
                    </select>
                    <select
                        class="select select-bordered select-sm"
                        prop:value=move || draft.with(|d| d.service_type.clone())
                        on:change=move |ev| draft.update(|d| d.service_type = event_target_value(&ev))
                    >
                        <option value="Manutenção">"Manutenção"</option>
                        <option value="Limpeza">"Limpeza"</option>
                        <option value="Reparo">"Reparo"</option>
                        <option value="Instalação">"Instalação"</option>
                    </select>
                    <input type="date" class="input input-bordered input-sm"
                        prop:value=move || draft.with(|d| d.date.clone())
                        on:input=move |ev| draft.update(|d| d.date = event_target_value(&ev))
                    />
                    <input class="input input-bordered input-sm" placeholder="Valor (R$)"
                        prop:value=move || draft.with(|d| d.value.clone())
                        on:input=move |ev| draft.update(|d| d.value = event_target_value(&ev))
                    />
                    <input class="input input-bordered input-sm" placeholder="Tempo gasto"
                        prop:value=move || draft.with(|d| d.time_spent.clone())
                        on:input=move |ev| draft.update(|d| d.time_spent = event_target_value(&ev))
                    />
                    <input class="input input-bordered input-sm" placeholder="Descrição"
                        prop:value=move || draft.with(|d| d.description.clone())
                        on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                    />
                    <button type="submit" class="btn btn-primary btn-sm md:col-span-3">"Registrar serviço"</button>
                </form>
            </div>
        </div>
    }
}

// --- 报价 ---

#[component]
fn BudgetsSection(auth: AuthContext, id: RecordId, state: RwSignal<ClientDetailState>) -> impl IntoView {
    let draft = RwSignal::new(BudgetDraft::default());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let current = draft.get_untracked();
        spawn_local(async move {
            if detail_model(auth, id, state).create_budget(&current).await.is_applied() {
                draft.set(BudgetDraft::default());
            }
        });
    };

    let on_delete = move |budget: Budget| {
        spawn_local(async move {
            detail_model(auth, id, state).delete_budget(&budget).await;
        });
    };

    let budgets = move || {
        state.with(|s| s.client_budgets().into_iter().cloned().collect::<Vec<_>>())
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h3 class="card-title">"Orçamentos"</h3>
                <table class="table table-sm">
                    <thead>
                        <tr><th>"Itens"</th><th>"Total (R$)"</th><th>"Status"</th><th>"Validade"</th><th></th></tr>
                    </thead>
                    <tbody>
                        <For
                            each=budgets
                            key=|b| (b.id, b.status.clone())
                            children=move |budget| {
                                let target = budget.clone();
                                view! {
                                    <tr>
                                        <td>{budget.item_descriptions().join(", ")}</td>
                                        <td>{budget.total.clone()}</td>
                                        <td><span class="badge badge-outline">{budget.status.clone()}</span></td>
                                        <td>{date_part(&budget.validity)}</td>
                                        <td class="text-right">
                                            <button class="btn btn-ghost btn-xs text-error"
                                                on:click=move |_| on_delete(target.clone())
                                            >"Excluir"</button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>

                <form class="grid gap-2 md:grid-cols-4 items-end" on:submit=on_submit>
                    <input class="input input-bordered input-sm md:col-span-2" placeholder="Descrição do serviço"
                        prop:value=move || draft.with(|d| d.description.clone())
                        on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                    />
                    <input class="input input-bordered input-sm" placeholder="Total (R$)"
                        prop:value=move || draft.with(|d| d.total.clone())
                        on:input=move |ev| draft.update(|d| d.total = event_target_value(&ev))
                    />
                    <input type="date" class="input input-bordered input-sm"
                        prop:value=move || draft.with(|d| d.validity.clone())
                        on:input=move |ev| draft.update(|d| d.validity = event_target_value(&ev))
                    />
                    <button type="submit" class="btn btn-primary btn-sm md:col-span-4">"Criar orçamento"</button>
                </form>
            </div>
        </div>
    }
}
