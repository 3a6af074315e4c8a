use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::models::Client;
use propiscineiro_core::viewmodel::{CollectionState, filter_clients};
use propiscineiro_core::AppRoute;

use crate::auth::use_auth;
use crate::components::crud::{crud_model, load_on_mount};
use crate::components::layout::{InlineError, Layout, Spinner};
use crate::web::router::Link;

#[component]
pub fn ClientListPage() -> impl IntoView {
    let auth = use_auth();
    let clients = RwSignal::new(CollectionState::<Client>::default());
    let (query, set_query) = signal(String::new());

    load_on_mount(auth, clients);

    let visible = move || {
        let q = query.get();
        clients.with(|c| filter_clients(&c.items, &q).into_iter().cloned().collect::<Vec<_>>())
    };

    let on_delete = move |client: Client| {
        spawn_local(async move {
            crud_model(auth, clients).delete(&client).await;
        });
    };

    view! {
        <Layout title="Clientes">
            <div class="flex flex-col md:flex-row gap-2 md:items-center md:justify-between">
                <input
                    type="search"
                    class="input input-bordered w-full md:max-w-sm"
                    placeholder="Buscar por nome ou e-mail"
                    prop:value=query
                    on:input=move |ev| set_query.set(event_target_value(&ev))
                />
                <Link to=AppRoute::NewClient class="btn btn-primary">"Novo cliente"</Link>
            </div>

            <InlineError message=Signal::derive(move || clients.with(|c| c.error.clone())) />

            <Show when=move || clients.with(|c| c.loading && !c.loaded)>
                <Spinner />
            </Show>

            <div class="card bg-base-100 shadow-xl">
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Nome"</th>
                                <th>"E-mail"</th>
                                <th class="hidden md:table-cell">"Telefone"</th>
                                <th class="hidden lg:table-cell">"CPF/CNPJ"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || clients.with(|c| c.loaded) && visible().is_empty()>
                                <tr>
                                    <td colspan="5" class="text-center py-8 text-base-content/50">
                                        {move || if query.get().trim().is_empty() {
                                            "Nenhum cliente cadastrado."
                                        } else {
                                            "Nenhum cliente encontrado."
                                        }}
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=visible
                                key=|c| (c.id, c.updated_at.clone(), c.name.clone())
                                children=move |client| {
                                    let target = client.clone();
                                    view! {
                                        <tr>
                                            <td class="font-medium">
                                                <Link to=AppRoute::ClientDetail(client.id) class="link link-hover">
                                                    {client.name.clone()}
                                                </Link>
                                            </td>
                                            <td>{client.email.clone().unwrap_or_default()}</td>
                                            <td class="hidden md:table-cell">{client.phone.clone().unwrap_or_default()}</td>
                                            <td class="hidden lg:table-cell">{client.cpf_cnpj.clone().unwrap_or_default()}</td>
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
                </div>
            </div>
        </Layout>
    }
}
