use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::models::Client;
use propiscineiro_core::viewmodel::{ClientDraft, CollectionState};
use propiscineiro_core::AppRoute;

use crate::auth::use_auth;
use crate::components::crud::crud_model;
use crate::components::layout::Layout;
use crate::web::router::{Link, use_router};

#[component]
pub fn NewClientPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let draft = RwSignal::new(ClientDraft::default());
    let clients = RwSignal::new(CollectionState::<Client>::default());
    let (is_submitting, set_is_submitting) = signal(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let payload = match draft.get_untracked().to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                auth.prompter().alert(&e.message);
                return;
            }
        };
        set_is_submitting.set(true);
        spawn_local(async move {
            let outcome = crud_model(auth, clients).create(payload).await;
            set_is_submitting.set(false);
            if outcome.is_applied() {
                draft.set(ClientDraft::default());
                router.navigate_to(AppRoute::Clients);
            }
        });
    };

    let field = move |label: &'static str, kind: &'static str, get: fn(&ClientDraft) -> String, set: fn(&mut ClientDraft, String)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    type=kind
                    class="input input-bordered w-full"
                    prop:value=move || draft.with(get)
                    on:input=move |ev| draft.update(|d| set(d, event_target_value(&ev)))
                />
            </div>
        }
    };

    view! {
        <Layout title="Novo cliente">
            <form class="card bg-base-100 shadow-xl max-w-2xl" on:submit=on_submit>
                <div class="card-body grid gap-2 md:grid-cols-2">
                    {field("Nome *", "text", |d| d.name.clone(), |d, v| d.name = v)}
                    {field("E-mail", "email", |d| d.email.clone(), |d, v| d.email = v)}
                    {field("Telefone", "tel", |d| d.phone.clone(), |d, v| d.phone = v)}
                    {field("CPF/CNPJ", "text", |d| d.cpf_cnpj.clone(), |d, v| d.cpf_cnpj = v)}
                    <div class="md:col-span-2">
                        {field("Endereço", "text", |d| d.address.clone(), |d, v| d.address = v)}
                    </div>
                    <div class="card-actions justify-end md:col-span-2 mt-4">
                        <Link to=AppRoute::Clients class="btn btn-ghost">"Cancelar"</Link>
                        <button type="submit" class="btn btn-primary" disabled=move || is_submitting.get()>
                            {move || if is_submitting.get() { "Salvando..." } else { "Salvar cliente" }}
                        </button>
                    </div>
                </div>
            </form>
        </Layout>
    }
}
