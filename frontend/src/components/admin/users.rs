use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::models::{RecordId, User};
use propiscineiro_core::viewmodel::{CollectionState, Editor, UserDraft};

use crate::auth::use_auth;
use crate::components::crud::{crud_model, load_on_mount};
use crate::components::layout::{InlineError, Layout, Spinner};

#[component]
pub fn AdminUsersPage() -> impl IntoView {
    let auth = use_auth();
    let users = RwSignal::new(CollectionState::<User>::default());
    let editor = RwSignal::new(Editor::<RecordId, UserDraft>::default());

    load_on_mount(auth, users);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let current = editor.get_untracked();
        let Some(id) = current.target else {
            return;
        };
        let update = match current.draft.to_update() {
            Ok(update) => update,
            Err(e) => {
                auth.prompter().alert(&e.message);
                return;
            }
        };
        spawn_local(async move {
            if crud_model(auth, users).update(id, update).await.is_applied() {
                editor.update(|e| e.close());
            }
        });
    };

    let on_delete = move |user: User| {
        spawn_local(async move {
            crud_model(auth, users).delete(&user).await;
        });
    };

    let own_id = move || auth.state.with(|s| s.user().map(|u| u.id));

    view! {
        <Layout title="Usuários">
            <InlineError message=Signal::derive(move || users.with(|u| u.error.clone())) />

            <Show when=move || users.with(|u| u.loading && !u.loaded)>
                <Spinner />
            </Show>

            <Show when=move || editor.with(|e| e.open)>
                <form class="card bg-base-100 shadow-xl max-w-xl" on:submit=on_submit>
                    <div class="card-body space-y-2">
                        <h2 class="card-title">"Editar usuário"</h2>
                        <input class="input input-bordered w-full" placeholder="Usuário"
                            prop:value=move || editor.with(|e| e.draft.username.clone())
                            on:input=move |ev| editor.update(|e| e.draft.username = event_target_value(&ev))
                        />
                        <input type="email" class="input input-bordered w-full" placeholder="E-mail"
                            prop:value=move || editor.with(|e| e.draft.email.clone())
                            on:input=move |ev| editor.update(|e| e.draft.email = event_target_value(&ev))
                        />
                        <label class="label cursor-pointer justify-start gap-2">
                            <input type="checkbox" class="checkbox"
                                prop:checked=move || editor.with(|e| e.draft.is_superuser)
                                on:change=move |ev| editor.update(|e| e.draft.is_superuser = event_target_checked(&ev))
                            />
                            <span class="label-text">"Administrador"</span>
                        </label>
                        <div class="card-actions justify-end">
                            <button type="button" class="btn btn-ghost" on:click=move |_| editor.update(|e| e.close())>
                                "Cancelar"
                            </button>
                            <button type="submit" class="btn btn-primary">"Salvar"</button>
                        </div>
                    </div>
                </form>
            </Show>

            <div class="card bg-base-100 shadow-xl">
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr><th>"Usuário"</th><th>"E-mail"</th><th>"Perfil"</th><th></th></tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || users.with(|u| u.items.clone())
                                key=|u| (u.id, u.username.clone(), u.email.clone(), u.is_superuser)
                                children=move |user| {
                                    let edit_target = user.clone();
                                    let delete_target = user.clone();
                                    let user_id = user.id;
                                    let is_self = move || own_id() == Some(user_id);
                                    view! {
                                        <tr>
                                            <td class="font-medium">{user.username.clone()}</td>
                                            <td>{user.email.clone()}</td>
                                            <td>
                                                {if user.is_superuser {
                                                    view! { <span class="badge badge-primary">"admin"</span> }.into_any()
                                                } else {
                                                    view! { <span class="badge badge-ghost">"usuário"</span> }.into_any()
                                                }}
                                            </td>
                                            <td class="text-right space-x-1">
                                                <button class="btn btn-ghost btn-xs"
                                                    on:click=move |_| {
                                                        let draft = UserDraft::from(&edit_target);
                                                        editor.update(|e| e.open_edit(edit_target.id, draft));
                                                    }
                                                >"Editar"</button>
                                                <button class="btn btn-ghost btn-xs text-error"
                                                    disabled=is_self
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
