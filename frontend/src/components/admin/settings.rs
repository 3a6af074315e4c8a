use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::models::AppSetting;
use propiscineiro_core::viewmodel::{CollectionState, Editor, SettingDraft};

use crate::auth::use_auth;
use crate::components::crud::{crud_model, load_on_mount};
use crate::components::layout::{InlineError, Layout, Spinner};

#[component]
pub fn AdminSettingsPage() -> impl IntoView {
    let auth = use_auth();
    let settings = RwSignal::new(CollectionState::<AppSetting>::default());
    // 配置以 key 寻址
    let editor = RwSignal::new(Editor::<String, SettingDraft>::default());

    load_on_mount(auth, settings);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let current = editor.get_untracked();
        spawn_local(async move {
            let model = crud_model(auth, settings);
            let outcome = match current.target {
                Some(key) => match current.draft.to_update() {
                    Ok(update) => model.update(key, update).await,
                    Err(e) => return auth.prompter().alert(&e.message),
                },
                None => match current.draft.to_payload() {
                    Ok(payload) => model.create(payload).await,
                    Err(e) => return auth.prompter().alert(&e.message),
                },
            };
            if outcome.is_applied() {
                editor.update(|e| e.close());
            }
        });
    };

    let on_delete = move |setting: AppSetting| {
        spawn_local(async move {
            crud_model(auth, settings).delete(&setting).await;
        });
    };

    view! {
        <Layout title="Configurações">
            <div class="flex gap-2">
                <button class="btn btn-primary" on:click=move |_| editor.update(|e| e.open_create())>
                    "Nova configuração"
                </button>
            </div>

            <Show when=move || editor.with(|e| e.open)>
                <form class="card bg-base-100 shadow-xl max-w-xl" on:submit=on_submit>
                    <div class="card-body space-y-2">
                        <h2 class="card-title">
                            {move || if editor.with(|e| e.is_editing()) { "Editar configuração" } else { "Nova configuração" }}
                        </h2>
                        <input class="input input-bordered w-full font-mono" placeholder="Chave"
                            prop:value=move || editor.with(|e| e.draft.key.clone())
                            on:input=move |ev| editor.update(|e| e.draft.key = event_target_value(&ev))
                        />
                        <textarea class="textarea textarea-bordered w-full font-mono" placeholder="Valor"
                            prop:value=move || editor.with(|e| e.draft.value.clone())
                            on:input=move |ev| editor.update(|e| e.draft.value = event_target_value(&ev))
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

            <InlineError message=Signal::derive(move || settings.with(|s| s.error.clone())) />

            <Show when=move || settings.with(|s| s.loading && !s.loaded)>
                <Spinner />
            </Show>

            <div class="card bg-base-100 shadow-xl">
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr><th>"Chave"</th><th>"Valor"</th><th></th></tr>
                        </thead>
                        <tbody>
                            <Show when=move || settings.with(|s| s.loaded && s.items.is_empty())>
                                <tr>
                                    <td colspan="3" class="text-center py-8 text-base-content/50">
                                        "Nenhuma configuração cadastrada."
                                    </td>
                                </tr>
                            </Show>
                            <For
                                each=move || settings.with(|s| s.items.clone())
                                key=|s| (s.id, s.key.clone(), s.value.clone())
                                children=move |setting| {
                                    let edit_target = setting.clone();
                                    let delete_target = setting.clone();
                                    view! {
                                        <tr>
                                            <td class="font-mono">{setting.key.clone()}</td>
                                            <td class="font-mono break-all">{setting.value.clone()}</td>
                                            <td class="text-right space-x-1">
                                                <button class="btn btn-ghost btn-xs"
                                                    on:click=move |_| {
                                                        let draft = SettingDraft::from(&edit_target);
                                                        editor.update(|e| e.open_edit(edit_target.key.clone(), draft));
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
