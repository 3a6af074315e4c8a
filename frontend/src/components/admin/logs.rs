use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::viewmodel::{LogState, LogViewer};

use crate::auth::{AuthContext, use_auth};
use crate::components::layout::{InlineError, Layout};
use crate::web::{BrowserStorage, GlooHttpClient, SignalCell};

type PageViewer = LogViewer<GlooHttpClient, BrowserStorage, SignalCell<LogState>>;

fn viewer(auth: AuthContext, state: RwSignal<LogState>) -> PageViewer {
    let lines = state.with_untracked(|s| s.lines);
    LogViewer::new(auth.store(), SignalCell(state), lines)
}

#[component]
pub fn SystemLogsPage() -> impl IntoView {
    let auth = use_auth();
    let state = RwSignal::new(LogState::new(auth.config().default_log_lines));
    let (lines_input, set_lines_input) = signal(state.with_untracked(|s| s.lines.to_string()));

    spawn_local(async move { viewer(auth, state).refresh().await });

    let refresh = move |_| {
        spawn_local(async move { viewer(auth, state).refresh().await });
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Ok(lines) = lines_input.get_untracked().trim().parse::<u32>() else {
            auth.prompter().alert("Informe um número de linhas válido");
            return;
        };
        spawn_local(async move {
            viewer(auth, state).show_lines(lines).await;
            set_lines_input.set(state.with_untracked(|s| s.lines.to_string()));
        });
    };

    view! {
        <Layout title="Logs do sistema">
            <form class="flex flex-wrap gap-2 items-end" on:submit=on_submit>
                <div class="form-control">
                    <label class="label"><span class="label-text">"Linhas"</span></label>
                    <input type="number" min="1" class="input input-bordered input-sm w-32"
                        prop:value=lines_input
                        on:input=move |ev| set_lines_input.set(event_target_value(&ev))
                    />
                </div>
                <button type="submit" class="btn btn-primary btn-sm">"Aplicar"</button>
                <button type="button" class="btn btn-ghost btn-sm" on:click=refresh
                    disabled=move || state.with(|s| s.loading)
                >
                    {move || if state.with(|s| s.loading) { "Carregando..." } else { "Atualizar" }}
                </button>
            </form>

            <InlineError message=Signal::derive(move || state.with(|s| s.error.clone())) />

            <pre class="mockup-code bg-neutral text-neutral-content text-xs p-4 overflow-auto max-h-[70vh] whitespace-pre-wrap">
                {move || state.with(|s| s.text.clone())}
            </pre>
        </Layout>
    }
}
