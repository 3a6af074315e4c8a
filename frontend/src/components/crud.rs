//! 页面共用的视图模型构造

use leptos::prelude::*;
use leptos::task::spawn_local;
use propiscineiro_core::viewmodel::{CollectionState, CrudModel, Managed};

use crate::auth::AuthContext;
use crate::web::{BrowserStorage, GlooHttpClient, SignalCell};

pub type PageModel<R> = CrudModel<R, GlooHttpClient, BrowserStorage, SignalCell<CollectionState<R>>>;

/// 视图模型只持有 `Rc` 和信号句柄，每次事件处理时现建即可
pub fn crud_model<R>(auth: AuthContext, state: RwSignal<CollectionState<R>>) -> PageModel<R>
where
    R: Managed + Send + Sync,
{
    CrudModel::new(auth.store(), SignalCell(state), auth.prompter())
}

/// 挂载时拉取一次
pub fn load_on_mount<R>(auth: AuthContext, state: RwSignal<CollectionState<R>>)
where
    R: Managed + Send + Sync,
{
    spawn_local(async move {
        crud_model(auth, state).refresh().await;
    });
}
