use leptos::prelude::*;
use propiscineiro_core::viewmodel::StateCell;

/// 让视图模型直接写入 Leptos 信号
///
/// 页面卸载后信号已被释放，此时的提交会被忽略。
pub struct SignalCell<S: Send + Sync + 'static>(pub RwSignal<S>);

impl<S: Send + Sync + 'static> Clone for SignalCell<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Send + Sync + 'static> Copy for SignalCell<S> {}

impl<S: Send + Sync + 'static> StateCell<S> for SignalCell<S> {
    fn update(&self, f: impl FnOnce(&mut S)) {
        if self.0.try_update(f).is_none() {
            tracing::debug!("state committed after its page was unmounted");
        }
    }
}
