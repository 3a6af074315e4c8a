//! LocalStorage 封装模块
//!
//! token 以原始字符串保存，不做 JSON 编码。

use gloo_storage::{LocalStorage, Storage};
use propiscineiro_core::storage::TokenStorage;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl TokenStorage for BrowserStorage {
    fn load(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) {
        if LocalStorage::raw().set_item(key, value).is_err() {
            tracing::warn!(key, "failed to persist value to localStorage");
        }
    }

    fn remove(&self, key: &str) {
        LocalStorage::delete(key);
    }
}
