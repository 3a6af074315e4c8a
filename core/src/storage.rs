//! Token 持久化抽象
//!
//! 只有 token 会跨页面刷新保存，用户资料每次启动都重新向后端解析。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// 键值持久化存储
pub trait TokenStorage {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// 内存存储
///
/// `clone` 共享同一份数据，可用来模拟“刷新页面后重新创建会话”。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}
