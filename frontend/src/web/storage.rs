//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 替代 `gloo-storage`，并提供会话令牌的持久化槽位。

use devboard::TokenStore;

/// 本地存储操作封装
///
/// 提供静态方法访问浏览器 LocalStorage API。
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 获取存储的字符串值，键不存在或发生错误时返回 `None`
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 设置存储值，返回操作是否成功
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除存储的键值对，返回操作是否成功
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 以 LocalStorage 中单个键保存会话令牌
#[derive(Debug, Clone)]
pub struct BrowserTokenStore {
    key: String,
}

impl BrowserTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl TokenStore for BrowserTokenStore {
    fn load(&self) -> Option<String> {
        BrowserStorage::get(&self.key).filter(|token| !token.trim().is_empty())
    }

    fn save(&self, token: &str) {
        if !BrowserStorage::set(&self.key, token) {
            log::warn!("[session] failed to persist token under '{}'", self.key);
        }
    }

    fn clear(&self) {
        if !BrowserStorage::delete(&self.key) {
            log::warn!("[session] failed to clear token under '{}'", self.key);
        }
    }
}
