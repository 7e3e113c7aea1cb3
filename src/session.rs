//! Persisted session slot.
//!
//! The token is the only thing that survives a restart. Storage failures are
//! logged and swallowed so that committing `SetToken` stays infallible.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Single key-value slot holding the session token.
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

impl<T: TokenStore + ?Sized> TokenStore for Rc<T> {
    fn load(&self) -> Option<String> {
        (**self).load()
    }

    fn save(&self, token: &str) {
        (**self).save(token)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

// =========================================================
// 内存实现
// =========================================================

/// In-process slot. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    fn save(&self, token: &str) {
        *self.slot.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }
}

// =========================================================
// 文件实现 (Native)
// =========================================================

/// Stores the token as the whole content of one file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn save(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("token store: cannot create {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = fs::write(&self.path, token) {
            log::warn!("token store: cannot write {}: {}", self.path.display(), e);
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("token store: cannot remove {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_slot() {
        let a = MemoryTokenStore::new();
        let b = a.clone();
        a.save("t1");
        assert_eq!(b.load().as_deref(), Some("t1"));
        b.clear();
        assert_eq!(a.load(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token");

        let store = FileTokenStore::new(&path);
        assert_eq!(store.load(), None);
        store.save("persisted-token");

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load().as_deref(), Some("persisted-token"));

        reopened.clear();
        assert_eq!(store.load(), None);
        // Clearing twice is fine.
        reopened.clear();
    }

    #[test]
    fn blank_file_reads_as_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(FileTokenStore::new(path).load(), None);
    }
}
