//! Test doubles for the storage and page seams
//!
//! Used by this crate's own tests and available to host applications that
//! want to exercise their integration without a browser environment.

// Allow missing error/panic docs for test doubles - errors are clearly
// indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::Mutex;

use url::Url;

use crate::page::PageContext;
use crate::storage::KeyValueStorage;

/// In-memory [`KeyValueStorage`] backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        // SAFETY: Mutex poisoning is acceptable in test doubles - if a test
        // panics, the entire test fails anyway
        self.data.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.data.lock().unwrap().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.data.lock().unwrap().remove(key);
    }
}

/// A navigation observed by a [`StaticPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Full navigation away from the page.
    Navigate(Url),
    /// In-place URL rewrite without a history entry.
    Replace(Url),
    /// Page reload.
    Reload,
}

/// [`PageContext`] double that records navigations instead of performing
/// them. `navigate` and `replace_url` also update the current URL so tests
/// can assert on the visible location afterward.
#[derive(Debug)]
pub struct StaticPage {
    current: Mutex<Url>,
    log: Mutex<Vec<Navigation>>,
}

impl StaticPage {
    /// Create a page parked at `url`.
    ///
    /// # Panics
    /// Panics when `url` is not an absolute URL; acceptable in test setup.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn new(url: &str) -> Self {
        Self { current: Mutex::new(Url::parse(url).unwrap()), log: Mutex::new(Vec::new()) }
    }

    /// Every navigation observed so far, in order.
    #[must_use]
    pub fn navigations(&self) -> Vec<Navigation> {
        self.log.lock().unwrap().clone()
    }

    /// The most recent navigation, if any.
    #[must_use]
    pub fn last_navigation(&self) -> Option<Navigation> {
        self.log.lock().unwrap().last().cloned()
    }
}

impl PageContext for StaticPage {
    fn current_url(&self) -> Url {
        self.current.lock().unwrap().clone()
    }

    fn navigate(&self, url: &Url) {
        *self.current.lock().unwrap() = url.clone();
        self.log.lock().unwrap().push(Navigation::Navigate(url.clone()));
    }

    fn replace_url(&self, url: &Url) {
        *self.current.lock().unwrap() = url.clone();
        self.log.lock().unwrap().push(Navigation::Replace(url.clone()));
    }

    fn reload(&self) {
        self.log.lock().unwrap().push(Navigation::Reload);
    }
}
