//! Storage seam
//!
//! Models the browser's origin-scoped string storage as a synchronous
//! key/value trait. Two slots exist in practice: a transient one for PKCE
//! proof material and a durable one for the authenticated session. Reads and
//! writes are atomic from the caller's perspective; there is no cross-tab
//! coordination, and the last writer wins.

/// A synchronous, origin-scoped string store.
///
/// Implementations must not suspend: the storage contract mirrors browser
/// web storage, where every operation completes before control returns.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, overwriting any existing entry.
    fn set(&self, key: &str, value: &str);

    /// Remove the entry under `key`; a no-op when absent.
    fn remove(&self, key: &str);
}
