//! Host page seam
//!
//! Navigation and location are external collaborators: the core only needs
//! to read the current URL, leave the page, rewrite the visible URL after a
//! callback, and reload. A full navigation supersedes any pending work by
//! construction.

use url::Url;

/// Abstraction over the hosting page's location and navigation.
pub trait PageContext: Send + Sync {
    /// Current location of the host page.
    fn current_url(&self) -> Url;

    /// Perform a full navigation away from the page.
    fn navigate(&self, url: &Url);

    /// Rewrite the visible URL in place, without creating a history entry,
    /// so back-navigation does not re-trigger callback processing.
    fn replace_url(&self, url: &Url);

    /// Reload the current page.
    fn reload(&self);
}
