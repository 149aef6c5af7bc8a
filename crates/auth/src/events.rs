//! Notification channel
//!
//! Replaces fire-and-forget DOM event dispatch with a subscribable channel
//! so the core is testable without a live notification sink. Signed-in and
//! signed-out are broadcast to whoever is subscribed at emission time; the
//! `ready` outcome is a one-shot multicast value that resolves identically
//! for every awaiter, however late they subscribe.

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::types::AuthenticatedUser;

/// Broadcast notifications from the authentication flow.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// A code exchange completed successfully.
    SignedIn(AuthenticatedUser),
    /// An explicit sign-out started; state is still intact at emission time.
    SignedOut,
}

/// Settled outcome of the startup sequence.
#[derive(Debug, Clone)]
struct Ready {
    user: Option<AuthenticatedUser>,
}

pub(crate) struct EventBus {
    listeners: Mutex<Vec<mpsc::UnboundedSender<AuthEvent>>>,
    ready: watch::Sender<Option<Ready>>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (ready, _) = watch::channel(None);
        Self { listeners: Mutex::new(Vec::new()), ready }
    }

    /// Register a listener for subsequent events.
    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.lock().push(tx);
        rx
    }

    /// Broadcast an event to all current listeners, pruning closed ones.
    pub(crate) fn emit(&self, event: AuthEvent) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Record the settled outcome. Only the first call has any effect.
    pub(crate) fn settle(&self, user: Option<AuthenticatedUser>) {
        self.ready.send_if_modified(|slot| {
            if slot.is_some() {
                debug!("ready outcome already settled; ignoring");
                return false;
            }
            *slot = Some(Ready { user });
            true
        });
    }

    /// Await the settled outcome. Resolves immediately once settled, with
    /// the same value for every caller.
    pub(crate) async fn ready(&self) -> Option<AuthenticatedUser> {
        let mut rx = self.ready.subscribe();
        let user = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.as_ref().and_then(|ready| ready.user.clone()),
            // The sender lives as long as the session; a closed channel can
            // only mean teardown, which reads as signed out.
            Err(_) => None,
        };
        user
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for events.
    use serde_json::Map;

    use super::*;

    fn sample_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user_01".to_string(),
            email: None,
            first_name: None,
            last_name: None,
            profile_picture_url: None,
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn ready_resolves_for_late_subscribers() {
        let bus = EventBus::new();
        bus.settle(Some(sample_user()));

        // Subscribed after the outcome settled.
        let outcome = bus.ready().await;
        assert_eq!(outcome.map(|u| u.sub), Some("user_01".to_string()));
    }

    #[tokio::test]
    async fn ready_resolves_with_the_same_value_every_time() {
        let bus = EventBus::new();
        bus.settle(None);

        assert!(bus.ready().await.is_none());
        assert!(bus.ready().await.is_none());
    }

    #[tokio::test]
    async fn settle_is_first_writer_wins() {
        let bus = EventBus::new();
        bus.settle(None);
        bus.settle(Some(sample_user()));

        assert!(bus.ready().await.is_none());
    }

    #[tokio::test]
    async fn events_reach_subscribers_registered_before_emission() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(AuthEvent::SignedOut);
        bus.emit(AuthEvent::SignedIn(sample_user()));

        assert_eq!(rx.try_recv().ok(), Some(AuthEvent::SignedOut));
        assert!(matches!(rx.try_recv().ok(), Some(AuthEvent::SignedIn(_))));
    }

    #[tokio::test]
    async fn closed_listeners_are_pruned() {
        let bus = EventBus::new();
        drop(bus.subscribe());

        // Must not fail or leak the closed sender.
        bus.emit(AuthEvent::SignedOut);
        assert!(bus.listeners.lock().is_empty());
    }
}
