//! Authentication session orchestrator
//!
//! Owns the in-memory session state, drives the callback state machine, and
//! coordinates the proof store, URL builder, token exchanger, and session
//! store. The machine runs once per page load: `Idle` until a sign-in
//! navigates away, `AwaitingCallback` while the provider holds the browser,
//! `ExchangingCode` while the returned code is being exchanged, and
//! `Settled` once the outcome is final and the ready signal has fired.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::events::{AuthEvent, EventBus};
use crate::exchange::{self, TokenExchanger};
use crate::page::PageContext;
use crate::pkce::{self, ProofBundle};
use crate::proof_store::ProofStore;
use crate::session_store::SessionStore;
use crate::storage::KeyValueStorage;
use crate::types::{AuthenticatedUser, ScreenHint, SignInOptions, SignOutOptions};
use crate::urls::{build_authorize_url, build_logout_url, AuthorizeParams};

/// Fixed key for the opaque caller-state slot, written only when sign-in
/// receives a `state` option.
pub const RETURN_STATE_KEY: &str = "portico.auth.return-state";

/// Phase of the callback state machine. `Settled` is terminal for a page
/// load; the next sign-in begins a fresh cycle via full navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No pending operation.
    Idle,
    /// A sign-in navigated away with its proof persisted.
    AwaitingCallback,
    /// A callback was observed and the exchange is in flight.
    ExchangingCode,
    /// The outcome is final and the ready signal has fired.
    Settled,
}

#[derive(Debug, Default)]
struct MemorySession {
    user: Option<AuthenticatedUser>,
    access_token: Option<String>,
}

/// The authentication session for one page load.
///
/// Constructed with [`AuthSession::new`], which hydrates synchronously from
/// durable storage so the read accessors work immediately, then driven to
/// its settled state by [`AuthSession::start`].
pub struct AuthSession {
    config: ClientConfig,
    page: Arc<dyn PageContext>,
    transient: Arc<dyn KeyValueStorage>,
    proofs: ProofStore,
    sessions: SessionStore,
    exchanger: TokenExchanger,
    current: RwLock<MemorySession>,
    phase: RwLock<Phase>,
    last_error: RwLock<Option<AuthError>>,
    events: EventBus,
    started: AtomicBool,
}

impl AuthSession {
    /// Create a session and hydrate it from the durable session slot.
    ///
    /// The public operation set is usable as soon as this returns;
    /// [`AuthSession::start`] must still be called once to run callback
    /// processing and fire the ready signal.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        page: Arc<dyn PageContext>,
        transient: Arc<dyn KeyValueStorage>,
        durable: Arc<dyn KeyValueStorage>,
    ) -> Arc<Self> {
        let proofs = ProofStore::new(transient.clone());
        let sessions = SessionStore::new(durable);

        let mut current = MemorySession::default();
        if let Some(stored) = sessions.load() {
            info!("hydrated session from durable storage");
            current.user = Some(stored.user);
            current.access_token = Some(stored.access_token);
        }

        Arc::new(Self {
            config,
            page,
            transient,
            proofs,
            sessions,
            exchanger: TokenExchanger::new(),
            current: RwLock::new(current),
            phase: RwLock::new(Phase::Idle),
            last_error: RwLock::new(None),
            events: EventBus::new(),
            started: AtomicBool::new(false),
        })
    }

    /// Run the startup sequence to its settled state.
    ///
    /// Processes the provider callback when the current URL is the
    /// configured redirect target carrying a `code` parameter and automatic
    /// handling is enabled; otherwise settles directly with whatever
    /// hydration produced. Safe to call again: subsequent calls just await
    /// the already-settled outcome.
    pub async fn start(&self) -> Option<AuthenticatedUser> {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.ready().await;
        }

        if self.config.auto_callback() && self.is_callback_url() {
            self.process_callback().await;
        }

        self.settle();
        self.ready().await
    }

    /// Await the settled outcome of the startup sequence.
    ///
    /// Resolves with the same value for every caller, no matter when they
    /// subscribe.
    pub async fn ready(&self) -> Option<AuthenticatedUser> {
        self.events.ready().await
    }

    /// Begin a sign-in: persist fresh proof material and navigate to the
    /// authorization endpoint.
    ///
    /// In a browser the navigation supersedes the running script, so there
    /// is nothing meaningful to return; control coming back at all means the
    /// host environment chose not to leave the page.
    pub fn sign_in(&self, options: SignInOptions) {
        let bundle = ProofBundle::generate();
        self.proofs.persist(&bundle);

        if let Some(state) = &options.state {
            self.transient.set(RETURN_STATE_KEY, state);
        }

        let params = AuthorizeParams {
            code_challenge: bundle.code_challenge.clone(),
            state: bundle.state.clone(),
            screen_hint: options.screen_hint,
            login_hint: options.login_hint,
            organization_id: options.organization_id,
            invitation_token: options.invitation_token,
        };
        let url = build_authorize_url(&self.config, &params);

        *self.phase.write() = Phase::AwaitingCallback;
        info!("redirecting to authorization endpoint");
        self.page.navigate(&url);
    }

    /// Sign-in with the screen hint forced to the registration variant,
    /// overriding any caller-supplied hint.
    pub fn sign_up(&self, mut options: SignInOptions) {
        options.screen_hint = Some(ScreenHint::SignUp);
        self.sign_in(options);
    }

    /// Sign out: notify listeners, clear durable and in-memory state, then
    /// leave the page.
    ///
    /// The signed-out event fires before anything is cleared so listeners
    /// inspecting state synchronously still see the outgoing identity. The
    /// exit route depends on what is available: the provider logout endpoint
    /// when the outgoing token carries a session identifier, else the
    /// caller's return target, else a reload.
    pub fn sign_out(&self, options: SignOutOptions) {
        self.events.emit(AuthEvent::SignedOut);

        let outgoing_token = {
            let mut current = self.current.write();
            current.user = None;
            current.access_token.take()
        };
        self.sessions.clear();
        info!("signed out; session cleared");

        let session_id = outgoing_token.as_deref().and_then(exchange::session_id_claim);
        if let Some(session_id) = session_id {
            let url = build_logout_url(&self.config, &session_id, options.return_to.as_deref());
            self.page.navigate(&url);
        } else if let Some(return_to) = options.return_to.as_deref() {
            match Url::parse(return_to) {
                Ok(url) => self.page.navigate(&url),
                Err(e) => {
                    warn!(error = %e, "invalid return target; reloading instead");
                    self.page.reload();
                }
            }
        } else {
            self.page.reload();
        }
    }

    /// Current user, if authenticated. Never triggers I/O.
    #[must_use]
    pub fn get_user(&self) -> Option<AuthenticatedUser> {
        self.current.read().user.clone()
    }

    /// Current access token, if authenticated. Never triggers I/O.
    #[must_use]
    pub fn get_access_token(&self) -> Option<String> {
        self.current.read().access_token.clone()
    }

    /// Current phase of the callback state machine.
    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    /// The most recent diagnostic recorded by callback processing, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<AuthError> {
        self.last_error.read().clone()
    }

    /// Subscribe to signed-in/signed-out notifications.
    #[must_use]
    pub fn subscribe(&self) -> UnboundedReceiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Whether the current URL is the configured redirect target (trailing
    /// slash tolerated) carrying a `code` query parameter.
    fn is_callback_url(&self) -> bool {
        let url = self.page.current_url();
        paths_match(url.path(), self.config.redirect_uri().path())
            && query_param(&url, "code").is_some()
    }

    /// The `ExchangingCode` leg of the state machine.
    ///
    /// Every exit path leaves the proof slot consumed except the no-op exit
    /// (no `code` despite the path match) and the missing-proof case, where
    /// there is nothing to consume. The durable session slot is only ever
    /// written on success.
    async fn process_callback(&self) {
        let url = self.page.current_url();
        let Some(code) = query_param(&url, "code") else {
            // Matching path without a code is not an error; the page simply
            // is not a callback.
            return;
        };

        *self.phase.write() = Phase::ExchangingCode;
        let callback_state = query_param(&url, "state").unwrap_or_default();

        let Some(proof) = self.proofs.retrieve() else {
            warn!("authorization callback arrived without persisted proof material");
            self.record_error(AuthError::MissingProof);
            return;
        };

        // CSRF binding check; must run before any network call.
        if !pkce::validate_state(&proof.state, &callback_state) {
            warn!("callback state does not match persisted proof");
            self.record_error(AuthError::StateMismatch {
                expected: proof.state,
                received: callback_state,
            });
            self.proofs.clear();
            return;
        }

        match self.exchanger.exchange(&self.config, &code, &proof.code_verifier).await {
            Ok(response) => {
                let user = response.to_user();
                {
                    let mut current = self.current.write();
                    current.user = Some(user.clone());
                    current.access_token = Some(response.access_token.clone());
                }
                self.sessions.save(&response.access_token, &user);
                self.proofs.clear();
                self.strip_callback_params(&url);
                self.events.emit(AuthEvent::SignedIn(user));
                info!("sign-in completed");
            }
            Err(err) => {
                error!(error = %err, "authorization code exchange failed");
                self.record_error(err);
                // A failed code is not retryable; consume the proof anyway.
                self.proofs.clear();
            }
        }
    }

    /// Rewrite the visible URL with `code` and `state` removed, preserving
    /// any other query parameters.
    fn strip_callback_params(&self, url: &Url) {
        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != "code" && key != "state")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut clean = url.clone();
        clean.set_query(None);
        if !retained.is_empty() {
            clean.query_pairs_mut().extend_pairs(retained);
        }
        self.page.replace_url(&clean);
    }

    fn record_error(&self, err: AuthError) {
        *self.last_error.write() = Some(err);
    }

    /// Finalize the state machine and fire the ready signal; idempotent.
    fn settle(&self) {
        *self.phase.write() = Phase::Settled;
        self.events.settle(self.get_user());
    }
}

fn paths_match(left: &str, right: &str) -> bool {
    left.trim_end_matches('/') == right.trim_end_matches('/')
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
}
