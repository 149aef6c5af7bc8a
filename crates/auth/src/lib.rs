//! Browser-resident OAuth 2.0 Authorization Code flow with PKCE
//!
//! A public client for static pages: no build step, no server-side
//! component beyond the remote authorization server, and no client secret
//! anywhere. The crate owns the PKCE authentication state machine —
//! generation and time-boxed storage of proof material, construction of the
//! provider redirect, callback detection and processing, the code-for-token
//! exchange, and the resulting session lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   AuthSession   │  Orchestrator + callback state machine
//! └────────┬────────┘
//!          │
//!          ├──► ProofStore       (transient PKCE proof slot, 10-min window)
//!          ├──► urls             (pure authorize/logout URL builders)
//!          ├──► TokenExchanger   (one-shot code-for-token POST)
//!          ├──► SessionStore     (durable session slot)
//!          └──► EventBus         (ready / signed-in / signed-out signals)
//! ```
//!
//! The host environment appears only through two seams: [`KeyValueStorage`]
//! (origin-scoped string slots) and [`PageContext`] (location and
//! navigation). [`testing`] provides in-memory doubles for both.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use portico_auth::testing::{MemoryStorage, StaticPage};
//! use portico_auth::{AuthSession, ClientConfig, SignInOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), portico_auth::AuthError> {
//! let config = ClientConfig::builder("client_123")
//!     .redirect_uri("https://app.example.com/callback")
//!     .build()?;
//!
//! let page = Arc::new(StaticPage::new("https://app.example.com/"));
//! let session = AuthSession::new(
//!     config,
//!     page,
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(MemoryStorage::new()),
//! );
//!
//! // Runs callback processing (if this page load is a callback) and fires
//! // the one-shot ready signal.
//! let user = session.start().await;
//! println!("signed in: {}", user.is_some());
//!
//! // Leaves the page via the authorization endpoint.
//! session.sign_in(SignInOptions::default());
//! # Ok(())
//! # }
//! ```
//!
//! # Security notes
//!
//! - **PKCE**: the verifier never leaves the transient slot until token
//!   exchange; the challenge method is always S256.
//! - **State binding**: the callback's `state` must equal the persisted
//!   proof's state before any network call is made.
//! - **Unverified claims**: [`exchange::decode_claims`] performs no
//!   signature verification. Trust derives from the direct exchange with
//!   the provider, never from decoded claims.

pub mod config;
pub mod error;
pub mod events;
pub mod exchange;
pub mod page;
pub mod pkce;
pub mod proof_store;
pub mod session;
pub mod session_store;
pub mod storage;
pub mod testing;
pub mod types;
pub mod urls;

pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_API_BASE};
pub use error::AuthError;
pub use events::AuthEvent;
pub use exchange::{decode_claims, session_id_claim, TokenExchanger};
pub use page::PageContext;
pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, validate_state, ProofBundle,
};
pub use proof_store::{PendingProof, ProofStore, PROOF_SLOT_KEY, PROOF_TTL_MS};
pub use session::{AuthSession, Phase, RETURN_STATE_KEY};
pub use session_store::{SessionStore, StoredSession, SESSION_SLOT_KEY};
pub use storage::KeyValueStorage;
pub use types::{
    AuthenticatedUser, ProviderUser, ScreenHint, SignInOptions, SignOutOptions, TokenResponse,
};
pub use urls::{build_authorize_url, build_logout_url, AuthorizeParams};
