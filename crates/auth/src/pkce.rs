//! PKCE (Proof Key for Code Exchange) proof material
//!
//! Implements RFC 7636 for OAuth authorization without client secrets.
//! Used by public browser clients that cannot hold confidential credentials.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// The unreserved URI character set permitted in verifiers and states
/// (RFC 7636 section 4.1).
const UNRESERVED: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Length of a generated code verifier, in characters.
pub const VERIFIER_LEN: usize = 64;

/// Length of a generated state parameter, in characters.
pub const STATE_LEN: usize = 32;

/// Draw `len` characters from the unreserved set using the thread CSPRNG.
///
/// Each random byte is mapped modulo the table length. The table has 66
/// entries, so the mapping carries a slight bias toward the first 58
/// characters; at 64 characters of output the remaining entropy is far
/// beyond what this threat model requires.
fn random_unreserved(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let byte: u8 = rng.gen();
            UNRESERVED[usize::from(byte) % UNRESERVED.len()] as char
        })
        .collect()
}

/// Generate a cryptographically secure code verifier.
///
/// Returns a 64-character string drawn from the unreserved set, within the
/// 43-128 character window RFC 7636 allows.
#[must_use]
pub fn generate_code_verifier() -> String {
    random_unreserved(VERIFIER_LEN)
}

/// Generate a random state token for CSRF protection.
///
/// Returns a 32-character string drawn from the unreserved set.
#[must_use]
pub fn generate_state() -> String {
    random_unreserved(STATE_LEN)
}

/// Compute the code challenge for a verifier.
///
/// Per RFC 7636, the challenge is `BASE64URL(SHA256(ASCII(code_verifier)))`
/// without padding.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Validate that the callback state matches the persisted state.
///
/// Exact string equality; this is the CSRF/cross-session binding check and
/// must run before any network call.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    expected == actual
}

/// PKCE proof material for one sign-in attempt.
///
/// Contains the code verifier (sent only at token exchange), the code
/// challenge (sent at authorization time), and the CSRF state parameter.
/// A bundle is never reused across sign-in attempts.
#[derive(Debug, Clone)]
pub struct ProofBundle {
    /// Random 64-character secret, kept until token exchange.
    pub code_verifier: String,

    /// SHA-256 hash of `code_verifier`, base64url encoded without padding.
    pub code_challenge: String,

    /// Random CSRF protection token round-tripped through the provider.
    pub state: String,
}

impl ProofBundle {
    /// Generate a fresh proof bundle.
    ///
    /// The thread RNG and the SHA-256 implementation are infallible at
    /// runtime in this build; availability of both is a link-time property.
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        let state = generate_state();

        Self { code_verifier, code_challenge, state }
    }

    /// Get the challenge method (always "S256").
    #[must_use]
    pub fn challenge_method(&self) -> &str {
        "S256"
    }
}
