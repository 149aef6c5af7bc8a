//! Authorization code exchange and claims extraction
//!
//! One POST, form-encoded, no client secret: the PKCE verifier is the only
//! proof a public client presents. Exactly one attempt is made; a stale
//! code/verifier pair cannot be usefully retried.
//!
//! Claims decoding here is an unverified convenience. Trust derives from
//! having just completed a direct exchange with the provider, never from the
//! decoded payload itself.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::AuthError;
use crate::types::TokenResponse;

/// Performs the code-for-token network exchange.
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    http: reqwest::Client,
}

impl TokenExchanger {
    /// Create an exchanger with a default HTTP client. No explicit timeout
    /// is applied; the proof's 10-minute freshness window bounds the overall
    /// flow.
    #[must_use]
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    /// Returns [`AuthError::ExchangeFailed`] with the HTTP status on a
    /// non-2xx response, [`AuthError::Transport`] on network failure, and
    /// [`AuthError::MalformedResponse`] when a 2xx body fails to parse.
    pub async fn exchange(
        &self,
        config: &ClientConfig,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id()),
            ("code", code),
            ("code_verifier", code_verifier),
        ];

        let response =
            self.http.post(config.authenticate_endpoint()).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ExchangeFailed { status: status.as_u16() });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))
    }
}

impl Default for TokenExchanger {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the claims segment of a JWT without verifying its signature.
///
/// Requires exactly three dot-separated segments; the middle segment must be
/// unpadded base64url wrapping a JSON object. Any malformation yields `None`
/// rather than an error.
#[must_use]
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let payload = URL_SAFE_NO_PAD.decode(segments[1]).ok()?;
    match serde_json::from_slice::<Value>(&payload) {
        Ok(Value::Object(claims)) => Some(claims),
        Ok(_) | Err(_) => {
            debug!("token payload was not a JSON object");
            None
        }
    }
}

/// Extract the provider session identifier (`sid`) from an access token,
/// when the token decodes and carries one.
#[must_use]
pub fn session_id_claim(token: &str) -> Option<String> {
    decode_claims(token)?.get("sid")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    //! Unit tests for exchange.
    use super::*;

    fn encode_segment(value: &Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn jwt_with_claims(claims: Value) -> String {
        let header = encode_segment(&serde_json::json!({"alg": "RS256", "typ": "JWT"}));
        format!("{header}.{}.signature", encode_segment(&claims))
    }

    #[test]
    fn decodes_a_well_formed_payload() {
        let token = jwt_with_claims(serde_json::json!({"sub": "user_01", "sid": "session_abc"}));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.get("sub").and_then(Value::as_str), Some("user_01"));
    }

    #[test]
    fn wrong_segment_count_yields_absent() {
        assert!(decode_claims("only.two").is_none());
        assert!(decode_claims("one.two.three.four").is_none());
        assert!(decode_claims("").is_none());
    }

    #[test]
    fn invalid_base64_yields_absent() {
        assert!(decode_claims("head.!!!not-base64!!!.sig").is_none());
    }

    #[test]
    fn non_json_payload_yields_absent() {
        let payload = URL_SAFE_NO_PAD.encode(b"plain text");
        assert!(decode_claims(&format!("head.{payload}.sig")).is_none());
    }

    #[test]
    fn non_object_json_payload_yields_absent() {
        let payload = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        assert!(decode_claims(&format!("head.{payload}.sig")).is_none());
    }

    #[test]
    fn session_id_claim_reads_sid() {
        let token = jwt_with_claims(serde_json::json!({"sid": "session_abc"}));
        assert_eq!(session_id_claim(&token).as_deref(), Some("session_abc"));

        let without = jwt_with_claims(serde_json::json!({"sub": "user_01"}));
        assert!(session_id_claim(&without).is_none());
    }
}
