//! Provider-facing URL construction
//!
//! Two pure functions with no hidden state, randomness, or I/O, which is
//! what makes them unit-testable without mocking network or storage.
//! Optional parameters are appended only when provided; callers may rely on
//! "absent" never degrading to "present with an empty value".

use url::Url;

use crate::config::ClientConfig;
use crate::types::ScreenHint;

/// Parameters for the authorization redirect.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeParams {
    /// S256 challenge derived from the persisted verifier.
    pub code_challenge: String,

    /// CSRF state bound to this sign-in attempt.
    pub state: String,

    /// Which provider screen to open first.
    pub screen_hint: Option<ScreenHint>,

    /// Pre-filled account hint.
    pub login_hint: Option<String>,

    /// Organization to authenticate against.
    pub organization_id: Option<String>,

    /// Invitation token for invited users.
    pub invitation_token: Option<String>,
}

/// Build the authorization redirect URL.
///
/// Always carries the client identifier, redirect target, code grant
/// response type, challenge, challenge method `S256`, and state. The four
/// optional parameters appear only when supplied.
#[must_use]
pub fn build_authorize_url(config: &ClientConfig, params: &AuthorizeParams) -> Url {
    let mut url = config.authorize_endpoint();

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", config.client_id())
            .append_pair("redirect_uri", config.redirect_uri().as_str())
            .append_pair("response_type", "code")
            .append_pair("code_challenge", &params.code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", &params.state);

        if let Some(hint) = params.screen_hint {
            query.append_pair("screen_hint", hint.as_str());
        }
        if let Some(login_hint) = &params.login_hint {
            query.append_pair("login_hint", login_hint);
        }
        if let Some(organization_id) = &params.organization_id {
            query.append_pair("organization_id", organization_id);
        }
        if let Some(invitation_token) = &params.invitation_token {
            query.append_pair("invitation_token", invitation_token);
        }
    }

    url
}

/// Build the provider logout URL.
///
/// Always carries the session identifier; `return_to` appears only when
/// provided.
#[must_use]
pub fn build_logout_url(config: &ClientConfig, session_id: &str, return_to: Option<&str>) -> Url {
    let mut url = config.logout_endpoint();

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("session_id", session_id);
        if let Some(return_to) = return_to {
            query.append_pair("return_to", return_to);
        }
    }

    url
}

#[cfg(test)]
mod tests {
    //! Unit tests for urls.
    use std::collections::HashMap;

    use super::*;
    use crate::config::ClientConfig;

    fn test_config() -> ClientConfig {
        ClientConfig::builder("client_123")
            .redirect_uri("https://app.example.com/callback")
            .api_base("https://api.example.com")
            .build()
            .unwrap()
    }

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    #[test]
    fn authorize_url_carries_the_required_parameters() {
        let config = test_config();
        let params = AuthorizeParams {
            code_challenge: "ch".to_string(),
            state: "st".to_string(),
            ..AuthorizeParams::default()
        };

        let url = build_authorize_url(&config, &params);
        let query = query_map(&url);

        assert_eq!(url.path(), "/user_management/authorize");
        assert_eq!(query.get("client_id").map(String::as_str), Some("client_123"));
        assert_eq!(
            query.get("redirect_uri").map(String::as_str),
            Some("https://app.example.com/callback")
        );
        assert_eq!(query.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(query.get("code_challenge").map(String::as_str), Some("ch"));
        assert_eq!(query.get("code_challenge_method").map(String::as_str), Some("S256"));
        assert_eq!(query.get("state").map(String::as_str), Some("st"));
    }

    #[test]
    fn optional_parameters_are_omitted_not_empty() {
        let config = test_config();
        let params = AuthorizeParams {
            code_challenge: "ch".to_string(),
            state: "st".to_string(),
            ..AuthorizeParams::default()
        };

        let query = query_map(&build_authorize_url(&config, &params));

        assert!(!query.contains_key("screen_hint"));
        assert!(!query.contains_key("login_hint"));
        assert!(!query.contains_key("organization_id"));
        assert!(!query.contains_key("invitation_token"));
    }

    #[test]
    fn supplied_optional_parameters_appear_with_their_values() {
        let config = test_config();
        let params = AuthorizeParams {
            code_challenge: "ch".to_string(),
            state: "st".to_string(),
            screen_hint: Some(ScreenHint::SignUp),
            login_hint: Some("pat@example.com".to_string()),
            organization_id: Some("org_42".to_string()),
            invitation_token: Some("invite_7".to_string()),
        };

        let query = query_map(&build_authorize_url(&config, &params));

        assert_eq!(query.get("screen_hint").map(String::as_str), Some("sign-up"));
        assert_eq!(query.get("login_hint").map(String::as_str), Some("pat@example.com"));
        assert_eq!(query.get("organization_id").map(String::as_str), Some("org_42"));
        assert_eq!(query.get("invitation_token").map(String::as_str), Some("invite_7"));
    }

    #[test]
    fn authorize_url_is_deterministic() {
        let config = test_config();
        let params = AuthorizeParams {
            code_challenge: "ch".to_string(),
            state: "st".to_string(),
            login_hint: Some("pat@example.com".to_string()),
            ..AuthorizeParams::default()
        };

        let first = build_authorize_url(&config, &params);
        let second = build_authorize_url(&config, &params);

        assert_eq!(first, second);
    }

    #[test]
    fn logout_url_with_and_without_return_target() {
        let config = test_config();

        let bare = build_logout_url(&config, "session_abc", None);
        assert_eq!(bare.path(), "/user_management/sessions/logout");
        let query = query_map(&bare);
        assert_eq!(query.get("session_id").map(String::as_str), Some("session_abc"));
        assert!(!query.contains_key("return_to"));

        let with_return =
            build_logout_url(&config, "session_abc", Some("https://app.example.com/bye"));
        let query = query_map(&with_return);
        assert_eq!(
            query.get("return_to").map(String::as_str),
            Some("https://app.example.com/bye")
        );
    }
}
