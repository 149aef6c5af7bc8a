//! Identity and wire types
//!
//! Defines the token-endpoint response shapes, the normalized user identity
//! projected from them, and the option structs accepted by the public
//! sign-in/sign-out operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized identity projected from the provider's token response.
///
/// `sub` is always present when a user object exists. Every other field is
/// optional; explicit `null` values from the provider are normalized to
/// absent. Provider-specific extras (verification flags, timestamps) pass
/// through opaquely in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Stable subject identifier.
    pub sub: String,

    /// Primary email address, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Profile picture URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,

    /// Provider-specific fields carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Successful token-endpoint response (2xx JSON body).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent API calls.
    pub access_token: String,

    /// Refresh token, when the provider issues one. Unused by this client
    /// (rotation is out of scope) but preserved for hosts that want it.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// The provider's user record.
    pub user: ProviderUser,

    /// How the user authenticated, when reported.
    #[serde(default)]
    pub authentication_method: Option<String>,
}

impl TokenResponse {
    /// Project the provider user into the normalized identity shape.
    #[must_use]
    pub fn to_user(&self) -> AuthenticatedUser {
        let user = &self.user;
        AuthenticatedUser {
            sub: user.id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_picture_url: user.profile_picture_url.clone(),
            extra: user.extra.clone(),
        }
    }
}

/// Raw user sub-object as the provider sends it.
///
/// `Option` fields absorb both missing keys and explicit `null`s, which is
/// what gives [`TokenResponse::to_user`] its null-to-absent normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    /// Provider-assigned identifier; becomes `sub`.
    pub id: String,

    /// Email address, possibly `null`.
    #[serde(default)]
    pub email: Option<String>,

    /// Given name, possibly `null`.
    #[serde(default)]
    pub first_name: Option<String>,

    /// Family name, possibly `null`.
    #[serde(default)]
    pub last_name: Option<String>,

    /// Profile picture URL, possibly `null`.
    #[serde(default)]
    pub profile_picture_url: Option<String>,

    /// Everything else the provider included.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Screen the provider should open first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenHint {
    /// The sign-in screen.
    SignIn,
    /// The registration screen.
    SignUp,
}

impl ScreenHint {
    /// Wire value for the `screen_hint` query parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign-in",
            Self::SignUp => "sign-up",
        }
    }
}

/// Options accepted by sign-in and sign-up.
#[derive(Debug, Clone, Default)]
pub struct SignInOptions {
    /// Which provider screen to open first. `sign_up` overrides this.
    pub screen_hint: Option<ScreenHint>,

    /// Pre-filled account hint forwarded to the provider.
    pub login_hint: Option<String>,

    /// Organization to authenticate against.
    pub organization_id: Option<String>,

    /// Invitation token for invited users.
    pub invitation_token: Option<String>,

    /// Opaque caller state persisted locally for post-login routing. Never
    /// sent to the provider.
    pub state: Option<String>,
}

/// Options accepted by sign-out.
#[derive(Debug, Clone, Default)]
pub struct SignOutOptions {
    /// Where to send the browser after the provider ends the session.
    pub return_to: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Unit tests for types.
    use super::*;

    #[test]
    fn null_optional_fields_normalize_to_absent() {
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "at_123",
            "user": {
                "id": "user_01",
                "email": "pat@example.com",
                "first_name": null,
                "last_name": null,
                "profile_picture_url": null,
                "email_verified": true
            }
        }))
        .unwrap();

        let user = response.to_user();
        assert_eq!(user.sub, "user_01");
        assert_eq!(user.email.as_deref(), Some("pat@example.com"));
        assert!(user.first_name.is_none());
        assert!(user.last_name.is_none());
        assert!(user.profile_picture_url.is_none());
    }

    #[test]
    fn provider_extras_pass_through_opaquely() {
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "at_123",
            "user": {
                "id": "user_01",
                "email_verified": true,
                "created_at": "2026-01-05T09:00:00Z"
            }
        }))
        .unwrap();

        let user = response.to_user();
        assert_eq!(user.extra.get("email_verified"), Some(&Value::Bool(true)));
        assert!(user.extra.contains_key("created_at"));
    }

    #[test]
    fn user_round_trips_through_json() {
        let user = AuthenticatedUser {
            sub: "user_01".to_string(),
            email: Some("pat@example.com".to_string()),
            first_name: None,
            last_name: Some("Doe".to_string()),
            profile_picture_url: None,
            extra: Map::new(),
        };

        let encoded = serde_json::to_string(&user).unwrap();
        let decoded: AuthenticatedUser = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, user);
        // Absent fields are omitted from the serialized form, not null.
        assert!(!encoded.contains("first_name"));
    }

    #[test]
    fn screen_hint_wire_values() {
        assert_eq!(ScreenHint::SignIn.as_str(), "sign-in");
        assert_eq!(ScreenHint::SignUp.as_str(), "sign-up");
    }
}
