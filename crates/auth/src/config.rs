//! Client configuration
//!
//! The host environment resolves its attribute soup into a validated
//! [`ClientConfig`] exactly once per page load and hands it to the core. The
//! core itself never parses host-page state.

use url::Url;

use crate::error::AuthError;

/// Default authorization-server base when none is configured.
pub const DEFAULT_API_BASE: &str = "https://api.portico.dev";

/// Immutable client configuration, constructed once per page load.
///
/// Invariants enforced at build time: the client identifier is non-empty and
/// the API base resolves over an encrypted transport (unless dev mode is
/// active for a local setup).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    client_id: String,
    redirect_uri: Url,
    api_base: Url,
    dev_mode: bool,
    auto_callback: bool,
}

impl ClientConfig {
    /// Start building a configuration for the given client identifier.
    #[must_use]
    pub fn builder(client_id: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            client_id: client_id.into(),
            redirect_uri: None,
            api_base: None,
            dev_mode: None,
            auto_callback: true,
        }
    }

    /// OAuth client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Absolute redirect target the provider sends the browser back to.
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// Authorization-server base URL.
    #[must_use]
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Whether local-development relaxations are active.
    #[must_use]
    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Whether callbacks are processed automatically at startup.
    #[must_use]
    pub fn auto_callback(&self) -> bool {
        self.auto_callback
    }

    /// The authorization endpoint (browser navigation target).
    #[must_use]
    pub fn authorize_endpoint(&self) -> Url {
        self.endpoint("user_management/authorize")
    }

    /// The token exchange endpoint (POSTed to directly).
    #[must_use]
    pub fn authenticate_endpoint(&self) -> Url {
        self.endpoint("user_management/authenticate")
    }

    /// The session logout endpoint (browser navigation target).
    #[must_use]
    pub fn logout_endpoint(&self) -> Url {
        self.endpoint("user_management/sessions/logout")
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.api_base.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url.set_query(None);
        url
    }
}

/// Builder for [`ClientConfig`]; validation happens in [`build`].
///
/// [`build`]: ClientConfigBuilder::build
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    client_id: String,
    redirect_uri: Option<String>,
    api_base: Option<String>,
    dev_mode: Option<bool>,
    auto_callback: bool,
}

impl ClientConfigBuilder {
    /// Set the redirect target. Hosts typically default this to the page
    /// origin before handing configuration to the core.
    #[must_use]
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Override the authorization-server base URL.
    #[must_use]
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Force dev mode on or off, overriding the hostname heuristic.
    #[must_use]
    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = Some(enabled);
        self
    }

    /// Disable or enable automatic callback processing (default: enabled).
    #[must_use]
    pub fn auto_callback(mut self, enabled: bool) -> Self {
        self.auto_callback = enabled;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the client identifier is
    /// empty, the redirect target is missing or not an absolute URL, the API
    /// base does not parse, or the API base is not `https` outside dev mode.
    pub fn build(self) -> Result<ClientConfig, AuthError> {
        let client_id = self.client_id.trim().to_string();
        if client_id.is_empty() {
            return Err(AuthError::Configuration("client identifier is required".to_string()));
        }

        let redirect_raw = self
            .redirect_uri
            .ok_or_else(|| AuthError::Configuration("redirect target is required".to_string()))?;
        let redirect_uri = Url::parse(&redirect_raw).map_err(|e| {
            AuthError::Configuration(format!("redirect target is not an absolute URL: {e}"))
        })?;

        let api_raw = self.api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = Url::parse(&api_raw)
            .map_err(|e| AuthError::Configuration(format!("invalid API base URL: {e}")))?;

        let dev_mode = self.dev_mode.unwrap_or_else(|| is_local_host(&redirect_uri));

        if api_base.scheme() != "https" && !dev_mode {
            return Err(AuthError::Configuration(
                "API base must use an encrypted transport".to_string(),
            ));
        }

        Ok(ClientConfig {
            client_id,
            redirect_uri,
            api_base,
            dev_mode,
            auto_callback: self.auto_callback,
        })
    }
}

/// Hostname heuristic for the dev-mode default.
fn is_local_host(url: &Url) -> bool {
    match url.host_str() {
        Some(host) => {
            host == "localhost"
                || host == "127.0.0.1"
                || host == "0.0.0.0"
                || host.ends_with(".localhost")
        }
        None => false,
    }
}
