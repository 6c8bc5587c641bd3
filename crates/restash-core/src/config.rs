// ── Resource handler configuration ──
//
// Built by the consumer and handed to `ResourceHandler::new` — the
// handler never reads config files or environment.

use std::collections::HashMap;

use indexmap::IndexMap;
use secrecy::SecretString;
use url::Url;

use crate::action::OperationKind;
use restash_api::TransportConfig;

/// Configuration for one resource handler.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// Collection endpoint (e.g. `https://example.com/wp/v2/posts`).
    pub base_url: Url,
    /// Resource type name the action-type tags are derived from
    /// (e.g. `posts`).
    pub resource_type: String,
    /// Query parameters merged into every request.
    pub query_defaults: IndexMap<String, String>,
    /// Name of the query parameter the auth token is sent under.
    pub auth_param: String,
    /// Auth token appended to every request, if set.
    pub auth_token: Option<SecretString>,
    /// Action-type tags overriding the derived defaults, for integrating
    /// with externally defined action types.
    pub overrides: HashMap<OperationKind, String>,
    /// Transport settings for the underlying HTTP client.
    pub transport: TransportConfig,
    /// Whether request failures are returned to the caller after the
    /// `*Error` action is dispatched. Defaults to `true`.
    pub rethrow_on_error: bool,
}

impl ResourceConfig {
    pub fn new(base_url: Url, resource_type: impl Into<String>) -> Self {
        Self {
            base_url,
            resource_type: resource_type.into(),
            query_defaults: IndexMap::new(),
            auth_param: "_token".to_owned(),
            auth_token: None,
            overrides: HashMap::new(),
            transport: TransportConfig::default(),
            rethrow_on_error: true,
        }
    }

    /// Send `token` under the query parameter `param` on every request.
    pub fn with_auth(mut self, param: impl Into<String>, token: SecretString) -> Self {
        self.auth_param = param.into();
        self.auth_token = Some(token);
        self
    }

    /// Add a query parameter merged into every request.
    pub fn with_default_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.query_defaults.insert(key.into(), value.into());
        self
    }

    /// Override the derived tag for one operation.
    pub fn with_override(mut self, kind: OperationKind, tag: impl Into<String>) -> Self {
        self.overrides.insert(kind, tag.into());
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Swallow request failures after dispatching the `*Error` action,
    /// instead of returning them to the caller.
    pub fn swallow_errors(mut self) -> Self {
        self.rethrow_on_error = false;
        self
    }
}
