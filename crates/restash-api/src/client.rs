// Async HTTP client for a single REST-like collection endpoint.
//
// One client per collection URL (e.g. `https://example.com/wp/v2/posts`).
// Default query parameters — including the auth token — are merged into
// every request; call-specific parameters win on key conflicts.

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Request context ──────────────────────────────────────────────────

/// The `context` query parameter sent with item-level requests.
///
/// Reads use `view`; writes use `edit` (the server returns the editable
/// representation of the entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestContext {
    #[default]
    View,
    Edit,
}

impl RequestContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one collection resource.
///
/// Issues GET for collection queries and single-item fetches, POST for
/// create, PUT for update. Responses are always decoded as JSON; error
/// responses are decoded too, to extract a message and code.
pub struct CollectionClient {
    http: reqwest::Client,
    base_url: Url,
    defaults: IndexMap<String, String>,
}

impl CollectionClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` with the given default parameters.
    pub fn new(
        base_url: &str,
        query_defaults: IndexMap<String, String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            defaults: query_defaults,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages transport).
    pub fn from_reqwest(
        base_url: &str,
        query_defaults: IndexMap<String, String>,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            defaults: query_defaults,
        })
    }

    /// Add an auth token sent as a query parameter on every request.
    pub fn with_auth_param(mut self, param: &str, token: &SecretString) -> Self {
        self.defaults
            .insert(param.to_owned(), token.expose_secret().to_owned());
        self
    }

    /// Normalize the base URL to end with a trailing slash so item paths
    /// join cleanly.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        Ok(url)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// The collection endpoint itself (no trailing slash).
    fn collection_url(&self) -> Url {
        let mut url = self.base_url.clone();
        let path = self.base_url.path().trim_end_matches('/').to_owned();
        url.set_path(&path);
        url
    }

    /// `{base}/{id}` for single-item requests.
    fn item_url(&self, id: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(id)?)
    }

    /// Defaults merged with call-specific parameters (call params win).
    fn merged_params(&self, extra: &[(String, String)]) -> Vec<(String, String)> {
        let mut merged = self.defaults.clone();
        for (key, value) in extra {
            merged.insert(key.clone(), value.clone());
        }
        merged.into_iter().collect()
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// GET the collection with the given query parameters.
    ///
    /// The response body must decode to a JSON array.
    pub async fn query(&self, params: &[(String, String)]) -> Result<Vec<Value>, Error> {
        let url = self.collection_url();
        let params = self.merged_params(params);
        debug!("GET {url} params={:?}", param_keys(&params));

        let resp = self.http.get(url).query(&params).send().await?;
        self.handle_response(resp).await
    }

    /// GET a single item: `{base}/{id}?context=…`.
    pub async fn fetch(&self, id: &str, context: RequestContext) -> Result<Value, Error> {
        let url = self.item_url(id)?;
        let params = self.merged_params(&[("context".to_owned(), context.as_str().to_owned())]);
        debug!("GET {url}");

        let resp = self.http.get(url).query(&params).send().await?;
        self.handle_response(resp).await
    }

    /// POST a new item to the collection (JSON body).
    pub async fn create(&self, body: &Value, context: RequestContext) -> Result<Value, Error> {
        let url = self.collection_url();
        let params = self.merged_params(&[("context".to_owned(), context.as_str().to_owned())]);
        debug!("POST {url}");

        let resp = self.http.post(url).query(&params).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// PUT an updated item: `{base}/{id}` (JSON body).
    pub async fn update(
        &self,
        id: &str,
        body: &Value,
        context: RequestContext,
    ) -> Result<Value, Error> {
        let url = self.item_url(id)?;
        let params = self.merged_params(&[("context".to_owned(), context.as_str().to_owned())]);
        debug!("PUT {url}");

        let resp = self.http.put(url).query(&params).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(parse_error(status, resp).await)
        }
    }
}

/// Decode a non-success response into a structured API error.
///
/// The body is decoded even on failure statuses to extract a message and
/// code; both raw status and decoded body ride along on the error.
async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();
    let decoded: Option<Value> = serde_json::from_str(&raw).ok();

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
        Error::Api {
            status: status.as_u16(),
            message: err.message.unwrap_or_else(|| status.to_string()),
            code: err.code.unwrap_or_else(|| crate::UNKNOWN_CODE.to_owned()),
            body: decoded,
        }
    } else {
        Error::Api {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
            code: crate::UNKNOWN_CODE.to_owned(),
            body: decoded,
        }
    }
}

/// Parameter keys only, for request logging — values may carry the token.
fn param_keys(params: &[(String, String)]) -> Vec<&str> {
    params.iter().map(|(k, _)| k.as_str()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client_with_defaults(defaults: &[(&str, &str)]) -> CollectionClient {
        let defaults = defaults
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        CollectionClient::from_reqwest(
            "https://example.com/wp/v2/posts",
            defaults,
            reqwest::Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = client_with_defaults(&[]);
        assert_eq!(client.base_url.path(), "/wp/v2/posts/");
    }

    #[test]
    fn collection_url_has_no_trailing_slash() {
        let client = client_with_defaults(&[]);
        assert_eq!(client.collection_url().path(), "/wp/v2/posts");
    }

    #[test]
    fn item_url_appends_id() {
        let client = client_with_defaults(&[]);
        assert_eq!(client.item_url("17").unwrap().path(), "/wp/v2/posts/17");
    }

    #[test]
    fn call_params_win_over_defaults() {
        let client = client_with_defaults(&[("per_page", "10"), ("order", "asc")]);
        let merged = client.merged_params(&[("per_page".to_owned(), "50".to_owned())]);

        assert_eq!(
            merged,
            vec![
                ("per_page".to_owned(), "50".to_owned()),
                ("order".to_owned(), "asc".to_owned()),
            ]
        );
    }

    #[test]
    fn auth_param_joins_defaults() {
        let client = client_with_defaults(&[])
            .with_auth_param("_token", &SecretString::from("s3cret".to_owned()));
        let merged = client.merged_params(&[]);

        assert_eq!(merged, vec![("_token".to_owned(), "s3cret".to_owned())]);
    }

    #[test]
    fn request_context_strings() {
        assert_eq!(RequestContext::View.as_str(), "view");
        assert_eq!(RequestContext::Edit.as_str(), "edit");
    }
}
