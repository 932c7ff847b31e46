//! REST client for one namespace of the upstream platform.
//!
//! Every method is a single upstream call. Request bodies and responses
//! stay as JSON values; reshaping into gateway DTOs happens in the
//! handlers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use serde_json::Value;

use super::{Upstream, UpstreamSubscription, event_stream};
use crate::domain::SubscriptionFilter;
use crate::error::GatewayError;

/// A file received from the browser, ready to be stored upstream.
#[derive(Debug, Clone)]
pub struct BlobUpload {
    /// Original file name, if the browser sent one.
    pub file_name: Option<String>,
    /// Raw file content.
    pub content: Vec<u8>,
}

/// Upstream client bound to one namespace.
#[derive(Debug, Clone)]
pub struct FireFlyClient {
    http: reqwest::Client,
    endpoint: Url,
    namespace: String,
    event_buffer_capacity: usize,
}

impl FireFlyClient {
    /// Creates a client for `namespace` sharing the given HTTP client.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        endpoint: Url,
        namespace: impl Into<String>,
        event_buffer_capacity: usize,
    ) -> Self {
        Self {
            http,
            endpoint,
            namespace: namespace.into(),
            event_buffer_capacity,
        }
    }

    /// Builds a shared HTTP client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the TLS backend cannot
    /// be initialised.
    pub fn http_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::InvalidConfig(format!("http client: {e}")))
    }

    /// Returns the namespace this client addresses.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // ── URL construction ────────────────────────────────────────────────

    /// Builds `<endpoint>/api/v1/namespaces/<ns>/<segments...>?<query>`.
    fn api_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = self.endpoint.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                GatewayError::Internal(format!("upstream endpoint cannot be a base: {}", self.endpoint))
            })?;
            path.pop_if_empty()
                .extend(["api", "v1", "namespaces"])
                .push(&self.namespace)
                .extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Returns the upstream event socket URL (`ws://<endpoint>/ws`), keeping
    /// any path prefix on the endpoint.
    fn ws_url(&self) -> Result<Url, GatewayError> {
        let mut url = self.endpoint.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|()| {
            GatewayError::Internal(format!("cannot derive websocket url from {}", self.endpoint))
        })?;
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::Internal(format!("upstream endpoint cannot be a base: {}", self.endpoint))
            })?
            .pop_if_empty()
            .push("ws");
        Ok(url)
    }

    // ── Transport helpers ───────────────────────────────────────────────

    async fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Value, GatewayError> {
        let url = self.api_url(segments, query)?;
        tracing::debug!(%url, "upstream GET");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    async fn post(&self, segments: &[&str], body: &Value) -> Result<Value, GatewayError> {
        let url = self.api_url(segments, &[])?;
        tracing::debug!(%url, "upstream POST");
        let response = self.http.post(url).json(body).send().await?;
        read_json(response).await
    }

    async fn get_list(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, GatewayError> {
        match self.get(segments, query).await? {
            Value::Array(items) => Ok(items),
            other => Err(GatewayError::Upstream(format!(
                "expected a list from {}, got {}",
                segments.join("/"),
                type_name(&other)
            ))),
        }
    }

    // ── Network & identity ──────────────────────────────────────────────

    /// `GET network/organizations`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn organizations(&self) -> Result<Vec<Value>, GatewayError> {
        self.get_list(&["network", "organizations"], &[]).await
    }

    /// `GET status` — node, organization, and plugin status.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn status(&self) -> Result<Value, GatewayError> {
        self.get(&["status"], &[]).await
    }

    /// `GET verifiers`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn verifiers(&self) -> Result<Vec<Value>, GatewayError> {
        self.get_list(&["verifiers"], &[]).await
    }

    // ── Messages & data ─────────────────────────────────────────────────

    /// `POST messages/broadcast`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn send_broadcast(&self, message: &Value) -> Result<Value, GatewayError> {
        self.post(&["messages", "broadcast"], message).await
    }

    /// `POST messages/private`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn send_private(&self, message: &Value) -> Result<Value, GatewayError> {
        self.post(&["messages", "private"], message).await
    }

    /// `POST data` (multipart) — stores a blob and returns the data record.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn upload_data(&self, blob: BlobUpload) -> Result<Value, GatewayError> {
        let url = self.api_url(&["data"], &[])?;
        let mut part = Part::bytes(blob.content);
        if let Some(name) = blob.file_name {
            part = part.file_name(name);
        }
        let form = Form::new().text("autometa", "true").part("file", part);
        tracing::debug!(%url, "upstream POST (multipart)");
        let response = self.http.post(url).multipart(form).send().await?;
        read_json(response).await
    }

    /// `GET batches?tx.id=<tx_id>`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn batches(&self, tx_id: &str) -> Result<Vec<Value>, GatewayError> {
        self.get_list(&["batches"], &[("tx.id", tx_id)]).await
    }

    // ── Tokens ──────────────────────────────────────────────────────────

    /// `GET tokens/pools`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn token_pools(&self) -> Result<Vec<Value>, GatewayError> {
        self.get_list(&["tokens", "pools"], &[]).await
    }

    /// `GET tokens/pools/<name_or_id>`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the pool does not exist.
    pub async fn token_pool(&self, name_or_id: &str) -> Result<Value, GatewayError> {
        self.get(&["tokens", "pools", name_or_id], &[]).await
    }

    /// `POST tokens/pools`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn create_token_pool(&self, pool: &Value) -> Result<Value, GatewayError> {
        self.post(&["tokens", "pools"], pool).await
    }

    /// `POST tokens/mint`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn mint_tokens(&self, transfer: &Value) -> Result<Value, GatewayError> {
        self.post(&["tokens", "mint"], transfer).await
    }

    /// `POST tokens/burn`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn burn_tokens(&self, transfer: &Value) -> Result<Value, GatewayError> {
        self.post(&["tokens", "burn"], transfer).await
    }

    /// `POST tokens/transfers`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn transfer_tokens(&self, transfer: &Value) -> Result<Value, GatewayError> {
        self.post(&["tokens", "transfers"], transfer).await
    }

    /// `GET tokens/balances` filtered by pool and/or key.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn token_balances(
        &self,
        pool: Option<&str>,
        key: Option<&str>,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut query = Vec::with_capacity(2);
        if let Some(pool) = pool {
            query.push(("pool", pool));
        }
        if let Some(key) = key {
            query.push(("key", key));
        }
        self.get_list(&["tokens", "balances"], &query).await
    }

    // ── Contracts ───────────────────────────────────────────────────────

    /// `POST contracts/interfaces/generate` — converts an ABI to an interface.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn generate_contract_interface(
        &self,
        request: &Value,
    ) -> Result<Value, GatewayError> {
        self.post(&["contracts", "interfaces", "generate"], request)
            .await
    }

    /// `POST contracts/interfaces`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn create_contract_interface(&self, ffi: &Value) -> Result<Value, GatewayError> {
        self.post(&["contracts", "interfaces"], ffi).await
    }

    /// `GET contracts/interfaces`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn contract_interfaces(&self) -> Result<Vec<Value>, GatewayError> {
        self.get_list(&["contracts", "interfaces"], &[]).await
    }

    /// `GET contracts/interfaces/<name>/<version>`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the interface does not exist.
    pub async fn contract_interface(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Value, GatewayError> {
        self.get(&["contracts", "interfaces", name, version], &[])
            .await
    }

    /// `POST apis`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn create_contract_api(&self, api: &Value) -> Result<Value, GatewayError> {
        self.post(&["apis"], api).await
    }

    /// `GET apis`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn contract_apis(&self) -> Result<Vec<Value>, GatewayError> {
        self.get_list(&["apis"], &[]).await
    }

    /// `GET apis/<name>`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the API does not exist.
    pub async fn contract_api(&self, name: &str) -> Result<Value, GatewayError> {
        self.get(&["apis", name], &[]).await
    }

    /// `POST apis/<api>/listeners/<event_path>`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn create_contract_api_listener(
        &self,
        api_name: &str,
        event_path: &str,
        listener: &Value,
    ) -> Result<Value, GatewayError> {
        self.post(&["apis", api_name, "listeners", event_path], listener)
            .await
    }

    /// `GET contracts/listeners`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn contract_listeners(&self) -> Result<Vec<Value>, GatewayError> {
        self.get_list(&["contracts", "listeners"], &[]).await
    }

    // ── Datatypes ───────────────────────────────────────────────────────

    /// `GET datatypes`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn datatypes(&self) -> Result<Vec<Value>, GatewayError> {
        self.get_list(&["datatypes"], &[]).await
    }

    /// `GET datatypes/<name>/<version>`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the datatype does not exist.
    pub async fn datatype(&self, name: &str, version: &str) -> Result<Value, GatewayError> {
        self.get(&["datatypes", name, version], &[]).await
    }

    /// `POST datatypes`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the upstream call fails.
    pub async fn create_datatype(&self, datatype: &Value) -> Result<Value, GatewayError> {
        self.post(&["datatypes"], datatype).await
    }
}

#[async_trait]
impl Upstream for FireFlyClient {
    async fn listen(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<UpstreamSubscription, GatewayError> {
        let ws_url = self.ws_url()?;
        event_stream::open(&ws_url, &self.namespace, filter, self.event_buffer_capacity).await
    }

    async fn batches_for_transaction(&self, tx_id: &str) -> Result<Vec<Value>, GatewayError> {
        self.batches(tx_id).await
    }
}

/// Decodes an upstream response, mapping 404 to [`GatewayError::NotFound`]
/// and any other failure status to [`GatewayError::Upstream`].
async fn read_json(response: Response) -> Result<Value, GatewayError> {
    let status = response.status();
    let url = response.url().clone();
    if status.is_success() {
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        Err(GatewayError::NotFound(format!("{}: {message}", url.path())))
    } else {
        Err(GatewayError::Upstream(format!(
            "{} returned {status}: {message}",
            url.path()
        )))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> FireFlyClient {
        let Ok(url) = Url::parse(endpoint) else {
            panic!("valid url");
        };
        FireFlyClient::new(reqwest::Client::new(), url, "default", 8)
    }

    #[test]
    fn api_url_places_namespace() {
        let c = client("http://localhost:5000");
        let Ok(url) = c.api_url(&["tokens", "pools"], &[]) else {
            panic!("url must build");
        };
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/v1/namespaces/default/tokens/pools"
        );
    }

    #[test]
    fn api_url_encodes_segments_and_query() {
        let c = client("http://localhost:5000/");
        let Ok(url) = c.api_url(&["datatypes", "a b", "1.0"], &[("tx.id", "t/1")]) else {
            panic!("url must build");
        };
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/v1/namespaces/default/datatypes/a%20b/1.0?tx.id=t%2F1"
        );
    }

    #[test]
    fn api_url_keeps_endpoint_prefix() {
        let c = client("https://gateway.example.com/firefly");
        let Ok(url) = c.api_url(&["status"], &[]) else {
            panic!("url must build");
        };
        assert_eq!(
            url.as_str(),
            "https://gateway.example.com/firefly/api/v1/namespaces/default/status"
        );
    }

    #[test]
    fn ws_url_swaps_scheme() {
        let Ok(plain) = client("http://localhost:5000").ws_url() else {
            panic!("ws url must build");
        };
        assert_eq!(plain.as_str(), "ws://localhost:5000/ws");

        let Ok(tls) = client("https://ff.example.com").ws_url() else {
            panic!("ws url must build");
        };
        assert_eq!(tls.as_str(), "wss://ff.example.com/ws");
    }

    #[test]
    fn ws_url_keeps_endpoint_prefix() {
        let Ok(url) = client("https://gateway.example.com/firefly/?x=1").ws_url() else {
            panic!("ws url must build");
        };
        assert_eq!(url.as_str(), "wss://gateway.example.com/firefly/ws");
    }
}
