use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::{AgentClient, ClientError, ClientResult};
use crate::domain::*;

pub struct HttpAgentClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpAgentClient {
    pub fn new(api_url: &str, api_key: Option<String>, timeout: Duration) -> ClientResult<Self> {
        let base_url = Url::parse(api_url)
            .map_err(|e| ClientError::ConfigError(format!("invalid api url {}: {}", api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::ConfigError(format!(
                "api url {} cannot carry a path",
                api_url
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| ClientError::ConfigError(format!("invalid api key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::ConfigError(format!("failed to build http client: {}", e)))?;

        tracing::info!("Using agent API at {}", base_url);

        Ok(Self { client, base_url })
    }

    /// Appends `segments` to the API prefix. Each segment is percent-encoded,
    /// so ids cannot add path components or a query.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::ConfigError(format!("api url {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> ClientResult<String> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url.clone());
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            tracing::warn!("{} returned {}: {}", url, status, text);
            return Err(ClientError::RequestFailed(format!("{}: {}", status, text)));
        }

        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let text = self.send(method, url, body).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn list_schedules(&self) -> ClientResult<Vec<Schedule>> {
        let url = self.url(&["schedules"])?;
        self.send_json(Method::GET, url, None).await
    }

    async fn get_graph(&self, graph_id: &str, version: Option<u32>) -> ClientResult<GraphMeta> {
        let mut url = self.url(&["graphs", graph_id])?;
        if let Some(version) = version {
            url.query_pairs_mut()
                .append_pair("version", &version.to_string());
        }
        self.send_json(Method::GET, url, None).await
    }

    async fn execute_graph(
        &self,
        graph_id: &str,
        graph_version: u32,
        input_data: &serde_json::Map<String, serde_json::Value>,
        input_credentials: &serde_json::Value,
    ) -> ClientResult<GraphExecutionMeta> {
        let version = graph_version.to_string();
        let url = self.url(&["graphs", graph_id, "execute", &version])?;
        let body = execute_body(input_data, input_credentials);
        self.send_json(Method::POST, url, Some(body)).await
    }

    async fn delete_schedule(&self, schedule_id: &str) -> ClientResult<()> {
        let url = self.url(&["schedules", schedule_id])?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }
}

fn execute_body(
    input_data: &serde_json::Map<String, serde_json::Value>,
    input_credentials: &serde_json::Value,
) -> serde_json::Value {
    let credentials = if input_credentials.is_null() {
        serde_json::json!({})
    } else {
        input_credentials.clone()
    };
    serde_json::json!({
        "inputs": input_data,
        "credentials_inputs": credentials,
    })
}

fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_decode() {
        ClientError::ParseError(e.to_string())
    } else {
        ClientError::ConnectionError(e.to_string())
    }
}
