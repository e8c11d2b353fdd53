//! reqwest-backed [`Gateway`] implementation

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::error::{GatewayError, GatewayResult};
use super::{encode_params, Gateway, SyncCommand};
use crate::config::ApiConfig;

/// HTTP client for the Todoist REST and Sync APIs
///
/// Authenticates every request with a static bearer token and tags it with
/// a fresh `X-Request-Id`.
pub struct TodoistClient {
    client: Client,
    token: String,
    rest_url: String,
    sync_url: String,
}

impl TodoistClient {
    pub fn new(config: &ApiConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("todoist-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            token: config.token.clone(),
            rest_url: config.rest_url.trim_end_matches('/').to_string(),
            sync_url: config.sync_url.trim_end_matches('/').to_string(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/json")
            .header("X-Request-Id", Uuid::new_v4().to_string())
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Value> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        handle_response(status, &body)
    }
}

/// Map a raw response onto the gateway contract
///
/// Non-success statuses become [`GatewayError::Api`] with the body text,
/// `204` (or an empty success body) becomes `Value::Null`.
pub fn handle_response(status: StatusCode, body: &str) -> GatewayResult<Value> {
    if !status.is_success() {
        warn!(status = status.as_u16(), "Todoist API returned an error");
        return Err(GatewayError::Api {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl Gateway for TodoistClient {
    #[instrument(skip(self, query))]
    async fn get(&self, path: &str, query: &Map<String, Value>) -> GatewayResult<Value> {
        let url = format!("{}{}", self.rest_url, path);
        let params = encode_params(query);
        debug!(?params, "GET {}", url);

        self.send(self.client.get(&url).query(&params)).await
    }

    #[instrument(skip(self, body))]
    async fn post(&self, path: &str, body: &Map<String, Value>) -> GatewayResult<Value> {
        let url = format!("{}{}", self.rest_url, path);
        debug!(body = %serde_json::Value::Object(body.clone()), "POST {}", url);

        self.send(self.client.post(&url).json(body)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> GatewayResult<Value> {
        let url = format!("{}{}", self.rest_url, path);
        debug!("DELETE {}", url);

        self.send(self.client.delete(&url)).await
    }

    #[instrument(skip(self, commands), fields(count = commands.len()))]
    async fn sync(&self, commands: &[SyncCommand]) -> GatewayResult<Value> {
        let url = format!("{}/sync", self.sync_url);
        let payload = json!({ "commands": commands });
        debug!(body = %payload, "SYNC {}", url);

        self.send(self.client.post(&url).json(&payload)).await
    }

    #[instrument(skip(self, params))]
    async fn completed(&self, params: &Map<String, Value>) -> GatewayResult<Value> {
        let url = format!("{}/completed/get_all", self.sync_url);
        let form = encode_params(params);
        debug!(?form, "POST {}", url);

        self.send(self.client.post(&url).form(&form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_content_is_null() {
        let result = handle_response(StatusCode::NO_CONTENT, "").unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_success_body_is_parsed() {
        let result = handle_response(StatusCode::OK, r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(result[0]["id"], "1");
    }

    #[test]
    fn test_error_status_carries_status_and_body() {
        let err = handle_response(StatusCode::NOT_FOUND, "Task not found").unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Todoist API error (404): Task not found");
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = handle_response(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = ApiConfig {
            token: "secret".into(),
            rest_url: "https://example.test/rest/v2/".into(),
            sync_url: "https://example.test/sync/v9".into(),
            timeout_secs: 5,
        };
        let client = TodoistClient::new(&config).unwrap();
        assert_eq!(client.rest_url, "https://example.test/rest/v2");
        assert_eq!(client.sync_url, "https://example.test/sync/v9");
    }
}
