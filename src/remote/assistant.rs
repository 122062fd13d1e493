//! Remote assistant client.
//!
//! Unmatched terminal input is posted as `{"prompt": ...}` and the reply is
//! read from the `response` field.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, read_json, RemoteError, Result};
use crate::config::AssistantConfig;

/// Question answering service
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Send the user's text verbatim and return the reply text
    async fn ask(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    response: String,
}

/// Assistant reached over HTTP
pub struct HttpAssistant {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpAssistant {
    pub fn new(config: &AssistantConfig) -> std::result::Result<Self, RemoteError> {
        let client = http_client(
            config.timeout(),
            concat!("folioterm/", env!("CARGO_PKG_VERSION")),
        )?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl Assistant for HttpAssistant {
    async fn ask(&self, prompt: &str) -> Result<String> {
        debug!("Querying assistant at {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&QueryRequest { prompt })
            .send()
            .await?;

        let body: QueryResponse = read_json(response).await?;
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(QueryRequest { prompt: "Who Are You?" }).unwrap();
        assert_eq!(body, serde_json::json!({ "prompt": "Who Are You?" }));
    }

    #[test]
    fn test_response_requires_reply_field() {
        let ok: QueryResponse = serde_json::from_str(r#"{"response":"42"}"#).unwrap();
        assert_eq!(ok.response, "42");

        assert!(serde_json::from_str::<QueryResponse>(r#"{"answer":"42"}"#).is_err());
        assert!(serde_json::from_str::<QueryResponse>("not json").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let assistant = HttpAssistant::new(&AssistantConfig {
            // Port 9 (discard) on loopback is closed on any sane test host
            endpoint: "http://127.0.0.1:9/query".to_string(),
            timeout_secs: 2,
        })
        .unwrap();

        assert!(assistant.ask("banana").await.is_err());
    }
}
