use crate::config::ArrConfig;
use refresharr_common::{Error, Result};
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Request/response boundary to a *arr v3 API.
///
/// `endpoint` is relative to `/api/v3/` and may carry a query string.
#[async_trait::async_trait]
pub trait ArrTransport: Send + Sync {
    async fn request(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value>;
}

/// Create an HTTP transport for a configured *arr instance
pub fn create_transport(config: &ArrConfig) -> Arc<dyn ArrTransport> {
    Arc::new(HttpTransport::new(config))
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ArrConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v3/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl ArrTransport for HttpTransport {
    async fn request(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let mut request = self
            .client
            .request(method.clone(), self.url(endpoint))
            .header("X-Api-Key", &self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::remote(format!("{} {}: {}", method, endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::remote(format!(
                "{} {} returned {}: {}",
                method, endpoint, status, body
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::remote(format!("{} {}: {}", method, endpoint, e)))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::malformed(format!("{} {} returned invalid JSON: {}", method, endpoint, e))
        })
    }
}
