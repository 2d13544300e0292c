use crate::api::config::HttpMethod;
use crate::error::FetchError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("picklist/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper around reqwest carrying the widget's transport defaults.
/// Cloning is cheap (reqwest clients share their connection pool).
#[derive(Debug, Clone)]
pub struct AjaxClient {
    client: Client,
}

impl AjaxClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(AjaxClient { client })
    }

    /// Fetch one page of results as raw JSON. GET sends the parameters as a
    /// query string, POST as a form-url-encoded body.
    pub async fn fetch_json(
        &self,
        method: HttpMethod,
        url: String,
        params: Vec<(String, String)>,
    ) -> Result<Value, FetchError> {
        log::debug!("dispatching {:?} {} ({} params)", method, url, params.len());

        let request = match method {
            HttpMethod::Get => self.client.get(&url).query(&params),
            HttpMethod::Post => self.client.post(&url).form(&params),
        };

        let response = request.send().await.map_err(|e| {
            log::warn!("fetch failed for {}: {}", url, e);
            FetchError::Network {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response.json::<Value>().await.map_err(|e| FetchError::Parse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(AjaxClient::new().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_network_error() {
        let client = AjaxClient::new().expect("client creation failed");
        let result = client
            .fetch_json(HttpMethod::Get, "http://127.0.0.1:1/search".to_string(), vec![])
            .await;

        match result {
            Err(FetchError::Network { message }) => assert!(!message.is_empty()),
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
