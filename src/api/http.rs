//! HTTP implementation of the query service client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{
    AnalyzeResponse, ApiClient, AutocompleteResponse, DatabasesResponse, Endpoint,
    ExecuteResponse, HealthResponse, QueryRequest, TablesResponse,
};
use crate::config::ApiConfig;
use crate::error::{ConsoleError, Result};

/// JSON-over-HTTP client for the query service.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: Client,
}

impl HttpApiClient {
    /// Creates a new client for the given configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ConsoleError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the absolute URL for an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        self.send(endpoint, self.client.get(self.url(endpoint))).await
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: Endpoint, query: &str) -> Result<T> {
        let request = self
            .client
            .post(self.url(endpoint))
            .json(&QueryRequest::new(query));
        self.send(endpoint, request).await
    }

    /// Sends a request and decodes the JSON body.
    ///
    /// Non-2xx statuses are decoded like successes: the service reports its
    /// failures in the body.
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ConsoleError::transport(format!("request to {endpoint} timed out"))
            } else if e.is_connect() {
                ConsoleError::transport(format!(
                    "failed to connect to {}: {e}",
                    self.base_url
                ))
            } else {
                ConsoleError::transport(format!("request to {endpoint} failed: {e}"))
            }
        })?;

        let status = response.status();
        debug!("{} answered {}", endpoint, status);

        response.json::<T>().await.map_err(|e| {
            ConsoleError::transport(format!(
                "invalid response from {endpoint} ({status}): {e}"
            ))
        })
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn health(&self) -> Result<HealthResponse> {
        self.get(Endpoint::Health).await
    }

    async fn databases(&self) -> Result<DatabasesResponse> {
        self.get(Endpoint::Databases).await
    }

    async fn tables(&self) -> Result<TablesResponse> {
        self.get(Endpoint::Tables).await
    }

    async fn autocomplete(&self, query: &str) -> Result<AutocompleteResponse> {
        self.post(Endpoint::Autocomplete, query).await
    }

    async fn analyze(&self, query: &str) -> Result<AnalyzeResponse> {
        self.post(Endpoint::Analyze, query).await
    }

    async fn execute(&self, query: &str) -> Result<ExecuteResponse> {
        self.post(Endpoint::Execute, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response and returns the raw request it received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{addr}/api"), task)
    }

    fn client_for(base_url: &str) -> HttpApiClient {
        HttpApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_base_and_endpoint() {
        let client = client_for("http://localhost:5000/api/");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(
            client.url(Endpoint::Autocomplete),
            "http://localhost:5000/api/autocomplete"
        );
    }

    #[tokio::test]
    async fn test_execute_posts_query_and_decodes_rows() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"success": true, "message": "1 rows found", "data": [{"id": 1, "name": null}]}"#,
        )
        .await;

        let response = client_for(&base).execute("SELECT * FROM users").await.unwrap();
        assert!(response.success);
        assert_eq!(response.data.unwrap().len(), 1);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/execute"));
        assert!(request.contains(r#"{"query":"SELECT * FROM users"}"#));
    }

    #[tokio::test]
    async fn test_error_status_with_json_body_is_decoded() {
        let (base, server) = serve_once(
            "500 Internal Server Error",
            r#"{"success": false, "error": "boom", "message": "Error: boom"}"#,
        )
        .await;

        let response = client_for(&base).execute("SELECT 1").await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message, "Error: boom");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_body_is_transport_error() {
        let (base, server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;

        let err = client_for(&base).health().await.unwrap_err();
        assert!(matches!(err, ConsoleError::Transport(_)));
        assert!(err.detail().contains("/health"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{addr}/api"))
            .databases()
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Transport(_)));
    }
}
