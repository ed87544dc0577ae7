//! Remote collection client.
//!
//! `EmployeeApi` is the seam between the controller and the network. The HTTP
//! implementation issues exactly one request per call: no retries, no
//! idempotency keys.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::errors::ClientError;
use crate::models::Employee;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Operations over the remote employee collection.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    /// Fetch the full current collection in server order.
    async fn list(&self) -> ClientResult<Vec<Employee>>;

    /// Fetch a single record.
    async fn get(&self, id: &str) -> ClientResult<Employee>;

    /// Create a record; the server assigns its id.
    async fn create(&self, draft: &Employee) -> ClientResult<Employee>;

    /// Replace the record at `id`.
    async fn update(&self, id: &str, draft: &Employee) -> ClientResult<Employee>;

    /// Remove the record at `id`.
    async fn delete(&self, id: &str) -> ClientResult<()>;
}

/// HTTP client for the employee collection at a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpEmployeeClient {
    client: Client,
    base_url: String,
}

impl HttpEmployeeClient {
    /// Create a client for `base_url`, e.g. `http://host/api/employees`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// Turn a non-2xx response into the matching error.
    async fn check(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let err = ClientError::from_status(status, &text);
        tracing::debug!("Request failed with {}: {}", status, err);
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl EmployeeApi for HttpEmployeeClient {
    async fn list(&self) -> ClientResult<Vec<Employee>> {
        tracing::debug!("GET {}", self.base_url);
        let response = self.client.get(&self.base_url).send().await?;
        Self::decode(response).await
    }

    async fn get(&self, id: &str) -> ClientResult<Employee> {
        let url = self.record_url(id);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn create(&self, draft: &Employee) -> ClientResult<Employee> {
        tracing::debug!("POST {}", self.base_url);
        // The server assigns the id, so never send one.
        let body = Employee {
            id: String::new(),
            ..draft.clone()
        };
        let response = self.client.post(&self.base_url).json(&body).send().await?;
        Self::decode(response).await
    }

    async fn update(&self, id: &str, draft: &Employee) -> ClientResult<Employee> {
        let url = self.record_url(id);
        tracing::debug!("PUT {}", url);
        let response = self.client.put(&url).json(draft).send().await?;
        let response = Self::check(response).await?;

        // Some services answer a PUT with an empty body; fall back to what was sent.
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Employee {
                id: id.to_string(),
                ..draft.clone()
            });
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn delete(&self, id: &str) -> ClientResult<()> {
        let url = self.record_url(id);
        tracing::debug!("DELETE {}", url);
        let response = self.client.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = HttpEmployeeClient::with_client(Client::new(), "http://localhost:8080/api/employees/");
        assert_eq!(client.base_url(), "http://localhost:8080/api/employees");
        assert_eq!(
            client.record_url("7"),
            "http://localhost:8080/api/employees/7"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Grab a free port, then release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpEmployeeClient::new(
            format!("http://{}/api/employees", addr),
            Duration::from_secs(2),
        )
        .unwrap();

        match client.list().await {
            Err(ClientError::Network(_)) => {}
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_with_empty_body_echoes_draft() {
        let app = axum::Router::new().route("/api/employees/{id}", axum::routing::put(|| async { "" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = HttpEmployeeClient::new(
            format!("http://{}/api/employees", addr),
            Duration::from_secs(5),
        )
        .unwrap();
        let draft = Employee::new("Ada", "ada@example.com", "Eng");

        let updated = client.update("7", &draft).await.unwrap();
        assert_eq!(updated, draft.with_id("7"));
    }
}
