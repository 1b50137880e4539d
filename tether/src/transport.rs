//! Delivery of flushed event batches to the server.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request could not be delivered: {0}")]
    Delivery(String),
    #[error("server rejected the batch: status {0}")]
    Rejected(u16),
    #[error("response body was not valid JSON: {0}")]
    InvalidBody(String),
}

/// Something able to deliver one wire batch and produce the server's
/// JSON reply.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, body: Value) -> Result<Value, TransportError>;
}

/// POSTs batches to the page's ajax endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Per-request deadline at the HTTP layer. Independent of the
    /// channel's own abandonment policy.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, body: Value) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| TransportError::Delivery(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| TransportError::InvalidBody(err.to_string()))
    }
}

/// Answers every batch from a fixed function. Demos and tests.
pub struct Loopback {
    respond: Box<dyn Fn(&Value) -> Result<Value, TransportError> + Send + Sync>,
}

impl Loopback {
    pub fn new(
        respond: impl Fn(&Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
        }
    }

    /// Loopback that acknowledges every batch with the same reply.
    pub fn ok(reply: Value) -> Self {
        Self::new(move |_| Ok(reply.clone()))
    }
}

#[async_trait]
impl Transport for Loopback {
    async fn submit(&self, body: Value) -> Result<Value, TransportError> {
        (self.respond)(&body)
    }
}
