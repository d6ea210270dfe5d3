//! Forwarding of compressed artifacts to the downstream service.
//!
//! The [`Forwarder`] trait is the seam between the ingress handler and the
//! network, so handlers can be exercised against an in-memory implementation.

use super::types::{CompressedArtifact, RelayResult};
use crate::config::Config;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Multipart field name the downstream service reads the artifact from.
pub const FILE_FIELD: &str = "file";

/// Sends a compressed artifact downstream and reports the outcome.
pub trait Forwarder: Send + Sync {
    /// Forwards `artifact` once. Never retries.
    ///
    /// # Arguments
    ///
    /// * `artifact` - The compressed upload, sent as the `file` part
    ///
    /// # Returns
    ///
    /// A future that resolves to a `RelayResult`. Any HTTP answer from
    /// downstream is a success result carrying its status and body.
    /// Transport failures produce an error result.
    fn forward(
        &self,
        artifact: CompressedArtifact,
    ) -> Pin<Box<dyn Future<Output = RelayResult> + Send + '_>>;
}

/// Production forwarder backed by a pooled `reqwest` client.
#[derive(Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpForwarder {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.forward_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.downstream_url.clone(),
            timeout: config.forward_timeout,
        })
    }

    /// Creates a new `HttpForwarder` wrapped in an `Arc`.
    pub fn arc(config: &Config) -> Result<Arc<Self>, reqwest::Error> {
        Self::new(config).map(Arc::new)
    }

    async fn send(&self, artifact: CompressedArtifact) -> Result<(u16, String), reqwest::Error> {
        let part = Part::bytes(artifact.data)
            .file_name(artifact.filename)
            .mime_str(artifact.content_type)?;
        let form = Form::new().part(FILE_FIELD, part);

        let response = self.client.post(self.url.clone()).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

impl Forwarder for HttpForwarder {
    fn forward(
        &self,
        artifact: CompressedArtifact,
    ) -> Pin<Box<dyn Future<Output = RelayResult> + Send + '_>> {
        Box::pin(async move {
            let start = Instant::now();
            let filename = artifact.filename.clone();
            let size = artifact.data.len();

            tracing::debug!(
                url = %self.url,
                filename = %filename,
                size,
                "Forwarding artifact downstream"
            );

            match self.send(artifact).await {
                Ok((status, body)) => {
                    tracing::info!(
                        url = %self.url,
                        status,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Downstream responded"
                    );
                    RelayResult::success(status, body)
                }
                Err(e) => {
                    tracing::warn!(
                        url = %self.url,
                        code = transport_error_code(&e),
                        timeout_secs = self.timeout.as_secs(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Downstream request failed"
                    );
                    RelayResult::error(format!(
                        "Error communicating with downstream service: {}",
                        e
                    ))
                }
            }
        })
    }
}

/// Classifies a transport failure for logging. The caller-facing status does
/// not depend on it.
pub fn transport_error_code(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "TIMEOUT"
    } else if e.is_connect() {
        "CONNECTION_FAILED"
    } else if e.is_request() {
        "REQUEST_ERROR"
    } else {
        "REQUEST_FAILED"
    }
}
