use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Filename used when the client sends a `file` part without one.
pub const FALLBACK_FILENAME: &str = "upload";

/// Uploaded file as parsed from the inbound multipart body.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: Option<&str>, data: Bytes) -> Self {
        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        Self { filename, data }
    }
}

/// Supported compression formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionAlgorithm {
    #[default]
    Gzip,
}

impl CompressionAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            CompressionAlgorithm::Gzip => "gzip",
        }
    }

    /// Resolves a client-supplied selector. Unrecognized values select the default.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "gzip" => CompressionAlgorithm::Gzip,
            other => {
                tracing::debug!(
                    requested = %other,
                    fallback = Self::default().name(),
                    "Unrecognized compression algorithm, using default"
                );
                Self::default()
            }
        }
    }
}

/// The optional `compression` form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionRequest {
    pub algorithm: String,
}

impl Default for CompressionRequest {
    fn default() -> Self {
        Self {
            algorithm: CompressionAlgorithm::default().name().to_string(),
        }
    }
}

impl CompressionRequest {
    pub fn new(algorithm: Option<String>) -> Self {
        algorithm
            .map(|algorithm| Self { algorithm })
            .unwrap_or_default()
    }

    pub fn resolve(&self) -> CompressionAlgorithm {
        CompressionAlgorithm::from_selector(&self.algorithm)
    }
}

/// Compressed copy of an upload, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct CompressedArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub algorithm: CompressionAlgorithm,
    pub data: Vec<u8>,
    pub original_size: usize,
}

impl CompressedArtifact {
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.original_size == 0 {
            return None;
        }
        Some(self.data.len() as f64 / self.original_size as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayStatus {
    Success,
    Error,
}

/// Outcome of a relay call, serialized as the response body.
///
/// A successful result carries whatever the downstream answered, including
/// its non-2xx statuses. Only transport failures produce an error result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayResult {
    pub status: RelayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_backend_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelayResult {
    pub fn success(status_code: u16, body: String) -> Self {
        Self {
            status: RelayStatus::Success,
            go_backend_response: Some(body),
            status_code: Some(status_code),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: RelayStatus::Error,
            go_backend_response: None,
            status_code: None,
            message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RelayStatus::Success
    }

    /// Status of the relay's own response. Downstream statuses are never mapped.
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            RelayStatus::Success => StatusCode::OK,
            RelayStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayResult {
    fn into_response(self) -> Response {
        (self.http_status(), Json(self)).into_response()
    }
}
