//! The compress-then-forward pipeline.
//!
//! Holds only immutable, shareable pieces: the forwarder and the staging
//! root. Nothing is cached between requests.

use super::compressor::compress_upload;
use super::forwarder::{Forwarder, HttpForwarder};
use super::types::{CompressionRequest, RelayResult, Upload};
use crate::config::Config;
use crate::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct RelayService {
    forwarder: Arc<dyn Forwarder>,
    staging_dir: PathBuf,
}

impl RelayService {
    pub fn new(forwarder: Arc<dyn Forwarder>, staging_dir: PathBuf) -> Self {
        Self {
            forwarder,
            staging_dir,
        }
    }

    /// Builds the service with an [`HttpForwarder`] pointed at the configured
    /// downstream URL.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            HttpForwarder::arc(config)?,
            config.staging_dir.clone(),
        ))
    }

    /// Compresses `upload` and forwards the result. Exactly one artifact is
    /// produced and sent per call.
    pub async fn relay(
        &self,
        upload: Upload,
        request: CompressionRequest,
    ) -> Result<RelayResult, AppError> {
        let algorithm = request.resolve();
        let filename = upload.filename.clone();

        let artifact = compress_upload(upload, algorithm, self.staging_dir.clone()).await?;
        tracing::info!(
            filename = %filename,
            algorithm = algorithm.name(),
            original_size = artifact.original_size,
            compressed_size = artifact.data.len(),
            ratio = artifact.compression_ratio().unwrap_or(0.0),
            "Upload compressed"
        );

        Ok(self.forwarder.forward(artifact).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::types::{CompressedArtifact, CompressionAlgorithm};
    use axum::body::Bytes;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingForwarder {
        received: Mutex<Vec<CompressedArtifact>>,
    }

    impl Forwarder for RecordingForwarder {
        fn forward(
            &self,
            artifact: CompressedArtifact,
        ) -> Pin<Box<dyn Future<Output = RelayResult> + Send + '_>> {
            self.received.lock().unwrap().push(artifact);
            Box::pin(async { RelayResult::success(201, "created".to_string()) })
        }
    }

    #[tokio::test]
    async fn test_relay_forwards_exactly_one_artifact() {
        let root = tempfile::tempdir().unwrap();
        let forwarder = Arc::new(RecordingForwarder::default());
        let service = RelayService::new(forwarder.clone(), root.path().to_path_buf());

        let upload = Upload::new(Some("report.csv"), Bytes::from_static(b"a,b\n1,2\n"));
        let result = service
            .relay(upload, CompressionRequest::new(Some("lz4".to_string())))
            .await
            .unwrap();

        assert_eq!(result, RelayResult::success(201, "created".to_string()));

        let received = forwarder.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].filename, "report.csv.gz");
        assert_eq!(received[0].algorithm, CompressionAlgorithm::Gzip);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_staging_failure_skips_forwarding() {
        let root = tempfile::tempdir().unwrap();
        let forwarder = Arc::new(RecordingForwarder::default());
        let service = RelayService::new(forwarder.clone(), root.path().join("gone"));

        let upload = Upload::new(Some("report.csv"), Bytes::from_static(b"a"));
        let err = service
            .relay(upload, CompressionRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Io(_)));
        assert!(forwarder.received.lock().unwrap().is_empty());
    }
}
