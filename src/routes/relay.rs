use axum::extract::{Multipart, State};

use super::AppState;
use crate::error::AppError;
use crate::relay::{CompressionRequest, RelayResult, Upload};

const FILE_FIELD: &str = "file";
const COMPRESSION_FIELD: &str = "compression";

/// `POST /compress-and-forward/`
///
/// Expects a `file` part and an optional `compression` text part. Only the
/// first `file` part is relayed; other fields are ignored.
pub async fn compress_and_forward(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<RelayResult, AppError> {
    let mut upload: Option<Upload> = None;
    let mut compression: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            FILE_FIELD if upload.is_none() => {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                upload = Some(Upload::new(filename.as_deref(), data));
            }
            COMPRESSION_FIELD => {
                compression = Some(field.text().await?);
            }
            other => {
                tracing::debug!(field = %other, "Ignoring multipart field");
            }
        }
    }

    let upload = upload.ok_or(AppError::MissingFile)?;
    tracing::debug!(
        filename = %upload.filename,
        size = upload.data.len(),
        compression = ?compression,
        "Received upload"
    );

    let result = state
        .relay
        .relay(upload, CompressionRequest::new(compression))
        .await?;

    if let Some(ref message) = result.message {
        tracing::warn!(message = %message, "Relay failed");
    }

    Ok(result)
}
