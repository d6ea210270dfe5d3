use axum::{extract::State, response::Html};
use std::io::ErrorKind;

use super::AppState;
use crate::error::AppError;

pub const INDEX_FILE: &str = "index.html";

/// `GET /`: the upload page, read from disk on every request.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let path = state.config.static_dir.join(INDEX_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(AppError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}
