use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::AppError;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DOWNSTREAM_URL: &str = "http://localhost:8080/upload";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Endpoint that receives the compressed artifact.
    pub downstream_url: Url,
    /// Directory holding `index.html` and the assets mounted under `/static`.
    pub static_dir: PathBuf,
    /// Upper bound on a single downstream call, connect through body read.
    pub forward_timeout: Duration,
    pub max_upload_bytes: usize,
    /// Parent of the per-request temporary directories.
    pub staging_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            downstream_url: Url::parse(DEFAULT_DOWNSTREAM_URL)
                .expect("default downstream URL is valid"),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            forward_timeout: DEFAULT_FORWARD_TIMEOUT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            staging_dir: env::temp_dir(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let downstream_url = match env::var("DOWNSTREAM_URL") {
            Ok(raw) => parse_downstream_url(&raw)?,
            Err(_) => defaults.downstream_url,
        };

        Ok(Self {
            port: env::var("RELAY_PORT")
                .or_else(|_| env::var("PORT"))
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            downstream_url,
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            forward_timeout: env::var("FORWARD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.forward_timeout),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
        })
    }
}

/// Only absolute http(s) URLs are accepted as a forwarding target.
pub fn parse_downstream_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim()).map_err(|e| AppError::InvalidConfig(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(AppError::InvalidConfig(format!(
            "{}: downstream URL must be an absolute http(s) URL",
            raw
        ))),
    }
}
