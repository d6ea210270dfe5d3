pub mod compressor;
pub mod forwarder;
pub mod service;
pub mod types;

pub use compressor::{compress_upload, stage_and_compress, Compressor, GzipCompressor};
pub use forwarder::{Forwarder, HttpForwarder};
pub use service::RelayService;
pub use types::*;
