//! Upload staging and compression.
//!
//! Every request gets a private temporary directory. The upload is written
//! there, streamed through the encoder into a second file, and the directory
//! is removed when the staging guard drops, whichever way the work ends.

use super::types::{CompressedArtifact, CompressionAlgorithm, Upload};
use crate::error::AppError;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const STAGED_INPUT: &str = "input";
const STAGED_OUTPUT: &str = "compressed";

/// Trait for content compression.
pub trait Compressor: Send + Sync {
    fn algorithm(&self) -> CompressionAlgorithm;

    /// Suffix appended to the original filename, including the dot.
    fn suffix(&self) -> &'static str;

    /// Content type of the compressed payload.
    fn content_type(&self) -> &'static str;

    /// Compression effort passed to the encoder.
    fn level(&self) -> u32;

    /// Compresses everything from `reader` into `writer`.
    ///
    /// # Arguments
    ///
    /// * `reader` - Source of the uncompressed bytes, read to EOF
    /// * `writer` - Destination for the complete compressed stream
    ///
    /// # Returns
    ///
    /// The number of input bytes consumed, or the first I/O error raised by
    /// either side.
    fn compress(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64>;
}

/// Gzip compressor implementation.
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: u32,
}

impl GzipCompressor {
    pub const fn new(level: u32) -> Self {
        Self { level }
    }

    /// Maximum compression effort.
    pub const fn best() -> Self {
        Self::new(9)
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::best()
    }
}

impl Compressor for GzipCompressor {
    fn algorithm(&self) -> CompressionAlgorithm {
        CompressionAlgorithm::Gzip
    }

    fn suffix(&self) -> &'static str {
        ".gz"
    }

    fn content_type(&self) -> &'static str {
        "application/gzip"
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn compress(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
        let mut encoder = GzEncoder::new(writer, Compression::new(self.level));
        let consumed = io::copy(reader, &mut encoder)?;
        encoder.finish()?.flush()?;
        Ok(consumed)
    }
}

static GZIP_BEST: GzipCompressor = GzipCompressor::best();

impl CompressionAlgorithm {
    /// The compressor used for this algorithm, configured for maximum effort.
    pub fn compressor(&self) -> &'static dyn Compressor {
        match self {
            CompressionAlgorithm::Gzip => &GZIP_BEST,
        }
    }
}

/// Stages `upload` under `staging_root` and compresses it with `compressor`.
///
/// Blocking; call from [`compress_upload`] or another blocking context.
pub fn stage_and_compress(
    upload: &Upload,
    compressor: &dyn Compressor,
    staging_root: &Path,
) -> Result<CompressedArtifact, AppError> {
    let staging = tempfile::Builder::new()
        .prefix("relay-")
        .tempdir_in(staging_root)?;

    let input_path = staging.path().join(STAGED_INPUT);
    let output_path = staging.path().join(STAGED_OUTPUT);

    {
        let mut input = BufWriter::new(File::create(&input_path)?);
        input.write_all(&upload.data)?;
        input.flush()?;
    }

    let consumed = {
        let mut reader = BufReader::new(File::open(&input_path)?);
        let mut writer = BufWriter::new(File::create(&output_path)?);
        let consumed = compressor.compress(&mut reader, &mut writer)?;
        writer.flush()?;
        consumed
    };

    let data = std::fs::read(&output_path)?;

    tracing::debug!(
        filename = %upload.filename,
        algorithm = compressor.algorithm().name(),
        level = compressor.level(),
        original_size = consumed,
        compressed_size = data.len(),
        "Compressed upload"
    );

    Ok(CompressedArtifact {
        filename: format!("{}{}", upload.filename, compressor.suffix()),
        content_type: compressor.content_type(),
        algorithm: compressor.algorithm(),
        data,
        original_size: upload.data.len(),
    })
}

/// Runs [`stage_and_compress`] on the blocking pool.
pub async fn compress_upload(
    upload: Upload,
    algorithm: CompressionAlgorithm,
    staging_root: PathBuf,
) -> Result<CompressedArtifact, AppError> {
    tokio::task::spawn_blocking(move || {
        stage_and_compress(&upload, algorithm.compressor(), &staging_root)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Compression task failed: {}", e)))?
}
