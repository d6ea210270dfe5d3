pub mod config;
pub mod error;
pub mod relay;
pub mod routes;

pub use config::Config;
pub use error::AppError;
pub use relay::{CompressedArtifact, Forwarder, HttpForwarder, RelayResult, RelayService, Upload};
pub use routes::{router, AppState};
