pub mod config;
pub mod digest;
pub mod error;
pub mod index;
pub mod storage;

mod types;

pub use config::IndexConfig;
pub use digest::{DigestEngine, EMPTY_DIGEST};
pub use error::{RegistryError, Result};
pub use index::{journal::Journal, HashIndex, RefreshSummary};
pub use types::*;

/// Install the `tracing` subscriber used by the binaries. `RUST_LOG` wins
/// over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
