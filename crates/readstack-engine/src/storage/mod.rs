pub mod archive;
pub mod progress;

pub use archive::ArchiveStore;
pub use progress::ProgressLedger;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
