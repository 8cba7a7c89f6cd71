//! Snapshot error types.

use thiserror::Error;

/// Why a snapshot could not be written or read back
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Could not encode snapshot: {0}")]
    Encode(String),

    #[error("Could not decode snapshot: {0}")]
    Decode(String),

    /// Written by a newer (or older) format than this build reads
    #[error("Snapshot format {found} cannot be read, expected format {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
