//! Error types for readmux

use thiserror::Error;

/// Result type alias for readmux operations
pub type Result<T> = std::result::Result<T, ReadmuxError>;

/// Error types that can occur in readmux
///
/// Only conditions that end a source or a source pair surface as errors.
/// A single malformed record is reported through the boolean return of the
/// full-parse step, and a single unreadable file is warned about once and
/// skipped, so neither appears here.
#[derive(Debug, Error)]
pub enum ReadmuxError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Paired mate files fell out of lock-step
    #[error(
        "Paired-end files out of sync: mate-1 produced {mate1} record(s), \
         mate-2 produced {mate2}"
    )]
    PairedEndDesync {
        /// Records light-parsed from the mate-1 file this batch
        mate1: usize,
        /// Records light-parsed from the mate-2 file this batch
        mate2: usize,
    },

    /// Input layout the factory cannot build a composer for
    #[error("Unsupported input layout: {0}")]
    UnsupportedLayout(String),
}
