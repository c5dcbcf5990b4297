//! readmux: multi-format sequencing-read input with synchronized batch
//! dispatch
//!
//! # Overview
//!
//! readmux ingests streams of biological short reads from one or more files
//! (plain or gzip-compressed, paired across parallel files, or interleaved
//! in a single file) and dispenses per-thread batches of parsed records to
//! many worker threads concurrently.
//!
//! ## Key Properties
//!
//! - **Two-phase parsing**: record boundaries are carved out inside the I/O
//!   critical section ("light-parse"); names, bases, and qualities are
//!   decoded outside every lock ("full-parse"), so lock hold-times scale
//!   with I/O, not CPU work
//! - **Lock-step pairing**: parallel mate files advance under one lock and
//!   a desync is reported as an error, never silently mispaired
//! - **Gap-free identifiers**: every read carries a monotonically
//!   increasing 64-bit identifier, assigned at batch allocation, with no
//!   duplicates and no gaps across any number of worker threads
//! - **Six text formats**: FASTA, FASTQ (single and interleaved),
//!   tab-delimited (5/6 column), Qseq, Raw, and windowed FASTA-continuous
//!   sampling, plus an in-memory source
//!
//! ## Quick Start
//!
//! ```no_run
//! use readmux::{Composer, InputConfig, InputFiles, PerThreadReader};
//! use std::sync::Arc;
//!
//! # fn main() -> readmux::Result<()> {
//! let config = Arc::new(InputConfig::default());
//! let files = InputFiles {
//!     singles: vec!["reads.fq.gz".into()],
//!     ..InputFiles::default()
//! };
//! let composer = Composer::from_inputs(&files, config)?;
//!
//! // One reader per worker thread; the composer is the shared object.
//! let mut reader = PerThreadReader::new(&composer, false);
//! loop {
//!     let (ok, done) = reader.next_read_pair()?;
//!     if ok {
//!         let read = reader.read_a();
//!         // Process one read (or pair) at a time
//!     }
//!     if done {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`io`]: byte streams, batch buffers, sources, composers, and the
//!   per-thread facade
//! - [`operations`]: quality decoding, trimming, and base-level transforms
//! - [`config`]: the configuration record consumed from the CLI layer

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod io;
pub mod operations;
pub mod types;

// Re-export commonly used types
pub use config::{Format, InputConfig};
pub use error::{ReadmuxError, Result};
pub use io::{Composer, InputFiles, Mate, PerThreadReader, ReadBatch};
pub use types::ReadRecord;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
