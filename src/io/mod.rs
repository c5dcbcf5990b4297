//! I/O module: byte streams, batch buffers, sources, and composers
//!
//! Data flows one way through this module: files feed a [`ByteStream`],
//! a format light-parse carves records into a [`ReadBatch`] inside the
//! source's critical section, and the owning thread full-parses each slot
//! through its [`PerThreadReader`] outside every lock.

pub mod buffer;
pub mod composer;
pub(crate) mod formats;
pub mod per_thread;
pub(crate) mod source;
pub mod stream;

pub use buffer::{Mate, ReadBatch};
pub use composer::{Composer, DualComposer, InputFiles, SoloComposer};
pub use per_thread::PerThreadReader;
pub use stream::{ByteStream, MMAP_THRESHOLD, STREAM_BUF_SIZE};
