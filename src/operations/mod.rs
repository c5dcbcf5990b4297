//! Record-level operations applied during full-parse
//!
//! Everything here runs outside the I/O critical section: quality decoding,
//! hard trimming, and the mate-orientation transform all operate on buffers
//! the calling thread owns exclusively.

pub mod quality;
pub mod sequence;
pub mod trimming;

pub use quality::{decode_quality, QualityScale};
pub use sequence::{is_iupac, reverse_complement_inplace};
pub use trimming::clip_ends;
