//! Input configuration consumed from the CLI layer
//!
//! The configuration record is built once at startup by an external argument
//! parser and shared (behind `Arc`) by every source, composer, and per-thread
//! reader for the lifetime of the run. Nothing in this crate mutates it.

use crate::error::{ReadmuxError, Result};

/// Maximum window length for FASTA-continuous sampling
///
/// The sliding window is backed by a fixed circular buffer, so `sample_len`
/// may not exceed this.
pub const MAX_SAMPLE_LEN: usize = 1024;

/// Input file format
///
/// All files of one invocation share a single format. Interleaved FASTQ and
/// 6-column tab-delimited input are selected by the factory (from which file
/// list a path arrived on) and by [`InputConfig::second_name`] respectively,
/// not by separate variants here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `>name` header followed by sequence lines
    Fasta,
    /// Fixed-length windows sampled from concatenated FASTA sequences
    FastaContinuous,
    /// Four-line records: `@name`, sequence, `+`, quality
    Fastq,
    /// One record per line, tab-separated (3/5/6 fields)
    Tabbed,
    /// Illumina 11-column Qseq
    Qseq,
    /// One bare sequence per line
    Raw,
}

/// Parameters controlling parsing, trimming, and quality decoding
///
/// Field-for-field this mirrors the record the CLI layer fills in; see each
/// field for its effect on the pipeline.
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Selects the parser variant for every input file
    pub format: Format,
    /// Wrap each file in its own source (files drained in parallel) instead
    /// of concatenating them into one source
    pub file_parallel: bool,
    /// PRNG seed, passed through to downstream consumers
    pub seed: u32,
    /// Capacity of each per-thread buffer, in records
    pub max_buf: usize,
    /// Qualities are Solexa-64 encoded
    pub solexa64: bool,
    /// Qualities are Phred-64 encoded
    pub phred64: bool,
    /// Qualities are whitespace-separated decimal integers
    pub int_quals: bool,
    /// Bases to hard-clip from the 5' end
    pub trim5: usize,
    /// Bases to hard-clip from the 3' end
    pub trim3: usize,
    /// Window length for FASTA-continuous sampling
    pub sample_len: usize,
    /// Stride between window starts for FASTA-continuous sampling
    pub sample_freq: usize,
    /// Records to discard from the very start of the input
    pub skip: u64,
    /// Worker thread count; consumers size buffer pools from this
    pub nthreads: usize,
    /// Strip a trailing `/1` or `/2` mate token from paired read names
    pub fix_name: bool,
    /// Tab-delimited records carry a second name column (6-field layout)
    pub second_name: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            format: Format::Fastq,
            file_parallel: false,
            seed: 0,
            max_buf: 16,
            solexa64: false,
            phred64: false,
            int_quals: false,
            trim5: 0,
            trim3: 0,
            sample_len: 25,
            sample_freq: 1,
            skip: 0,
            nthreads: 1,
            fix_name: false,
            second_name: false,
        }
    }
}

impl InputConfig {
    /// Check the configuration for values the pipeline cannot honor
    ///
    /// Called by the factory before any source is constructed, so invalid
    /// values are rejected before a file is opened.
    pub fn validate(&self) -> Result<()> {
        if self.max_buf == 0 {
            return Err(ReadmuxError::InvalidConfig(
                "max_buf must be at least 1".to_string(),
            ));
        }
        if self.format == Format::FastaContinuous {
            if self.sample_len == 0 || self.sample_len > MAX_SAMPLE_LEN {
                return Err(ReadmuxError::InvalidConfig(format!(
                    "sample_len must be in 1..={} (got {})",
                    MAX_SAMPLE_LEN, self.sample_len
                )));
            }
            if self.sample_freq == 0 {
                return Err(ReadmuxError::InvalidConfig(
                    "sample_freq must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}
