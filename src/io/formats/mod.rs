//! Format state machines: light-parse and full-parse per input format
//!
//! Every format implements the same two-phase protocol. The light-parse runs
//! inside the source's critical section and does boundary work only: it
//! carves the raw bytes of each record out of the byte stream into a batch
//! slot. The full-parse runs outside every lock and decodes those bytes into
//! name, sequence, and normalized quality, applying trimming and the quality
//! scale. The raw buffer of the record is the only hand-off between the two
//! phases.

pub(crate) mod fasta;
pub(crate) mod fasta_cont;
pub(crate) mod fastq;
pub(crate) mod qseq;
pub(crate) mod raw;
pub(crate) mod tabbed;

use crate::config::{Format, InputConfig};
use crate::error::Result;
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::stream::ByteStream;
use crate::operations::quality::{
    too_few_qualities, too_many_qualities, wrong_quality_format,
};
use crate::operations::sequence::is_iupac;
use crate::operations::{clip_ends, decode_quality, QualityScale};
use crate::types::ReadRecord;
use std::io;

/// Per-file context handed to the light-parse
///
/// Carries what a format needs to report a malformed file exactly once.
pub(crate) struct LightContext<'a> {
    /// Display name of the file being read
    pub path: &'a str,
    /// Whether a format warning was already printed for this file
    pub warned: &'a mut bool,
}

impl LightContext<'_> {
    /// Warn once per file about a wrong leading byte
    pub(crate) fn warn_wrong_format(&mut self, expected: &str) {
        if !*self.warned {
            tracing::warn!(
                file = self.path,
                "file does not begin with {}; skipping malformed leading bytes",
                expected
            );
            *self.warned = true;
        }
    }
}

/// Per-source light-parse state, one variant per format
pub(crate) enum FormatState {
    Fasta { first: bool },
    Fastq { first: bool, interleaved: bool },
    Tabbed,
    Qseq,
    Raw,
    FastaCont(fasta_cont::WindowState),
}

impl FormatState {
    pub(crate) fn new(format: Format, interleaved: bool, config: &InputConfig) -> Self {
        match format {
            Format::Fasta => FormatState::Fasta { first: true },
            Format::Fastq => FormatState::Fastq {
                first: true,
                interleaved,
            },
            Format::Tabbed => FormatState::Tabbed,
            Format::Qseq => FormatState::Qseq,
            Format::Raw => FormatState::Raw,
            Format::FastaContinuous => {
                FormatState::FastaCont(fasta_cont::WindowState::new(config))
            }
        }
    }

    /// Reset the per-file portion of the state when a new file is opened
    pub(crate) fn reset_for_next_file(&mut self) {
        match self {
            FormatState::Fasta { first } => *first = true,
            FormatState::Fastq { first, .. } => *first = true,
            FormatState::FastaCont(window) => window.reset_for_next_file(),
            FormatState::Tabbed | FormatState::Qseq | FormatState::Raw => {}
        }
    }

    /// Light-parse records from `stream` into batch slots `start..max`
    ///
    /// Returns `(file_done, records_added)`, where `records_added` counts
    /// record pairs for interleaved input.
    pub(crate) fn light_batch(
        &mut self,
        stream: &mut ByteStream,
        batch: &mut ReadBatch,
        mate: Mate,
        start: usize,
        max: usize,
        ctx: &mut LightContext<'_>,
    ) -> Result<(bool, usize)> {
        match self {
            FormatState::Fasta { first } => {
                fasta::light_batch(stream, batch, mate, start, max, first, ctx)
            }
            FormatState::Fastq { first, interleaved } => fastq::light_batch(
                stream,
                batch,
                mate,
                start,
                max,
                *interleaved,
                first,
                ctx,
            ),
            FormatState::Tabbed => tabbed::light_batch(stream, batch, mate, start, max),
            FormatState::Qseq => qseq::light_batch(stream, batch, mate, start, max),
            FormatState::Raw => raw::light_batch(stream, batch, mate, start, max),
            FormatState::FastaCont(window) => {
                window.light_batch(stream, batch, mate, start, max)
            }
        }
    }
}

/// Full-parse dispatch
///
/// Decodes the raw bytes of the pair under `rdid` into structured fields.
/// Returns false when the record (or its mate) cannot be parsed; the caller
/// skips the slot and continues.
pub(crate) fn parse_record(
    format: Format,
    config: &InputConfig,
    ra: &mut ReadRecord,
    rb: &mut ReadRecord,
    rdid: u64,
) -> bool {
    match format {
        Format::Fasta => fasta::parse(ra, rb, rdid, config),
        Format::Fastq => fastq::parse(ra, rb, rdid, config),
        Format::Tabbed => tabbed::parse(ra, rb, rdid, config),
        Format::Qseq => qseq::parse(ra, rb, rdid, config),
        Format::Raw => raw::parse(ra, rb, rdid, config),
        Format::FastaContinuous => fasta_cont::parse(ra, rb, rdid, config),
    }
}

// ---------------------------------------------------------------------------
// Shared light-parse helpers
// ---------------------------------------------------------------------------

/// Next byte that is not a line terminator, or `None` at EOF
pub(crate) fn first_content_byte(stream: &mut ByteStream) -> io::Result<Option<u8>> {
    loop {
        match stream.get()? {
            None => return Ok(None),
            Some(b'\n') | Some(b'\r') => continue,
            Some(c) => return Ok(Some(c)),
        }
    }
}

/// Capture one line (newline excluded, trailing `\r` stripped) into `dst`
///
/// Leading blank lines are skipped. Returns `(eof, got_content)`.
pub(crate) fn capture_line(
    stream: &mut ByteStream,
    dst: &mut Vec<u8>,
) -> io::Result<(bool, bool)> {
    let first = match first_content_byte(stream)? {
        None => return Ok((true, false)),
        Some(c) => c,
    };
    dst.push(first);
    loop {
        match stream.get()? {
            None => return Ok((true, true)),
            Some(b'\n') => break,
            Some(c) => dst.push(c),
        }
    }
    if dst.last() == Some(&b'\r') {
        dst.pop();
    }
    Ok((false, true))
}

/// Append a decimal integer without allocating
pub(crate) fn push_u64(dst: &mut Vec<u8>, mut value: u64) {
    let mut tmp = [0u8; 20];
    let mut i = tmp.len();
    loop {
        i -= 1;
        tmp[i] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    dst.extend_from_slice(&tmp[i..]);
}

// ---------------------------------------------------------------------------
// Shared full-parse helpers
// ---------------------------------------------------------------------------

/// Append one validated base; non-IUPAC bytes become `N`
///
/// Returns true when the byte had to be replaced.
#[inline]
pub(crate) fn push_base(seq: &mut Vec<u8>, c: u8) -> bool {
    if is_iupac(c) {
        seq.push(c.to_ascii_uppercase());
        false
    } else {
        seq.push(b'N');
        true
    }
}

/// Warn about bases replaced during validation
pub(crate) fn warn_replaced_bases(id: &str) {
    tracing::warn!(read = id, "replaced non-IUPAC characters with N");
}

/// Shared tail of every full-parse: qualities, trimming, flags
///
/// `qual_raw` is the undecoded quality field, or `None` for formats that
/// synthesize all-`I` qualities. The sequence must already be in place.
/// Fails on an empty sequence, an undecodable quality, or a quality/sequence
/// length mismatch; trimming to zero length is not a failure.
pub(crate) fn finish_record(
    record: &mut ReadRecord,
    config: &InputConfig,
    scale: QualityScale,
    qual_raw: Option<&[u8]>,
    rdid: u64,
) -> bool {
    if record.sequence.is_empty() {
        return false;
    }
    match qual_raw {
        None => {
            record.quality.clear();
            record.quality.resize(record.sequence.len(), b'I');
        }
        Some(bytes) => match decode_quality(bytes, scale, config.int_quals) {
            None => {
                wrong_quality_format(&record.id);
                return false;
            }
            Some(decoded) => {
                if decoded.len() < record.sequence.len() {
                    too_few_qualities(&record.id);
                    return false;
                }
                if decoded.len() > record.sequence.len() {
                    too_many_qualities(&record.id);
                    return false;
                }
                record.quality = decoded;
            }
        },
    }
    clip_ends(
        &mut record.sequence,
        &mut record.quality,
        config.trim5,
        config.trim3,
    );
    record.rdid = rdid;
    record.parsed = true;
    true
}
