//! FASTQ parsing (single-file and interleaved)
//!
//! A record is four newline-terminated lines: `@name`, sequence, `+`
//! (optionally repeating the name), quality. The light-parse delineates
//! records purely by counting lines; everything else happens in the
//! full-parse. With interleaved input, consecutive records land in the
//! mate-1 and mate-2 slots of the same buffer position and the batch count
//! is in pairs.

use crate::config::InputConfig;
use crate::error::Result;
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::stream::ByteStream;
use crate::operations::QualityScale;
use crate::types::ReadRecord;

use super::{finish_record, first_content_byte, push_base, warn_replaced_bases, LightContext};

/// Light-parse FASTQ records into batch slots `start..max`
#[allow(clippy::too_many_arguments)]
pub(crate) fn light_batch(
    stream: &mut ByteStream,
    batch: &mut ReadBatch,
    mate: Mate,
    start: usize,
    max: usize,
    interleaved: bool,
    first: &mut bool,
    ctx: &mut LightContext<'_>,
) -> Result<(bool, usize)> {
    let mut readi = start;
    let mut records = 0usize;
    let mut done = false;

    while readi < max {
        let slot_mate = if interleaved {
            if records % 2 == 0 {
                Mate::A
            } else {
                Mate::B
            }
        } else {
            mate
        };

        let mut c = match first_content_byte(stream)? {
            None => {
                done = true;
                break;
            }
            Some(c) => c,
        };

        if *first && c != b'@' {
            ctx.warn_wrong_format("'@'");
            match skip_to_record_start(stream)? {
                None => {
                    done = true;
                    break;
                }
                Some(at) => c = at,
            }
        }
        *first = false;

        let dst = batch.record_mut(slot_mate, readi);
        dst.reset();
        dst.raw.push(c);

        // Consume the rest of the four-line record.
        let mut newlines = if c == b'\n' { 1 } else { 0 };
        while newlines < 4 {
            match stream.get()? {
                None => {
                    done = true;
                    break;
                }
                Some(ch) => {
                    dst.raw.push(ch);
                    if ch == b'\n' {
                        newlines += 1;
                    }
                }
            }
        }

        if done {
            // Tolerate a final record whose quality line ends at EOF.
            if newlines == 3 && last_line_nonempty(&dst.raw) {
                dst.raw.push(b'\n');
            } else {
                dst.raw.clear();
                break;
            }
        }

        records += 1;
        if interleaved {
            if records % 2 == 0 {
                readi += 1;
            }
        } else {
            readi += 1;
        }
        if done {
            break;
        }
    }

    if interleaved && records % 2 == 1 {
        // EOF split a pair; drop the dangling mate-1 record.
        batch.record_mut(Mate::A, readi).reset();
    }
    Ok((done, readi - start))
}

/// Scan forward to the next `@` at the start of a line
fn skip_to_record_start(stream: &mut ByteStream) -> Result<Option<u8>> {
    let mut at_line_start = false;
    loop {
        match stream.get()? {
            None => return Ok(None),
            Some(b'\n') => at_line_start = true,
            Some(b'@') if at_line_start => return Ok(Some(b'@')),
            Some(_) => at_line_start = false,
        }
    }
}

/// Whether any byte follows the last newline in `raw`
fn last_line_nonempty(raw: &[u8]) -> bool {
    match raw.iter().rposition(|&b| b == b'\n') {
        Some(pos) => pos + 1 < raw.len(),
        None => false,
    }
}

/// Full-parse the pair under `rdid`
pub(crate) fn parse(
    ra: &mut ReadRecord,
    rb: &mut ReadRecord,
    rdid: u64,
    config: &InputConfig,
) -> bool {
    if !parse_one(ra, rdid, config) {
        return false;
    }
    if !rb.is_unfilled() && !parse_one(rb, rdid, config) {
        return false;
    }
    true
}

fn parse_one(record: &mut ReadRecord, rdid: u64, config: &InputConfig) -> bool {
    let raw = std::mem::take(&mut record.raw);
    let ok = parse_raw(record, &raw, rdid, config);
    record.raw = raw;
    ok
}

fn parse_raw(
    record: &mut ReadRecord,
    raw: &[u8],
    rdid: u64,
    config: &InputConfig,
) -> bool {
    let mut i = 0;
    if raw.is_empty() || raw[i] != b'@' {
        return false;
    }
    i += 1;

    // Name line
    while i < raw.len() && raw[i] != b'\n' {
        if raw[i] != b'\r' {
            record.id.push(raw[i] as char);
        }
        i += 1;
    }
    i += 1;

    // Sequence line
    let mut replaced = false;
    while i < raw.len() && raw[i] != b'\n' {
        let c = raw[i];
        if !c.is_ascii_whitespace() {
            replaced |= push_base(&mut record.sequence, c);
        }
        i += 1;
    }
    i += 1;
    if replaced {
        warn_replaced_bases(&record.id);
    }

    // Separator line (may repeat the name)
    if i >= raw.len() || raw[i] != b'+' {
        return false;
    }
    while i < raw.len() && raw[i] != b'\n' {
        i += 1;
    }
    i += 1;

    // Quality line
    let qual_end = raw[i.min(raw.len())..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| i + p)
        .unwrap_or(raw.len());
    let mut qual = &raw[i.min(raw.len())..qual_end];
    if qual.last() == Some(&b'\r') {
        qual = &qual[..qual.len() - 1];
    }

    let scale = QualityScale::from_flags(config.solexa64, config.phred64);
    finish_record(record, config, scale, Some(qual), rdid)
}
