//! FASTA parsing
//!
//! A record is a `>` header line followed by sequence lines; the boundary is
//! a `>` in column 0. Qualities do not exist in FASTA, so the full-parse
//! synthesizes all-`I` (Phred 40) over the sequence length.

use crate::config::InputConfig;
use crate::error::Result;
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::stream::ByteStream;
use crate::operations::QualityScale;
use crate::types::ReadRecord;

use super::{finish_record, first_content_byte, push_base, warn_replaced_bases, LightContext};

/// Light-parse FASTA records into batch slots `start..max`
pub(crate) fn light_batch(
    stream: &mut ByteStream,
    batch: &mut ReadBatch,
    mate: Mate,
    start: usize,
    max: usize,
    first: &mut bool,
    ctx: &mut LightContext<'_>,
) -> Result<(bool, usize)> {
    let mut readi = start;
    let mut done = false;

    while readi < max {
        let c = match first_content_byte(stream)? {
            None => {
                done = true;
                break;
            }
            Some(c) => c,
        };

        if c != b'>' {
            // Stray leading bytes; legal only before the first record.
            if *first {
                ctx.warn_wrong_format("'>'");
            }
            if !scan_to_record_start(stream)? {
                done = true;
                break;
            }
        }
        *first = false;

        let dst = batch.record_mut(mate, readi);
        dst.reset();
        dst.raw.push(b'>');

        let mut at_line_start = false;
        loop {
            match stream.get()? {
                None => {
                    done = true;
                    break;
                }
                Some(b'>') if at_line_start => {
                    stream.unget(b'>');
                    break;
                }
                Some(ch) => {
                    dst.raw.push(ch);
                    at_line_start = ch == b'\n';
                }
            }
        }
        readi += 1;
        if done {
            break;
        }
    }

    Ok((done, readi - start))
}

/// Consume bytes until a `>` in column 0; true when one was found
fn scan_to_record_start(stream: &mut ByteStream) -> Result<bool> {
    let mut at_line_start = false;
    loop {
        match stream.get()? {
            None => return Ok(false),
            Some(b'\n') => at_line_start = true,
            Some(b'>') if at_line_start => return Ok(true),
            Some(_) => at_line_start = false,
        }
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
    if raw.is_empty() || raw[i] != b'>' {
        return false;
    }
    i += 1;

    // Header line: the whole line is the name.
    while i < raw.len() && raw[i] != b'\n' {
        if raw[i] != b'\r' {
            record.id.push(raw[i] as char);
        }
        i += 1;
    }

    // Sequence lines: every non-whitespace byte until the end of the record.
    let mut replaced = false;
    while i < raw.len() {
        let c = raw[i];
        if !c.is_ascii_whitespace() {
            replaced |= push_base(&mut record.sequence, c);
        }
        i += 1;
    }
    if replaced {
        warn_replaced_bases(&record.id);
    }

    finish_record(record, config, QualityScale::Phred33, None, rdid)
}
