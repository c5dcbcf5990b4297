//! Raw parsing: one bare sequence per line
//!
//! There are no names and no qualities in the input; the name is the decimal
//! read identifier and the quality is all-`I`.

use crate::config::InputConfig;
use crate::error::Result;
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::stream::ByteStream;
use crate::operations::QualityScale;
use crate::types::ReadRecord;

use super::{finish_record, push_base, tabbed, warn_replaced_bases};
use std::fmt::Write;

/// Light-parse: one line per record
pub(crate) fn light_batch(
    stream: &mut ByteStream,
    batch: &mut ReadBatch,
    mate: Mate,
    start: usize,
    max: usize,
) -> Result<(bool, usize)> {
    tabbed::light_batch(stream, batch, mate, start, max)
}

/// Full-parse the record (and its mate, when present) under `rdid`
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
    if raw.is_empty() {
        return false;
    }

    record.id.clear();
    let _ = write!(record.id, "{}", rdid);

    record.sequence.clear();
    let mut replaced = false;
    for &c in raw {
        if !c.is_ascii_whitespace() {
            replaced |= push_base(&mut record.sequence, c);
        }
    }
    if replaced {
        warn_replaced_bases(&record.id);
    }

    finish_record(record, config, QualityScale::Phred33, None, rdid)
}
