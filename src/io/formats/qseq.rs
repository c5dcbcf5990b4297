//! Illumina Qseq parsing
//!
//! Eleven tab-separated fields per line: machine, run, lane, tile, x, y,
//! index, read number, sequence, quality, filter. The name is synthesized by
//! joining the first six fields with `_`; the filter column is reflected
//! into the record's `filtered` flag without suppressing emission.
//! Qualities default to Phred-64 for this format.

use crate::config::InputConfig;
use crate::error::Result;
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::stream::ByteStream;
use crate::operations::QualityScale;
use crate::types::ReadRecord;

use super::{finish_record, push_base, tabbed, warn_replaced_bases};

/// Light-parse: one line per record, shared with the tab-delimited format
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
    let fields: Vec<&[u8]> = raw.split(|&b| b == b'\t').collect();
    if fields.len() != 11 {
        return false;
    }

    // machine_run_lane_tile_x_y
    record.id.clear();
    for (i, field) in fields[..6].iter().enumerate() {
        if i > 0 {
            record.id.push('_');
        }
        record.id.push_str(&String::from_utf8_lossy(field));
    }

    record.sequence.clear();
    let mut replaced = false;
    for &c in fields[8] {
        if c == b'.' {
            // Qseq writes unknown bases as dots.
            record.sequence.push(b'N');
        } else if !c.is_ascii_whitespace() {
            replaced |= push_base(&mut record.sequence, c);
        }
    }
    if replaced {
        warn_replaced_bases(&record.id);
    }

    let scale = if config.solexa64 {
        QualityScale::Solexa64
    } else {
        QualityScale::Phred64
    };
    if !finish_record(record, config, scale, Some(fields[9]), rdid) {
        return false;
    }

    record.filtered = fields[10] == b"0";
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qseq_line(seq: &str, qual: &str, filter: &str) -> Vec<u8> {
        format!(
            "M1\t42\t3\t77\t100\t200\t0\t1\t{}\t{}\t{}",
            seq, qual, filter
        )
        .into_bytes()
    }

    fn parse_line(raw: &[u8], config: &InputConfig) -> (ReadRecord, bool) {
        let mut ra = ReadRecord::default();
        let mut rb = ReadRecord::default();
        ra.raw = raw.to_vec();
        let ok = parse(&mut ra, &mut rb, 5, config);
        (ra, ok)
    }

    #[test]
    fn test_name_synthesis() {
        let (ra, ok) = parse_line(&qseq_line("ACGT", "hhhh", "1"), &InputConfig::default());
        assert!(ok);
        assert_eq!(ra.id, "M1_42_3_77_100_200");
        assert_eq!(ra.rdid, 5);
    }

    #[test]
    fn test_phred64_default() {
        let (ra, ok) = parse_line(&qseq_line("ACGT", "hhhh", "1"), &InputConfig::default());
        assert!(ok);
        assert_eq!(ra.quality, b"IIII");
    }

    #[test]
    fn test_filter_flag_reflected_not_suppressed() {
        let (ra, ok) = parse_line(&qseq_line("ACGT", "hhhh", "0"), &InputConfig::default());
        assert!(ok);
        assert!(ra.filtered);
        assert!(ra.parsed);

        let (ra, _) = parse_line(&qseq_line("ACGT", "hhhh", "1"), &InputConfig::default());
        assert!(!ra.filtered);
    }

    #[test]
    fn test_dots_become_n() {
        let (ra, ok) = parse_line(&qseq_line("AC.T", "hhhh", "1"), &InputConfig::default());
        assert!(ok);
        assert_eq!(ra.sequence, b"ACNT");
    }

    #[test]
    fn test_wrong_field_count_fails() {
        let (_, ok) = parse_line(b"M1\t42\tACGT\thhhh\t1", &InputConfig::default());
        assert!(!ok);
    }

    #[test]
    fn test_quality_length_mismatch_fails() {
        let (_, ok) = parse_line(&qseq_line("ACGT", "hh", "1"), &InputConfig::default());
        assert!(!ok);
    }
}
