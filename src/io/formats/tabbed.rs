//! Tab-delimited parsing (tab5 / tab6)
//!
//! One record per line. Field layouts:
//!
//! - 3 fields: `name  seq  qual` (unpaired)
//! - 5 fields: `name  seq1  qual1  seq2  qual2` (paired, shared name)
//! - 6 fields: `name1  seq1  qual1  name2  seq2  qual2` (paired,
//!   selected by the `second_name` flag)
//!
//! The line-capture light-parse here is shared with the Qseq format, which
//! is also one record per line.

use crate::config::InputConfig;
use crate::error::Result;
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::stream::ByteStream;
use crate::operations::QualityScale;
use crate::types::ReadRecord;

use super::{capture_line, finish_record, push_base, warn_replaced_bases};

/// Light-parse line-per-record input into batch slots `start..max`
pub(crate) fn light_batch(
    stream: &mut ByteStream,
    batch: &mut ReadBatch,
    mate: Mate,
    start: usize,
    max: usize,
) -> Result<(bool, usize)> {
    let mut readi = start;
    let mut done = false;

    while readi < max {
        let dst = batch.record_mut(mate, readi);
        dst.reset();
        let (eof, got) = capture_line(stream, &mut dst.raw)?;
        if got {
            readi += 1;
        }
        if eof {
            done = true;
            break;
        }
    }

    Ok((done, readi - start))
}

/// Full-parse the record under `rdid`, splitting both mates out of `ra.raw`
pub(crate) fn parse(
    ra: &mut ReadRecord,
    rb: &mut ReadRecord,
    rdid: u64,
    config: &InputConfig,
) -> bool {
    let raw = std::mem::take(&mut ra.raw);
    let ok = parse_raw(ra, rb, &raw, rdid, config);
    ra.raw = raw;
    ok
}

fn parse_raw(
    ra: &mut ReadRecord,
    rb: &mut ReadRecord,
    raw: &[u8],
    rdid: u64,
    config: &InputConfig,
) -> bool {
    if raw.is_empty() {
        return false;
    }
    let fields: Vec<&[u8]> = raw.split(|&b| b == b'\t').collect();
    let scale = QualityScale::from_flags(config.solexa64, config.phred64);

    if config.second_name {
        if fields.len() != 6 {
            return false;
        }
        fill_mate(ra, fields[0], fields[1], fields[2], scale, rdid, config)
            && fill_mate(rb, fields[3], fields[4], fields[5], scale, rdid, config)
    } else {
        match fields.len() {
            3 => fill_mate(ra, fields[0], fields[1], fields[2], scale, rdid, config),
            5 => {
                fill_mate(ra, fields[0], fields[1], fields[2], scale, rdid, config)
                    && fill_mate(rb, fields[0], fields[3], fields[4], scale, rdid, config)
            }
            _ => false,
        }
    }
}

/// Populate one mate from name/sequence/quality fields
fn fill_mate(
    record: &mut ReadRecord,
    name: &[u8],
    seq: &[u8],
    qual: &[u8],
    scale: QualityScale,
    rdid: u64,
    config: &InputConfig,
) -> bool {
    record.id.clear();
    record
        .id
        .push_str(&String::from_utf8_lossy(name));
    record.sequence.clear();
    let mut replaced = false;
    for &c in seq {
        if !c.is_ascii_whitespace() {
            replaced |= push_base(&mut record.sequence, c);
        }
    }
    if replaced {
        warn_replaced_bases(&record.id);
    }
    finish_record(record, config, scale, Some(qual), rdid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream_of(data: &[u8]) -> ByteStream {
        ByteStream::from_reader(Box::new(Cursor::new(data.to_vec())))
    }

    fn parse_line(
        raw: &[u8],
        config: &InputConfig,
    ) -> (ReadRecord, ReadRecord, bool) {
        let mut ra = ReadRecord::default();
        let mut rb = ReadRecord::default();
        ra.raw = raw.to_vec();
        let ok = parse(&mut ra, &mut rb, 3, config);
        (ra, rb, ok)
    }

    #[test]
    fn test_light_one_line_per_record() {
        let mut stream = stream_of(b"a\tAC\tII\nb\tGT\tII\n");
        let mut batch = ReadBatch::new(4);
        batch.reset();
        let (done, n) = light_batch(&mut stream, &mut batch, Mate::A, 0, 4).unwrap();
        assert!(done);
        assert_eq!(n, 2);
        assert_eq!(batch.record_mut(Mate::A, 0).raw, b"a\tAC\tII");
        assert_eq!(batch.record_mut(Mate::A, 1).raw, b"b\tGT\tII");
    }

    #[test]
    fn test_three_field_single() {
        let (ra, rb, ok) = parse_line(b"n\tACGT\tIIII", &InputConfig::default());
        assert!(ok);
        assert_eq!(ra.id, "n");
        assert_eq!(ra.sequence, b"ACGT");
        assert!(!rb.parsed);
        assert!(rb.sequence.is_empty());
    }

    #[test]
    fn test_five_field_pair_shares_name() {
        let (ra, rb, ok) =
            parse_line(b"n\tAAA\t!!!\tTTT\t###", &InputConfig::default());
        assert!(ok);
        assert_eq!(ra.id, "n");
        assert_eq!(rb.id, "n");
        assert_eq!(ra.sequence, b"AAA");
        assert_eq!(rb.sequence, b"TTT");
        assert_eq!(rb.quality, b"###");
        assert_eq!(rb.rdid, 3);
    }

    #[test]
    fn test_six_field_pair() {
        let config = InputConfig {
            second_name: true,
            ..InputConfig::default()
        };
        let (ra, rb, ok) =
            parse_line(b"n1\tAAA\t!!!\tn2\tTTT\t###", &config);
        assert!(ok);
        assert_eq!(ra.id, "n1");
        assert_eq!(ra.sequence, b"AAA");
        assert_eq!(ra.quality, b"!!!");
        assert_eq!(rb.id, "n2");
        assert_eq!(rb.sequence, b"TTT");
        assert_eq!(rb.quality, b"###");
    }

    #[test]
    fn test_wrong_field_count_fails() {
        let (_, _, ok) = parse_line(b"n\tACGT", &InputConfig::default());
        assert!(!ok);
        let config = InputConfig {
            second_name: true,
            ..InputConfig::default()
        };
        let mut ra = ReadRecord::default();
        let mut rb = ReadRecord::default();
        ra.raw = b"n\tAAA\tIII\tTTT\tIII".to_vec();
        assert!(!parse(&mut ra, &mut rb, 0, &config));
    }

    #[test]
    fn test_quality_mismatch_fails() {
        let (_, _, ok) = parse_line(b"n\tACGT\tII", &InputConfig::default());
        assert!(!ok);
    }
}
