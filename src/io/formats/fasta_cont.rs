//! FASTA-continuous parsing: fixed-length windows over long sequences
//!
//! Slides a window of `sample_len` bases over the concatenation of FASTA
//! sequences, emitting a read whenever a full window starts at a multiple of
//! `sample_freq` within the current record. Windows never span records and
//! never contain an ambiguous base: both a record switch and an ambiguous
//! base force the window to refill completely before emission resumes.
//!
//! The light-parse hands off `name_offset<TAB>window` raw bytes, so the
//! full-parse is a tab split with synthesized qualities.

use crate::config::{InputConfig, MAX_SAMPLE_LEN};
use crate::error::Result;
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::stream::ByteStream;
use crate::operations::QualityScale;
use crate::types::ReadRecord;

use super::{finish_record, push_base, push_u64};

/// Sliding-window state for one FASTA-continuous source
pub(crate) struct WindowState {
    /// Window length (`sample_len`), at most [`MAX_SAMPLE_LEN`]
    length: usize,
    /// Stride between emitted window starts (`sample_freq`)
    freq: u64,
    /// Circular window over the last `length` unambiguous bases
    window: Box<[u8; MAX_SAMPLE_LEN]>,
    /// Insertion point into `window`
    buf_cur: usize,
    /// Bases still to consume before the window is full again
    eat: usize,
    /// Bases consumed across all records of all files
    cur: u64,
    /// Value of `cur` when the current record started
    last: u64,
    /// Name of the current record, up to the first whitespace
    name_prefix: Vec<u8>,
}

impl WindowState {
    pub(crate) fn new(config: &InputConfig) -> Self {
        debug_assert!(config.sample_len >= 1 && config.sample_len <= MAX_SAMPLE_LEN);
        debug_assert!(config.sample_freq >= 1);
        Self {
            length: config.sample_len,
            freq: config.sample_freq as u64,
            window: Box::new([0u8; MAX_SAMPLE_LEN]),
            buf_cur: 0,
            eat: config.sample_len - 1,
            cur: 0,
            last: 0,
            name_prefix: Vec::new(),
        }
    }

    /// Reset per-file state; the global base counter keeps running
    pub(crate) fn reset_for_next_file(&mut self) {
        self.eat = self.length - 1;
        self.name_prefix.clear();
        self.buf_cur = 0;
        self.last = self.cur;
    }

    /// Light-parse sampled windows into batch slots `start..max`
    pub(crate) fn light_batch(
        &mut self,
        stream: &mut ByteStream,
        batch: &mut ReadBatch,
        mate: Mate,
        start: usize,
        max: usize,
    ) -> Result<(bool, usize)> {
        let mut readi = start;
        let mut done = false;

        while readi < max {
            let c = match stream.get()? {
                None => {
                    done = true;
                    break;
                }
                Some(c) => c,
            };

            if c == b'>' {
                self.enter_record(stream)?;
                continue;
            }
            if c.is_ascii_whitespace() {
                continue;
            }

            self.cur += 1;
            if !matches!(c.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T') {
                // Windows overlapping an ambiguous base are skipped: the
                // window must refill completely past it.
                self.eat = self.length - 1;
                continue;
            }

            self.window[self.buf_cur] = c.to_ascii_uppercase();
            self.buf_cur = (self.buf_cur + 1) % self.length;

            if self.eat > 0 {
                self.eat -= 1;
                continue;
            }

            let consumed = self.cur - self.last;
            debug_assert!(consumed >= self.length as u64);
            let window_start = consumed - self.length as u64;
            if window_start % self.freq == 0 {
                let dst = batch.record_mut(mate, readi);
                dst.reset();
                dst.raw.extend_from_slice(&self.name_prefix);
                dst.raw.push(b'_');
                push_u64(&mut dst.raw, window_start);
                dst.raw.push(b'\t');
                for k in 0..self.length {
                    dst.raw.push(self.window[(self.buf_cur + k) % self.length]);
                }
                readi += 1;
            }
        }

        Ok((done, readi - start))
    }

    /// Consume a `>` header line: capture the pre-whitespace name and rewind
    /// the window for a fresh record
    fn enter_record(&mut self, stream: &mut ByteStream) -> Result<()> {
        self.name_prefix.clear();
        let mut saw_space = false;
        loop {
            match stream.get()? {
                None | Some(b'\n') => break,
                Some(b'\r') => continue,
                Some(c) => {
                    if c.is_ascii_whitespace() {
                        saw_space = true;
                    } else if !saw_space {
                        self.name_prefix.push(c);
                    }
                }
            }
        }
        self.eat = self.length - 1;
        self.last = self.cur;
        Ok(())
    }
}

/// Full-parse the sampled window under `rdid`
pub(crate) fn parse(
    ra: &mut ReadRecord,
    _rb: &mut ReadRecord,
    rdid: u64,
    config: &InputConfig,
) -> bool {
    let raw = std::mem::take(&mut ra.raw);
    let ok = parse_raw(ra, &raw, rdid, config);
    ra.raw = raw;
    ok
}

fn parse_raw(
    record: &mut ReadRecord,
    raw: &[u8],
    rdid: u64,
    config: &InputConfig,
) -> bool {
    let tab = match raw.iter().position(|&b| b == b'\t') {
        None => return false,
        Some(p) => p,
    };
    record.id.clear();
    record.id.push_str(&String::from_utf8_lossy(&raw[..tab]));
    record.sequence.clear();
    for &c in &raw[tab + 1..] {
        push_base(&mut record.sequence, c);
    }
    finish_record(record, config, QualityScale::Phred33, None, rdid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream_of(data: &[u8]) -> ByteStream {
        ByteStream::from_reader(Box::new(Cursor::new(data.to_vec())))
    }

    fn sample(data: &[u8], len: usize, freq: usize) -> Vec<(String, String)> {
        let config = InputConfig {
            sample_len: len,
            sample_freq: freq,
            ..InputConfig::default()
        };
        let mut state = WindowState::new(&config);
        let mut stream = stream_of(data);
        let mut batch = ReadBatch::new(64);
        batch.reset();
        let (done, n) = state
            .light_batch(&mut stream, &mut batch, Mate::A, 0, 64)
            .unwrap();
        assert!(done);
        (0..n)
            .map(|i| {
                let raw = batch.record_mut(Mate::A, i).raw.clone();
                let mut ra = ReadRecord::default();
                let mut rb = ReadRecord::default();
                ra.raw = raw;
                assert!(parse(&mut ra, &mut rb, i as u64, &config));
                (
                    ra.id.clone(),
                    String::from_utf8(ra.sequence.clone()).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_window_stride_two() {
        let out = sample(b">s\nACGTACGT\n", 3, 2);
        assert_eq!(
            out,
            vec![
                ("s_0".to_string(), "ACG".to_string()),
                ("s_2".to_string(), "GTA".to_string()),
                ("s_4".to_string(), "ACG".to_string()),
            ]
        );
    }

    #[test]
    fn test_window_stride_one() {
        let out = sample(b">s\nACGTA\n", 4, 1);
        assert_eq!(
            out,
            vec![
                ("s_0".to_string(), "ACGT".to_string()),
                ("s_1".to_string(), "CGTA".to_string()),
            ]
        );
    }

    #[test]
    fn test_windows_never_contain_n() {
        let out = sample(b">s\nACGTNACGTACGT\n", 3, 1);
        for (_, seq) in &out {
            assert!(!seq.contains('N'), "window {} contains N", seq);
        }
        // The window at offset 2 would overlap the N at position 4, so
        // emission resumes at offset 5.
        let offsets: Vec<&str> = out.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(
            offsets,
            vec!["s_0", "s_1", "s_5", "s_6", "s_7", "s_8", "s_9", "s_10"]
        );
    }

    #[test]
    fn test_windows_do_not_span_records() {
        let out = sample(b">a\nACGT\n>b\nTTTT\n", 3, 1);
        assert_eq!(
            out,
            vec![
                ("a_0".to_string(), "ACG".to_string()),
                ("a_1".to_string(), "CGT".to_string()),
                ("b_0".to_string(), "TTT".to_string()),
                ("b_1".to_string(), "TTT".to_string()),
            ]
        );
    }

    #[test]
    fn test_record_shorter_than_window_emits_nothing() {
        let out = sample(b">tiny\nAC\n", 3, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_multiline_record_is_continuous() {
        let out = sample(b">s\nAC\nGT\n", 4, 1);
        assert_eq!(out, vec![("s_0".to_string(), "ACGT".to_string())]);
    }

    #[test]
    fn test_name_stops_at_whitespace() {
        let out = sample(b">chr1 human chromosome 1\nACGT\n", 4, 1);
        assert_eq!(out[0].0, "chr1_0");
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        /// Consecutive window starts within one record differ by the stride
        #[test]
        fn test_stride_property(
            seq in "[ACGT]{20,120}",
            len in 2usize..8,
            freq in 1usize..5,
        ) {
            let text = format!(">s\n{}\n", seq);
            let out = sample(text.as_bytes(), len, freq);
            let offsets: Vec<u64> = out
                .iter()
                .map(|(id, _)| id.trim_start_matches("s_").parse().unwrap())
                .collect();
            for pair in offsets.windows(2) {
                prop_assert_eq!(pair[1] - pair[0], freq as u64);
            }
            // Each window matches the source at its offset.
            for (id, win) in &out {
                let off: usize = id.trim_start_matches("s_").parse().unwrap();
                prop_assert_eq!(win.as_bytes(), &seq.as_bytes()[off..off + len]);
            }
        }
    }
}
