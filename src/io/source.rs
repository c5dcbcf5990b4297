//! Read sources: file-backed and in-memory
//!
//! A source owns an ordered list of input files (or an in-memory list of
//! reads), rotates to the next file on EOF, and light-parses batches into a
//! caller's buffer. All of `next_batch` runs inside the caller-side lock
//! that wraps the source, so the source itself holds no lock; composers
//! decide the locking granularity (per-source for Solo, one lock spanning a
//! mate pair for Dual).

use crate::config::{Format, InputConfig};
use crate::error::Result;
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::formats::{FormatState, LightContext};
use crate::io::stream::ByteStream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A source of reads, polymorphic over where the bytes come from
pub(crate) enum Source {
    File(FileSource),
    Vector(VectorSource),
}

impl Source {
    /// Light-parse the next batch into `batch`
    ///
    /// Returns `(done, count)`: `done` is true once this source has nothing
    /// further to dispense, `count` is the number of records (pairs, for
    /// interleaved input) written this call. When `mate` is `A`, assigns the
    /// batch's base read identifier from `rdid_counter`.
    pub(crate) fn next_batch(
        &mut self,
        batch: &mut ReadBatch,
        mate: Mate,
        rdid_counter: &AtomicU64,
    ) -> Result<(bool, usize)> {
        match self {
            Source::File(src) => src.next_batch(batch, mate, rdid_counter),
            Source::Vector(src) => src.next_batch(batch, mate, rdid_counter),
        }
    }

    /// Rewind to the very first record; master-thread only
    pub(crate) fn reset(&mut self) {
        match self {
            Source::File(src) => src.reset(),
            Source::Vector(src) => src.reset(),
        }
    }

    /// Records light-parsed (and not skipped) by this source so far
    pub(crate) fn read_count(&self) -> u64 {
        match self {
            Source::File(src) => src.read_cnt,
            Source::Vector(src) => src.read_cnt,
        }
    }

    /// Format used to full-parse records this source produced
    pub(crate) fn parse_format(&self) -> Format {
        match self {
            Source::File(src) => src.config.format,
            Source::Vector(_) => Format::Tabbed,
        }
    }

    /// Drop the open file handle, if any
    pub(crate) fn close(&mut self) {
        if let Source::File(src) = self {
            src.stream = None;
        }
    }
}

/// A synchronized source over an ordered list of input files
pub(crate) struct FileSource {
    config: Arc<InputConfig>,
    /// Input file paths, drained in order
    paths: Vec<PathBuf>,
    /// Index of the next file to open
    filecur: usize,
    /// Index of the currently open file
    open_idx: usize,
    /// Open byte stream, or `None` between files
    stream: Option<ByteStream>,
    /// Per-file flag: an error or format warning was already printed
    errs: Vec<bool>,
    /// Records still to discard from the start of the input
    skip: u64,
    /// Records light-parsed so far, skip excluded
    read_cnt: u64,
    /// Per-format light-parse state
    state: FormatState,
}

impl FileSource {
    pub(crate) fn new(
        paths: Vec<PathBuf>,
        config: Arc<InputConfig>,
        interleaved: bool,
    ) -> Self {
        debug_assert!(!paths.is_empty());
        let errs = vec![false; paths.len()];
        let state = FormatState::new(config.format, interleaved, &config);
        let skip = config.skip;
        Self {
            config,
            paths,
            filecur: 0,
            open_idx: 0,
            stream: None,
            errs,
            skip,
            read_cnt: 0,
            state,
        }
    }

    fn next_batch(
        &mut self,
        batch: &mut ReadBatch,
        mate: Mate,
        rdid_counter: &AtomicU64,
    ) -> Result<(bool, usize)> {
        let capacity = batch.capacity();
        let mut done = false;

        // Discard the leading `skip` records before the first real batch.
        while self.skip > 0 && !done {
            if self.stream.is_none() && !self.open_next() {
                done = true;
                break;
            }
            let limit = (self.skip).min(capacity as u64) as usize;
            let (file_done, n) = self.light_into(batch, mate, 0, limit)?;
            for i in 0..n {
                batch.record_mut(Mate::A, i).reset();
                batch.record_mut(Mate::B, i).reset();
            }
            self.skip -= n as u64;
            if file_done {
                self.stream = None;
            }
        }

        let mut readi = 0;
        while !done && readi < capacity {
            if self.stream.is_none() && !self.open_next() {
                done = true;
                break;
            }
            let (file_done, n) = self.light_into(batch, mate, readi, capacity)?;
            readi += n;
            if file_done {
                self.stream = None;
            }
        }

        if mate == Mate::A {
            let base = rdid_counter.fetch_add(readi as u64, Ordering::SeqCst);
            batch.set_rdid_base(base);
        }
        self.read_cnt += readi as u64;
        Ok((done, readi))
    }

    fn light_into(
        &mut self,
        batch: &mut ReadBatch,
        mate: Mate,
        start: usize,
        max: usize,
    ) -> Result<(bool, usize)> {
        let path = self.paths[self.open_idx].display().to_string();
        let mut ctx = LightContext {
            path: &path,
            warned: &mut self.errs[self.open_idx],
        };
        match self.stream.as_mut() {
            Some(stream) => {
                self.state
                    .light_batch(stream, batch, mate, start, max, &mut ctx)
            }
            None => Ok((true, 0)),
        }
    }

    /// Open the next openable file in the list; false when none remain
    ///
    /// An unopenable file is warned about once and skipped.
    fn open_next(&mut self) -> bool {
        while self.filecur < self.paths.len() {
            let idx = self.filecur;
            self.filecur += 1;
            match ByteStream::open(&self.paths[idx]) {
                Ok(stream) => {
                    self.stream = Some(stream);
                    self.open_idx = idx;
                    self.state.reset_for_next_file();
                    return true;
                }
                Err(err) => {
                    if !self.errs[idx] {
                        tracing::warn!(
                            file = %self.paths[idx].display(),
                            error = %err,
                            "could not open input file; skipping"
                        );
                        self.errs[idx] = true;
                    }
                }
            }
        }
        false
    }

    fn reset(&mut self) {
        self.stream = None;
        self.filecur = 0;
        self.open_idx = 0;
        self.skip = self.config.skip;
        self.read_cnt = 0;
        self.state = FormatState::new(
            self.config.format,
            matches!(self.state, FormatState::Fastq { interleaved: true, .. }),
            &self.config,
        );
    }
}

/// A source backed by an in-memory list of reads
///
/// Accepts either bare sequences or pre-formed `name<TAB>seq<TAB>qual`
/// lines; bare sequences get their list index as a name and all-`I`
/// qualities. Records are re-dispensed through the same light/full parse
/// protocol as file sources, with the tab-delimited full-parse.
pub(crate) struct VectorSource {
    lines: Vec<Vec<u8>>,
    /// Index of the first read of the next batch
    cur: usize,
    skip: usize,
    read_cnt: u64,
}

impl VectorSource {
    pub(crate) fn new<I, S>(reads: I, config: &InputConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<Vec<u8>> = reads
            .into_iter()
            .enumerate()
            .map(|(i, read)| {
                let read = read.as_ref();
                if read.contains('\t') {
                    read.as_bytes().to_vec()
                } else {
                    format!("{}\t{}\t{}", i, read, "I".repeat(read.len()))
                        .into_bytes()
                }
            })
            .collect();
        let skip = (config.skip as usize).min(lines.len());
        Self {
            lines,
            cur: skip,
            skip,
            read_cnt: 0,
        }
    }

    fn next_batch(
        &mut self,
        batch: &mut ReadBatch,
        mate: Mate,
        rdid_counter: &AtomicU64,
    ) -> Result<(bool, usize)> {
        let capacity = batch.capacity();
        let mut readi = 0;
        while readi < capacity && self.cur < self.lines.len() {
            let dst = batch.record_mut(mate, readi);
            dst.reset();
            dst.raw.extend_from_slice(&self.lines[self.cur]);
            self.cur += 1;
            readi += 1;
        }
        if mate == Mate::A {
            let base = rdid_counter.fetch_add(readi as u64, Ordering::SeqCst);
            batch.set_rdid_base(base);
        }
        self.read_cnt += readi as u64;
        Ok((self.cur >= self.lines.len(), readi))
    }

    fn reset(&mut self) {
        self.cur = self.skip;
        self.read_cnt = 0;
    }
}
