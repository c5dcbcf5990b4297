//! Composers: synchronized batch dispensers over one or two source lists
//!
//! A composer binds the sources of one invocation into a single object that
//! worker threads pull batches from. The Solo variant covers everything that
//! self-synchronizes (single-end files, interleaved files, in-memory reads):
//! each source takes its own lock. The Dual variant covers paired mates in
//! parallel files: one composer-level lock spans the mate-1 and mate-2 calls
//! so the two files advance in lock-step.
//!
//! Both variants hand out gap-free, monotonically increasing 64-bit read
//! identifiers from a shared atomic counter; the identifier range of a batch
//! is installed into the buffer before it is returned.

use crate::config::{Format, InputConfig};
use crate::error::{ReadmuxError, Result};
use crate::io::buffer::{Mate, ReadBatch};
use crate::io::formats;
use crate::io::source::{FileSource, Source, VectorSource};
use crate::types::ReadRecord;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Input file lists, as collected by the CLI layer
///
/// Quality-side file lists are accepted for interface compatibility but no
/// supported format keeps qualities in parallel files; the factory rejects
/// them when non-empty.
#[derive(Debug, Default, Clone)]
pub struct InputFiles {
    /// Unpaired input files
    pub singles: Vec<PathBuf>,
    /// Mate-1 files, parallel to `mates2`
    pub mates1: Vec<PathBuf>,
    /// Mate-2 files, parallel to `mates1`
    pub mates2: Vec<PathBuf>,
    /// Files with both mates interleaved in one stream
    pub interleaved: Vec<PathBuf>,
    /// Quality files for `singles` (unsupported)
    pub qual_singles: Vec<PathBuf>,
    /// Quality files for `mates1` (unsupported)
    pub qual_mates1: Vec<PathBuf>,
    /// Quality files for `mates2` (unsupported)
    pub qual_mates2: Vec<PathBuf>,
}

/// A synchronized dispenser of read batches
pub enum Composer {
    /// Single source list; each source synchronizes itself
    Solo(SoloComposer),
    /// Two parallel source lists advancing in lock-step
    Dual(DualComposer),
}

impl Composer {
    /// Build a composer from the user's file lists
    ///
    /// Rules:
    /// - both mate lists non-empty: Dual composer over per-file source
    ///   pairs, with any `singles` appended as unpaired sources;
    /// - an interleaved list: Solo composer whose sources emit pairs from
    ///   single files, with any `singles` appended;
    /// - otherwise: Solo composer over the singles.
    pub fn from_inputs(files: &InputFiles, config: Arc<InputConfig>) -> Result<Self> {
        config.validate()?;
        if !files.qual_singles.is_empty()
            || !files.qual_mates1.is_empty()
            || !files.qual_mates2.is_empty()
        {
            return Err(ReadmuxError::UnsupportedLayout(
                "quality-side files are not supported by any input format".to_string(),
            ));
        }

        if !files.mates1.is_empty() || !files.mates2.is_empty() {
            if files.mates1.len() != files.mates2.len() {
                return Err(ReadmuxError::InvalidConfig(format!(
                    "{} mate-1 file(s) but {} mate-2 file(s)",
                    files.mates1.len(),
                    files.mates2.len()
                )));
            }
            if !files.interleaved.is_empty() {
                return Err(ReadmuxError::UnsupportedLayout(
                    "interleaved files cannot be combined with parallel mate files"
                        .to_string(),
                ));
            }
            let mut pairs = Vec::with_capacity(files.mates1.len() + 1);
            for (p1, p2) in files.mates1.iter().zip(files.mates2.iter()) {
                pairs.push((
                    Source::File(FileSource::new(
                        vec![p1.clone()],
                        Arc::clone(&config),
                        false,
                    )),
                    Some(Source::File(FileSource::new(
                        vec![p2.clone()],
                        Arc::clone(&config),
                        false,
                    ))),
                ));
            }
            for source in group_sources(&files.singles, &config, false) {
                pairs.push((source, None));
            }
            return Ok(Composer::Dual(DualComposer::new(pairs, config)));
        }

        if !files.interleaved.is_empty() {
            let mut sources = group_sources(&files.interleaved, &config, true);
            sources.extend(group_sources(&files.singles, &config, false));
            return Ok(Composer::Solo(SoloComposer::new(sources, config)));
        }

        if files.singles.is_empty() {
            return Err(ReadmuxError::InvalidConfig(
                "no input files given".to_string(),
            ));
        }
        let sources = group_sources(&files.singles, &config, false);
        Ok(Composer::Solo(SoloComposer::new(sources, config)))
    }

    /// Build a Solo composer over an in-memory list of reads
    ///
    /// Each entry is either a bare sequence or a `name<TAB>seq<TAB>qual`
    /// line; records full-parse through the tab-delimited format.
    pub fn from_reads<I, S>(reads: I, config: Arc<InputConfig>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        config.validate()?;
        let source = Source::Vector(VectorSource::new(reads, &config));
        Ok(Composer::Solo(SoloComposer::new(vec![source], config)))
    }

    /// Fill `batch` with the next batch of light-parsed records
    ///
    /// Returns `(done, count)`; `done` is true when every source has been
    /// drained. The buffer's rdid base is installed before returning.
    pub fn next_batch(&self, batch: &mut ReadBatch) -> Result<(bool, usize)> {
        match self {
            Composer::Solo(solo) => solo.next_batch(batch),
            Composer::Dual(dual) => dual.next_batch(batch),
        }
    }

    /// Full-parse one record pair; runs outside every lock
    pub fn parse(&self, ra: &mut ReadRecord, rb: &mut ReadRecord, rdid: u64) -> bool {
        let (format, config) = match self {
            Composer::Solo(solo) => (solo.format, &solo.config),
            Composer::Dual(dual) => (dual.format, &dual.config),
        };
        formats::parse_record(format, config, ra, rb, rdid)
    }

    /// Rewind every source and the identifier counter; master-thread only
    pub fn reset(&self) {
        match self {
            Composer::Solo(solo) => solo.reset(),
            Composer::Dual(dual) => dual.reset(),
        }
    }

    /// Total records light-parsed across all sources
    pub fn read_count(&self) -> u64 {
        match self {
            Composer::Solo(solo) => solo.read_count(),
            Composer::Dual(dual) => dual.read_count(),
        }
    }

    /// The configuration this composer was built with
    pub fn config(&self) -> &Arc<InputConfig> {
        match self {
            Composer::Solo(solo) => &solo.config,
            Composer::Dual(dual) => &dual.config,
        }
    }
}

/// One source per file when `file_parallel` is set, else one source over all
fn group_sources(
    paths: &[PathBuf],
    config: &Arc<InputConfig>,
    interleaved: bool,
) -> Vec<Source> {
    if paths.is_empty() {
        return Vec::new();
    }
    if config.file_parallel {
        paths
            .iter()
            .map(|p| {
                Source::File(FileSource::new(
                    vec![p.clone()],
                    Arc::clone(config),
                    interleaved,
                ))
            })
            .collect()
    } else {
        vec![Source::File(FileSource::new(
            paths.to_vec(),
            Arc::clone(config),
            interleaved,
        ))]
    }
}

/// Solo composer: a list of self-synchronizing sources
pub struct SoloComposer {
    sources: Vec<Mutex<Source>>,
    /// Index of the source currently being drained
    cur: AtomicUsize,
    /// Next read identifier to hand out
    rdid: AtomicU64,
    format: Format,
    config: Arc<InputConfig>,
}

impl SoloComposer {
    fn new(sources: Vec<Source>, config: Arc<InputConfig>) -> Self {
        debug_assert!(!sources.is_empty());
        let format = sources[0].parse_format();
        Self {
            sources: sources.into_iter().map(Mutex::new).collect(),
            cur: AtomicUsize::new(0),
            rdid: AtomicU64::new(0),
            format,
            config,
        }
    }

    fn next_batch(&self, batch: &mut ReadBatch) -> Result<(bool, usize)> {
        loop {
            let cur = self.cur.load(Ordering::Acquire);
            if cur >= self.sources.len() {
                return Ok((true, 0));
            }
            let (done, n) = self.sources[cur]
                .lock()
                .next_batch(batch, Mate::A, &self.rdid)?;
            if done && n == 0 {
                // Source fully drained; move on (racing threads retry).
                let _ = self.cur.compare_exchange(
                    cur,
                    cur + 1,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                continue;
            }
            return Ok((done && cur == self.sources.len() - 1, n));
        }
    }

    fn reset(&self) {
        for source in &self.sources {
            source.lock().reset();
        }
        self.cur.store(0, Ordering::Release);
        self.rdid.store(0, Ordering::Release);
    }

    fn read_count(&self) -> u64 {
        self.sources.iter().map(|s| s.lock().read_count()).sum()
    }
}

/// Dual composer: parallel mate-1/mate-2 source lists in lock-step
///
/// The sources live inside the composer's own mutex, so a single critical
/// section spans both mate calls and the sources themselves need no lock of
/// their own.
pub struct DualComposer {
    inner: Mutex<DualInner>,
    rdid: AtomicU64,
    format: Format,
    config: Arc<InputConfig>,
}

struct DualInner {
    /// Parallel source pairs; `None` mate-2 entries are unpaired sources
    pairs: Vec<(Source, Option<Source>)>,
    /// Index of the pair currently being drained
    cur: usize,
}

impl DualComposer {
    fn new(pairs: Vec<(Source, Option<Source>)>, config: Arc<InputConfig>) -> Self {
        debug_assert!(!pairs.is_empty());
        let format = pairs[0].0.parse_format();
        Self {
            inner: Mutex::new(DualInner { pairs, cur: 0 }),
            rdid: AtomicU64::new(0),
            format,
            config,
        }
    }

    fn next_batch(&self, batch: &mut ReadBatch) -> Result<(bool, usize)> {
        let mut inner = self.inner.lock();
        loop {
            if inner.cur >= inner.pairs.len() {
                return Ok((true, 0));
            }
            let cur = inner.cur;
            let last = cur == inner.pairs.len() - 1;
            let (src_a, src_b) = &mut inner.pairs[cur];

            let (done_a, na) = src_a.next_batch(batch, Mate::A, &self.rdid)?;
            if let Some(src_b) = src_b {
                let (done_b, nb) = src_b.next_batch(batch, Mate::B, &self.rdid)?;
                if na != nb || done_a != done_b {
                    // The mate files disagree; close both and give up on
                    // this pair.
                    src_a.close();
                    src_b.close();
                    return Err(ReadmuxError::PairedEndDesync {
                        mate1: na,
                        mate2: nb,
                    });
                }
            }

            if done_a && na == 0 {
                inner.cur += 1;
                continue;
            }
            return Ok((done_a && last, na));
        }
    }

    fn reset(&self) {
        let mut inner = self.inner.lock();
        for (src_a, src_b) in inner.pairs.iter_mut() {
            src_a.reset();
            if let Some(src_b) = src_b {
                src_b.reset();
            }
        }
        inner.cur = 0;
        self.rdid.store(0, Ordering::Release);
    }

    fn read_count(&self) -> u64 {
        let inner = self.inner.lock();
        inner.pairs.iter().map(|(a, _)| a.read_count()).sum()
    }
}
