//! Per-thread reader facade
//!
//! Each worker thread owns one [`PerThreadReader`]. The facade pulls batches
//! from the shared composer (the only locking point), then full-parses and
//! finalizes one record pair at a time outside every lock: name fix-up,
//! and optionally presenting mate 2 in the opposite orientation.

use crate::config::InputConfig;
use crate::error::Result;
use crate::io::buffer::ReadBatch;
use crate::io::composer::Composer;
use crate::operations::reverse_complement_inplace;
use crate::types::ReadRecord;
use std::sync::Arc;

/// One thread's interaction with the composer
///
/// Not thread-safe, and does not need to be: there is one per thread. The
/// composer behind it is the shared, synchronized object.
pub struct PerThreadReader<'a> {
    composer: &'a Composer,
    batch: ReadBatch,
    config: Arc<InputConfig>,
    /// Present mate 2 reverse-complemented
    revcomp_mate2: bool,
    /// The batch currently held is the composer's last
    last_batch: bool,
    /// Records in the batch currently held
    last_batch_size: usize,
}

impl<'a> PerThreadReader<'a> {
    /// Create a reader for one worker thread
    ///
    /// `revcomp_mate2` selects whether mate-2 records are flipped to the
    /// opposite orientation before being handed to the consumer.
    pub fn new(composer: &'a Composer, revcomp_mate2: bool) -> Self {
        let config = Arc::clone(composer.config());
        Self {
            composer,
            batch: ReadBatch::new(config.max_buf),
            config,
            revcomp_mate2,
            last_batch: false,
            last_batch_size: 0,
        }
    }

    /// Advance to the next read pair
    ///
    /// Returns `(ok, done)`: `ok` is true when a freshly parsed pair is now
    /// available through [`read_a`](Self::read_a) / [`read_b`](Self::read_b);
    /// `done` is true when this is the final pair (or, with `ok` false, when
    /// the input is exhausted). Unparseable records are warned about and
    /// skipped.
    pub fn next_read_pair(&mut self) -> Result<(bool, bool)> {
        loop {
            if self.batch.exhausted() {
                self.batch.reset();
                let (done, count) = self.composer.next_batch(&mut self.batch)?;
                self.batch.init();
                if done && count == 0 {
                    return Ok((false, true));
                }
                self.last_batch = done;
                self.last_batch_size = count;
            } else {
                self.batch.next();
            }

            let rdid = self.batch.rdid();
            let parsed = {
                let (ra, rb) = self.batch.current_pair_mut();
                self.composer.parse(ra, rb, rdid)
            };
            if !parsed {
                tracing::warn!(rdid, "skipping unparseable read");
                continue;
            }
            self.finalize_pair();

            let is_last = self.batch.cur() + 1 >= self.last_batch_size;
            return Ok((true, is_last && self.last_batch));
        }
    }

    /// The mate-1 record of the current pair
    pub fn read_a(&self) -> &ReadRecord {
        self.batch.read_a()
    }

    /// The mate-2 record of the current pair; unparsed when unpaired
    pub fn read_b(&self) -> &ReadRecord {
        self.batch.read_b()
    }

    /// Whether the current pair has a mate-2 record
    pub fn paired(&self) -> bool {
        self.batch.read_b().parsed
    }

    /// Post-parse fix-ups that depend on pairing
    fn finalize_pair(&mut self) {
        let fix_name = self.config.fix_name;
        let revcomp = self.revcomp_mate2;
        let (ra, rb) = self.batch.current_pair_mut();
        if !rb.parsed {
            return;
        }
        if fix_name {
            strip_mate_suffix(&mut ra.id);
            strip_mate_suffix(&mut rb.id);
        }
        if revcomp {
            reverse_complement_inplace(&mut rb.sequence);
            rb.quality.reverse();
        }
    }
}

/// Remove a trailing `/1` or `/2` mate token from a read name
fn strip_mate_suffix(id: &mut String) {
    if id.ends_with("/1") || id.ends_with("/2") {
        id.truncate(id.len() - 2);
    }
}
