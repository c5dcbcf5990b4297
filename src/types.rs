//! Common types used throughout readmux

/// A single sequencing read
///
/// The record owns its byte buffers and is reset, not reallocated, between
/// batches. `raw` is the hand-off channel between the two parse phases: the
/// light-parse captures the exact bytes of one record into it inside the
/// critical section, and the full-parse decodes those bytes into `id`,
/// `sequence`, and `quality` outside any lock.
///
/// `quality` is always normalized Phred+33, whatever encoding the input
/// used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadRecord {
    /// Raw record bytes captured by the light-parse
    pub raw: Vec<u8>,
    /// Sequence identifier (without any format prefix)
    pub id: String,
    /// DNA/RNA sequence
    pub sequence: Vec<u8>,
    /// Quality scores, normalized to Phred+33
    pub quality: Vec<u8>,
    /// Globally monotonic read identifier, assigned at batch allocation
    pub rdid: u64,
    /// Whether the full-parse succeeded for this record
    pub parsed: bool,
    /// Whether the record failed an upstream filter (Qseq column 11 = 0)
    pub filtered: bool,
}

impl ReadRecord {
    /// Create a fully parsed record (primarily useful in tests)
    pub fn new(id: String, sequence: Vec<u8>, quality: Vec<u8>) -> Self {
        Self {
            raw: Vec::new(),
            id,
            sequence,
            quality,
            rdid: 0,
            parsed: true,
            filtered: false,
        }
    }

    /// Clear all fields, keeping allocated capacity for reuse
    pub fn reset(&mut self) {
        self.raw.clear();
        self.id.clear();
        self.sequence.clear();
        self.quality.clear();
        self.rdid = 0;
        self.parsed = false;
        self.filtered = false;
    }

    /// Whether the light-parse left this slot empty
    ///
    /// Empty slots mark the end of a partially filled batch.
    pub fn is_unfilled(&self) -> bool {
        self.raw.is_empty()
    }

    /// Sequence length in bases
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the parsed sequence is empty
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}
