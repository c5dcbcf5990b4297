//! Byte-level input stream over plain or gzip-compressed files
//!
//! Every format parser consumes input through [`ByteStream`]: a uniform
//! byte-at-a-time source with one byte of pushback, backed by either a
//! buffered plain file, a memory-mapped plain file, or a gzip decoder.
//!
//! # Compression detection
//!
//! A file is a gzip candidate when it is a FIFO, its extension is `gz` or
//! `Z`, or it has no extension at all. Candidates are sniffed for the gzip
//! magic bytes so that a plain-text file under a `.gz` name (or arriving on
//! a pipe) still reads correctly, matching zlib's transparent-read behavior.
//! Non-candidates are never decompressed.

use crate::error::Result;
use flate2::read::MultiGzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Buffer size backing plain-file reads (64 KiB)
pub const STREAM_BUF_SIZE: usize = 64 * 1024;

/// Memory-mapped file threshold (50 MB)
///
/// Plain files at or above this size are memory-mapped instead of read
/// through a `BufReader`; below it the mapping overhead dominates.
pub const MMAP_THRESHOLD: u64 = 50 * 1024 * 1024;

/// A byte source with single-byte pushback
///
/// `unget` is guaranteed to succeed exactly once between two `get` calls,
/// which is all the record-boundary scanners need.
pub struct ByteStream {
    reader: Box<dyn BufRead + Send>,
    pushback: Option<u8>,
}

impl ByteStream {
    /// Open a file, transparently decompressing gzip candidates
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = if is_gzip_candidate(path) {
            open_sniffed(path)?
        } else {
            open_plain(path)?
        };
        Ok(Self::from_reader(reader))
    }

    /// Wrap an existing buffered reader
    ///
    /// Useful for in-memory sources in tests.
    pub fn from_reader(reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            reader,
            pushback: None,
        }
    }

    /// Next byte, or `None` at end of stream
    #[inline]
    pub fn get(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pushback.take() {
            return Ok(Some(b));
        }
        let buf = self.reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let b = buf[0];
        self.reader.consume(1);
        Ok(Some(b))
    }

    /// Push one byte back onto the stream
    ///
    /// At most one byte may be pending at a time.
    #[inline]
    pub fn unget(&mut self, b: u8) {
        debug_assert!(self.pushback.is_none(), "double unget");
        self.pushback = Some(b);
    }
}

/// Whether the gzip-detection rule applies to this path
fn is_gzip_candidate(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if let Ok(meta) = std::fs::metadata(path) {
            if meta.file_type().is_fifo() {
                return true;
            }
        }
    }
    match path.extension().and_then(|e| e.to_str()) {
        None => true,
        Some(ext) => ext == "gz" || ext == "Z",
    }
}

/// Open a gzip candidate, sniffing the magic bytes
fn open_sniffed(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(STREAM_BUF_SIZE, file);
    let magic = reader.fill_buf()?;
    if magic.len() >= 2 && magic[0] == 0x1f && magic[1] == 0x8b {
        Ok(Box::new(BufReader::with_capacity(
            STREAM_BUF_SIZE,
            MultiGzDecoder::new(reader),
        )))
    } else {
        Ok(Box::new(reader))
    }
}

/// Open a plain file with size-based I/O method selection
///
/// Large regular files are memory-mapped (with sequential-access hints on
/// macOS); everything else goes through a buffered reader.
fn open_plain(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_file() && metadata.len() >= MMAP_THRESHOLD {
        open_mmap(path)
    } else {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::with_capacity(STREAM_BUF_SIZE, file)))
    }
}

#[cfg(target_os = "macos")]
fn open_mmap(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    use libc::{madvise, MADV_SEQUENTIAL, MADV_WILLNEED};

    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    unsafe {
        madvise(
            mmap.as_ptr() as *mut _,
            mmap.len(),
            MADV_SEQUENTIAL | MADV_WILLNEED,
        );
    }
    Ok(Box::new(io::Cursor::new(mmap)))
}

#[cfg(not(target_os = "macos"))]
fn open_mmap(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Box::new(io::Cursor::new(mmap)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    fn stream_of(data: &[u8]) -> ByteStream {
        ByteStream::from_reader(Box::new(Cursor::new(data.to_vec())))
    }

    #[test]
    fn test_get_until_eof() {
        let mut stream = stream_of(b"ab");
        assert_eq!(stream.get().unwrap(), Some(b'a'));
        assert_eq!(stream.get().unwrap(), Some(b'b'));
        assert_eq!(stream.get().unwrap(), None);
        assert_eq!(stream.get().unwrap(), None);
    }

    #[test]
    fn test_unget_round_trip() {
        let mut stream = stream_of(b"xy");
        let b = stream.get().unwrap().unwrap();
        stream.unget(b);
        assert_eq!(stream.get().unwrap(), Some(b'x'));
        assert_eq!(stream.get().unwrap(), Some(b'y'));
    }

    #[test]
    fn test_gzip_candidate_rules() {
        assert!(is_gzip_candidate(Path::new("reads.fq.gz")));
        assert!(is_gzip_candidate(Path::new("reads.Z")));
        assert!(is_gzip_candidate(Path::new("reads")));
        assert!(!is_gzip_candidate(Path::new("reads.fq")));
        assert!(!is_gzip_candidate(Path::new("reads.fastq")));
    }

    #[test]
    fn test_open_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fq.gz");
        let mut encoder =
            GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"@r\nACGT\n+\nIIII\n").unwrap();
        encoder.finish().unwrap();

        let mut stream = ByteStream::open(&path).unwrap();
        let mut out = Vec::new();
        while let Some(b) = stream.get().unwrap() {
            out.push(b);
        }
        assert_eq!(out, b"@r\nACGT\n+\nIIII\n");
    }

    #[test]
    fn test_plain_file_under_gzip_name() {
        // zlib-transparent behavior: a .gz name over uncompressed bytes
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.gz");
        std::fs::write(&path, b">r\nACGT\n").unwrap();

        let mut stream = ByteStream::open(&path).unwrap();
        let mut out = Vec::new();
        while let Some(b) = stream.get().unwrap() {
            out.push(b);
        }
        assert_eq!(out, b">r\nACGT\n");
    }

    #[test]
    fn test_plain_file_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fa");
        std::fs::write(&path, b">r\nACGT\n").unwrap();

        let mut stream = ByteStream::open(&path).unwrap();
        assert_eq!(stream.get().unwrap(), Some(b'>'));
    }
}
