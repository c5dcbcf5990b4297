//! Hard trimming applied during full-parse
//!
//! Fixed-position clipping of both ends of a read. Sequence and quality are
//! always clipped together so they never fall out of alignment.

/// Clip `trim5` bases off the 5' end and `trim3` off the 3' end, in place
///
/// Both the sequence and its quality string are clipped identically. When
/// the two trims together meet or exceed the read length the read becomes
/// empty, never negative-length.
///
/// # Examples
///
/// ```
/// use readmux::operations::clip_ends;
///
/// let mut seq = b"ATGCATGC".to_vec();
/// let mut qual = b"ABCDEFGH".to_vec();
/// clip_ends(&mut seq, &mut qual, 2, 1);
/// assert_eq!(seq, b"GCATG");
/// assert_eq!(qual, b"CDEFG");
/// ```
pub fn clip_ends(seq: &mut Vec<u8>, qual: &mut Vec<u8>, trim5: usize, trim3: usize) {
    let len = seq.len();
    if trim5 + trim3 >= len {
        seq.clear();
        qual.clear();
        return;
    }
    seq.truncate(len - trim3);
    qual.truncate(qual.len().saturating_sub(trim3));
    seq.drain(..trim5);
    if trim5 <= qual.len() {
        qual.drain(..trim5);
    } else {
        qual.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(seq: &[u8], qual: &[u8], t5: usize, t3: usize) -> (Vec<u8>, Vec<u8>) {
        let mut s = seq.to_vec();
        let mut q = qual.to_vec();
        clip_ends(&mut s, &mut q, t5, t3);
        (s, q)
    }

    #[test]
    fn test_zero_trim_is_identity() {
        let (s, q) = clip(b"ACGTACGT", b"IIIIHHHH", 0, 0);
        assert_eq!(s, b"ACGTACGT");
        assert_eq!(q, b"IIIIHHHH");
    }

    #[test]
    fn test_both_ends() {
        let (s, q) = clip(b"ACGTACGT", b"12345678", 3, 2);
        assert_eq!(s, b"TAC");
        assert_eq!(q, b"456");
    }

    #[test]
    fn test_overlong_trim_empties() {
        let (s, q) = clip(b"ACGT", b"IIII", 3, 3);
        assert!(s.is_empty());
        assert!(q.is_empty());
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        /// Emitted length is max(0, len - trim5 - trim3)
        #[test]
        fn test_clip_length_formula(
            seq in "[ACGT]{0,100}",
            t5 in 0usize..20,
            t3 in 0usize..20,
        ) {
            let qual = vec![b'I'; seq.len()];
            let (s, q) = clip(seq.as_bytes(), &qual, t5, t3);
            let expected = seq.len().saturating_sub(t5 + t3);
            prop_assert_eq!(s.len(), expected);
            prop_assert_eq!(q.len(), expected);
        }

        /// Clipped content is the original middle slice
        #[test]
        fn test_clip_preserves_middle(
            seq in "[ACGT]{10,60}",
            t5 in 0usize..5,
            t3 in 0usize..5,
        ) {
            let qual = vec![b'I'; seq.len()];
            let (s, _) = clip(seq.as_bytes(), &qual, t5, t3);
            prop_assert_eq!(&s[..], &seq.as_bytes()[t5..seq.len() - t3]);
        }
    }
}
