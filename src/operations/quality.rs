//! Quality-score decoding and normalization
//!
//! Every input encoding is normalized to Phred+33 during full-parse, so
//! downstream consumers never see the source scale. Decoding failures are
//! reported to the caller (which fails the record) and to the once-per-run
//! warning hooks.

use std::sync::Once;

/// Quality encoding of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityScale {
    /// ASCII `q + 33` (Illumina 1.8+, Sanger)
    Phred33,
    /// ASCII `q + 64` (Illumina 1.3-1.7)
    Phred64,
    /// ASCII `10*log10(p/(1-p)) + 64` (pre-1.3 Solexa)
    Solexa64,
}

impl QualityScale {
    /// Pick the scale from the mutually-influencing configuration flags
    ///
    /// `solexa64` wins over `phred64`; everything else is Phred+33.
    pub fn from_flags(solexa64: bool, phred64: bool) -> Self {
        if solexa64 {
            QualityScale::Solexa64
        } else if phred64 {
            QualityScale::Phred64
        } else {
            QualityScale::Phred33
        }
    }
}

/// Highest Phred score representable after normalization (`~` - `!`)
const MAX_PHRED: i32 = 93;

/// Convert a Solexa quality to the nearest Phred quality
///
/// `phred = 10 * log10(10^(solexa/10) + 1)`, rounded. Defined for the full
/// Solexa range (minimum -5); small inputs map to low Phred scores rather
/// than failing.
fn solexa_to_phred(solexa: i32) -> i32 {
    (10.0 * (10f64.powf(solexa as f64 / 10.0) + 1.0).log10()).round() as i32
}

/// Decode a single quality character to a normalized Phred+33 byte
///
/// Returns `None` when the character is below the legal floor for the
/// chosen scale (`!` for Phred+33, `@` for Phred+64, `;` for Solexa).
#[inline]
pub fn decode_char(c: u8, scale: QualityScale) -> Option<u8> {
    let phred = match scale {
        QualityScale::Phred33 => {
            if c < b'!' || c > b'~' {
                return None;
            }
            (c - b'!') as i32
        }
        QualityScale::Phred64 => {
            if c < b'@' {
                return None;
            }
            (c - b'@') as i32
        }
        QualityScale::Solexa64 => {
            if c < b';' {
                return None;
            }
            solexa_to_phred(c as i32 - 64)
        }
    };
    Some((phred.clamp(0, MAX_PHRED) + 33) as u8)
}

/// Decode a raw quality field into normalized Phred+33 bytes
///
/// With `int_quals` set, the field is whitespace-separated decimal integers;
/// each is clamped to the representable Phred range. Otherwise each byte is
/// one quality character on `scale`. Returns `None` on any undecodable
/// character or integer.
pub fn decode_quality(
    raw: &[u8],
    scale: QualityScale,
    int_quals: bool,
) -> Option<Vec<u8>> {
    if int_quals {
        let text = std::str::from_utf8(raw).ok()?;
        let mut out = Vec::new();
        for tok in text.split_ascii_whitespace() {
            let q: i32 = tok.parse().ok()?;
            out.push((q.clamp(0, MAX_PHRED) + 33) as u8);
        }
        Some(out)
    } else {
        raw.iter().map(|&c| decode_char(c, scale)).collect()
    }
}

/// Warn (once per run) about a quality character outside the chosen scale
pub(crate) fn wrong_quality_format(read_name: &str) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        tracing::warn!(
            read = read_name,
            "quality value out of range for the configured encoding; \
             check the --phred64/--solexa64 settings"
        );
    });
}

/// Warn (once per run) about a quality string shorter than its sequence
pub(crate) fn too_few_qualities(read_name: &str) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        tracing::warn!(read = read_name, "fewer quality values than bases");
    });
}

/// Warn (once per run) about a quality string longer than its sequence
pub(crate) fn too_many_qualities(read_name: &str) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        tracing::warn!(read = read_name, "more quality values than bases");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phred33_identity() {
        assert_eq!(decode_char(b'!', QualityScale::Phred33), Some(b'!'));
        assert_eq!(decode_char(b'I', QualityScale::Phred33), Some(b'I'));
        assert_eq!(decode_char(b'~', QualityScale::Phred33), Some(b'~'));
        assert_eq!(decode_char(b' ', QualityScale::Phred33), None);
    }

    #[test]
    fn test_phred64_shifts_down() {
        // 'h' is Q40 on the +64 scale -> 'I' on the +33 scale
        assert_eq!(decode_char(b'h', QualityScale::Phred64), Some(b'I'));
        assert_eq!(decode_char(b'@', QualityScale::Phred64), Some(b'!'));
        assert_eq!(decode_char(b'?', QualityScale::Phred64), None);
    }

    #[test]
    fn test_solexa_conversion() {
        // High Solexa scores converge to the same Phred value
        assert_eq!(decode_char(b'h', QualityScale::Solexa64), Some(b'I'));
        // Solexa 0 -> Phred 3
        assert_eq!(decode_char(b'@', QualityScale::Solexa64), Some(b'$'));
        // Solexa -5 (the legal floor) -> Phred 1
        assert_eq!(decode_char(b';', QualityScale::Solexa64), Some(b'"'));
        assert_eq!(decode_char(b':', QualityScale::Solexa64), None);
    }

    #[test]
    fn test_integer_qualities() {
        let decoded =
            decode_quality(b"40 0 2 93", QualityScale::Phred33, true).unwrap();
        assert_eq!(decoded, b"I!#~");
    }

    #[test]
    fn test_integer_qualities_clamped() {
        let decoded =
            decode_quality(b"-3 200", QualityScale::Phred33, true).unwrap();
        assert_eq!(decoded, b"!~");
    }

    #[test]
    fn test_integer_qualities_reject_garbage() {
        assert!(decode_quality(b"40 x 2", QualityScale::Phred33, true).is_none());
    }

    #[test]
    fn test_scale_from_flags() {
        assert_eq!(
            QualityScale::from_flags(false, false),
            QualityScale::Phred33
        );
        assert_eq!(QualityScale::from_flags(false, true), QualityScale::Phred64);
        // solexa64 wins when both are set
        assert_eq!(QualityScale::from_flags(true, true), QualityScale::Solexa64);
    }
}
