//! Phred quality helpers.
//!
//! Mean read quality is not the arithmetic mean of the Phred scores: scores are converted to
//! error probabilities, averaged, and converted back.
use std::sync::OnceLock;

use crate::errors::PhredOffsetError;

/// ASCII offset of Phred+33 encoded quality strings
pub const PHRED_OFFSET: u8 = b'!';

/// Decodes Phred+33 quality data to quality scores. If the ASCII value of a
/// character is less than the offset, `PhredOffsetError` is returned.
pub fn decode_phred(qual: &[u8]) -> Result<Vec<u8>, PhredOffsetError> {
    let mut scores = Vec::with_capacity(qual.len());
    for &q in qual {
        if q < PHRED_OFFSET {
            return Err(PhredOffsetError {
                q,
                offset: PHRED_OFFSET,
            });
        }
        scores.push(q - PHRED_OFFSET);
    }
    Ok(scores)
}

// 10^(-q/10) for every possible score
fn error_probabilities() -> &'static [f64; 256] {
    static TABLE: OnceLock<[f64; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0.0; 256];
        for (q, p) in table.iter_mut().enumerate() {
            *p = 10f64.powf(-(q as f64) / 10.0);
        }
        table
    })
}

#[inline]
fn to_phred(mean_error: f64) -> f64 {
    -10.0 * mean_error.log10()
}

/// Mean quality of a read given its decoded Phred scores.
/// `None` for a read without scores.
pub fn average_quality(scores: &[u8]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let table = error_probabilities();
    let total: f64 = scores.iter().map(|&q| table[q as usize]).sum();
    Some(to_phred(total / scores.len() as f64))
}

/// Combines per-read mean qualities into one dataset-wide mean quality, the same way
/// [`average_quality`] combines per-base scores.
pub fn average_of_qualities(qualities: &[f64]) -> Option<f64> {
    if qualities.is_empty() {
        return None;
    }
    let total: f64 = qualities.iter().map(|q| 10f64.powf(-q / 10.0)).sum();
    Some(to_phred(total / qualities.len() as f64))
}
