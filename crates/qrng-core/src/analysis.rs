//! Statistics over generated output.
//!
//! Two families of helpers:
//! - **Number summaries** for batches of drawn integers: min, max, mean,
//!   standard deviation, and the per-bit distribution of `value - low`
//!   rendered as 0–9 frequency digits.
//! - **Byte quality** for raw byte streams: Shannon entropy, min-entropy,
//!   compression ratio, per-bit bias and an overall A–F grade.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Number summaries
// ---------------------------------------------------------------------------

/// Summary statistics of a batch of integers.
#[derive(Debug, Clone, Serialize)]
pub struct NumberStats<T> {
    pub count: usize,
    pub min: T,
    pub max: T,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Summarize a batch of integers. `None` for an empty batch.
pub fn number_stats<T>(values: &[T]) -> Option<NumberStats<T>>
where
    T: Copy + Ord + Into<i128>,
{
    let min = *values.iter().min()?;
    let max = *values.iter().max()?;
    let n = values.len() as f64;

    let mean = values.iter().map(|&v| v.into() as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let d = v.into() as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    Some(NumberStats {
        count: values.len(),
        min,
        max,
        mean,
        std_dev: variance.max(0.0).sqrt(),
    })
}

/// Bits needed to represent every offset in `[low, high]`.
///
/// Position of the highest set bit of the span `high - low + 1`; a span of
/// the whole `u64` space (which wraps to zero) needs all 64 bits.
pub fn required_bits(low: u64, high: u64) -> u32 {
    let span = high.wrapping_sub(low).wrapping_add(1);
    if span == 0 { 64 } else { 64 - span.leading_zeros() }
}

/// [`required_bits`] for a signed range, plus one bit for the sign.
pub fn required_bits_signed(low: i64, high: i64) -> u32 {
    let span = high.wrapping_sub(low) as u64;
    (required_bits(0, span) + 1).min(64)
}

/// Per-bit frequency of the offsets `value - low`.
#[derive(Debug, Clone, Serialize)]
pub struct BitDistribution {
    /// Number of bit positions examined.
    pub bits: u32,
    /// Set-bit count per position, index 0 = LSB.
    pub counts: Vec<u64>,
    /// Number of values counted.
    pub samples: usize,
}

impl BitDistribution {
    /// Frequency digit (0–9) for a bit position: `count / samples · 9`, truncated.
    pub fn digit(&self, bit: usize) -> u8 {
        if self.samples == 0 {
            return 0;
        }
        (self.counts[bit] as f64 / self.samples as f64 * 9.0) as u8
    }

    /// Fraction of values with the bit set.
    pub fn probability(&self, bit: usize) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.counts[bit] as f64 / self.samples as f64
    }
}

/// Count set bits of each offset (already reduced to `value - low`).
pub fn bit_distribution(offsets: &[u64], bits: u32) -> BitDistribution {
    let bits = bits.min(64);
    let mut counts = vec![0u64; bits as usize];
    for &v in offsets {
        for (j, count) in counts.iter_mut().enumerate() {
            if v & (1u64 << j) != 0 {
                *count += 1;
            }
        }
    }
    BitDistribution {
        bits,
        counts,
        samples: offsets.len(),
    }
}

// ---------------------------------------------------------------------------
// Byte quality
// ---------------------------------------------------------------------------

/// Shannon entropy in bits per byte (max 8.0).
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let counts = byte_counts(data);
    let n = data.len() as f64;
    let mut h = 0.0;
    for &c in &counts {
        if c > 0 {
            let p = c as f64 / n;
            h -= p * p.log2();
        }
    }
    h
}

/// Most-common-value min-entropy in bits per byte (max 8.0).
pub fn min_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let max = byte_counts(data).into_iter().max().unwrap_or(0);
    -(max as f64 / data.len() as f64).log2()
}

/// zlib-compressed size over input size. Random data does not compress (≈1.0).
pub fn compression_ratio(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    if encoder.write_all(data).is_err() {
        return 0.0;
    }
    let compressed = encoder.finish().unwrap_or_default();
    compressed.len() as f64 / data.len() as f64
}

fn byte_counts(data: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    counts
}

/// Per-bit-position bias analysis.
#[derive(Debug, Clone, Serialize)]
pub struct BitBiasResult {
    /// Probability of 1 for each bit position (0=LSB, 7=MSB).
    pub bit_probabilities: [f64; 8],
    /// Mean absolute deviation from 0.5.
    pub overall_bias: f64,
    /// Chi-squared over the eight positions against n/2.
    pub chi_squared: f64,
    pub has_significant_bias: bool,
}

/// Analyze per-bit-position bias.
pub fn bit_bias(data: &[u8]) -> BitBiasResult {
    if data.is_empty() {
        return BitBiasResult {
            bit_probabilities: [0.0; 8],
            overall_bias: 0.0,
            chi_squared: 0.0,
            has_significant_bias: false,
        };
    }

    let n = data.len() as f64;
    let mut counts = [0u64; 8];
    for &byte in data {
        for (bit, count) in counts.iter_mut().enumerate() {
            if byte & (1 << bit) != 0 {
                *count += 1;
            }
        }
    }

    let mut bit_probabilities = [0.0; 8];
    for (p, &c) in bit_probabilities.iter_mut().zip(&counts) {
        *p = c as f64 / n;
    }
    let overall_bias = bit_probabilities
        .iter()
        .map(|&p| (p - 0.5).abs())
        .sum::<f64>()
        / 8.0;

    let expected = n / 2.0;
    let chi_squared = counts
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();

    // 3σ of a binomial proportion, floored at 1% for large samples.
    let tolerance = (3.0 * 0.5 / n.sqrt()).max(0.01);
    let has_significant_bias = bit_probabilities
        .iter()
        .any(|&p| (p - 0.5).abs() > tolerance);

    BitBiasResult {
        bit_probabilities,
        overall_bias,
        chi_squared,
        has_significant_bias,
    }
}

/// Quick quality assessment of a byte stream.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub samples: usize,
    pub unique_values: usize,
    pub shannon_entropy: f64,
    pub min_entropy: f64,
    pub compression_ratio: f64,
    pub quality_score: f64,
    pub grade: char,
}

/// Score a byte stream 0–100 and grade it A–F.
///
/// 60% Shannon efficiency, 20% incompressibility, 20% value coverage.
/// Fewer than 16 bytes always grades F.
pub fn quality_report(data: &[u8]) -> QualityReport {
    if data.len() < 16 {
        return QualityReport {
            samples: data.len(),
            unique_values: 0,
            shannon_entropy: 0.0,
            min_entropy: 0.0,
            compression_ratio: 0.0,
            quality_score: 0.0,
            grade: 'F',
        };
    }

    let shannon = shannon_entropy(data);
    let comp_ratio = compression_ratio(data);
    let unique = byte_counts(data).iter().filter(|&&c| c > 0).count();

    let score = (shannon / 8.0) * 60.0
        + comp_ratio.min(1.0) * 20.0
        + (unique as f64 / 256.0).min(1.0) * 20.0;

    QualityReport {
        samples: data.len(),
        unique_values: unique,
        shannon_entropy: shannon,
        min_entropy: min_entropy(data),
        compression_ratio: comp_ratio,
        quality_score: score,
        grade: grade_for_score(score),
    }
}

/// Letter grade for a 0–100 score.
pub fn grade_for_score(score: f64) -> char {
    if score >= 80.0 {
        'A'
    } else if score >= 60.0 {
        'B'
    } else if score >= 40.0 {
        'C'
    } else if score >= 20.0 {
        'D'
    } else {
        'F'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_data_seeded(n: usize, seed: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(n);
        let mut state: u64 = seed;
        for _ in 0..n {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            data.push((state >> 33) as u8);
        }
        data
    }

    #[test]
    fn test_number_stats_unsigned() {
        let stats = number_stats(&[2u64, 4, 4, 4, 5, 5, 7, 9]).unwrap();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.min, 2);
        assert_eq!(stats.max, 9);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_number_stats_signed() {
        let stats = number_stats(&[-3i64, 3]).unwrap();
        assert_eq!(stats.min, -3);
        assert_eq!(stats.max, 3);
        assert!(stats.mean.abs() < 1e-12);
        assert!((stats.std_dev - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_number_stats_empty() {
        assert!(number_stats::<u64>(&[]).is_none());
    }

    #[test]
    fn test_number_stats_large_values() {
        let stats = number_stats(&[u64::MAX, u64::MAX]).unwrap();
        assert!(stats.std_dev.abs() < 1.0);
    }

    #[test]
    fn test_required_bits() {
        assert_eq!(required_bits(0, 0), 1);
        assert_eq!(required_bits(1, 100), 7);
        assert_eq!(required_bits(0, 255), 9);
        assert_eq!(required_bits(0, 254), 8);
        assert_eq!(required_bits(100_000, 999_999), 20);
        assert_eq!(required_bits(0, u64::MAX), 64);
        assert_eq!(required_bits(1, u64::MAX), 64);
    }

    #[test]
    fn test_required_bits_signed() {
        assert_eq!(required_bits_signed(-5, 5), 5);
        assert_eq!(required_bits_signed(-1, -1), 2);
        assert!(required_bits_signed(i64::MIN, i64::MAX) <= 64);
    }

    #[test]
    fn test_bit_distribution_digits() {
        let offsets = [0b01u64, 0b11, 0b01, 0b11];
        let dist = bit_distribution(&offsets, 3);
        assert_eq!(dist.counts, vec![4, 2, 0]);
        assert_eq!(dist.digit(0), 9);
        assert_eq!(dist.digit(1), 4);
        assert_eq!(dist.digit(2), 0);
        assert!((dist.probability(1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bit_distribution_empty() {
        let dist = bit_distribution(&[], 8);
        assert_eq!(dist.digit(3), 0);
        assert_eq!(dist.probability(3), 0.0);
    }

    #[test]
    fn test_shannon_bounds() {
        assert_eq!(shannon_entropy(&[]), 0.0);
        assert_eq!(shannon_entropy(&[7u8; 100]), 0.0);
        let all: Vec<u8> = (0..=255).collect();
        assert!((shannon_entropy(&all) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_entropy_le_shannon() {
        let data = random_data_seeded(10_000, 7);
        assert!(min_entropy(&data) <= shannon_entropy(&data));
        assert_eq!(min_entropy(&[1u8; 50]), 0.0);
    }

    #[test]
    fn test_compression_ratio() {
        assert!(compression_ratio(&[0u8; 4096]) < 0.1);
        assert!(compression_ratio(&random_data_seeded(4096, 3)) > 0.9);
    }

    #[test]
    fn test_bit_bias_all_ones() {
        let result = bit_bias(&[0xFFu8; 1000]);
        assert!(result.has_significant_bias);
        assert!((result.overall_bias - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bit_bias_random() {
        let result = bit_bias(&random_data_seeded(100_000, 11));
        assert!(!result.has_significant_bias);
    }

    #[test]
    fn test_quality_report_grades() {
        assert_eq!(quality_report(&[1, 2, 3]).grade, 'F');
        assert_eq!(quality_report(&[0u8; 1000]).grade, 'F');
        let good = quality_report(&random_data_seeded(10_000, 5));
        assert_eq!(good.grade, 'A');
        assert_eq!(good.unique_values, 256);
    }
}
