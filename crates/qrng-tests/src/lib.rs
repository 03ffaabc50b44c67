//! NIST SP 800-22 inspired randomness test battery.
//!
//! Ten statistical tests for evaluating generator output. Each test returns a
//! [`TestResult`] with a p-value (where applicable), a pass/fail
//! determination against [`PVALUE_THRESHOLD`], and a letter grade (A through F).

use qrng_core::analysis;
use qrng_core::constants::{CHI_THRESHOLD, MIN_ENTROPY, PVALUE_THRESHOLD};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use statrs::function::erf::erfc;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single randomness test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    /// Determine pass/fail from p-value against a threshold.
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }

    /// Result graded from a p-value against [`PVALUE_THRESHOLD`].
    fn from_p(name: &str, p: f64, statistic: f64, details: String) -> Self {
        Self {
            name: name.to_string(),
            passed: Self::pass_from_p(Some(p), PVALUE_THRESHOLD),
            p_value: Some(p),
            statistic,
            details,
            grade: Self::grade_from_p(Some(p)),
        }
    }

    fn failed(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            p_value: Some(0.0),
            statistic: 0.0,
            details: details.to_string(),
            grade: 'F',
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Unpack a byte slice into individual bits (MSB first per byte).
fn to_bits(data: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Return a failing `TestResult` when data is too short.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Insufficient data: need {needed}, got {got}"),
        grade: 'F',
    }
}

/// Upper-tail probability of a chi-squared statistic.
fn chi2_sf(df: f64, chi2: f64) -> f64 {
    ChiSquared::new(df).map(|d| d.sf(chi2)).unwrap_or(0.0)
}

/// Grade a 0–1 ratio against descending A/B/C/D cutoffs.
fn grade_from_ratio(ratio: f64, cutoffs: [f64; 4]) -> char {
    ['A', 'B', 'C', 'D']
        .into_iter()
        .zip(cutoffs)
        .find(|&(_, cut)| ratio > cut)
        .map_or('F', |(grade, _)| grade)
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. FREQUENCY TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Monobit frequency: proportion of 1s vs 0s should be ~50%.
pub fn monobit_frequency(data: &[u8]) -> TestResult {
    let name = "Monobit Frequency";
    let bits = to_bits(data);
    let n = bits.len();
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let s: i64 = bits.iter().map(|&b| if b == 1 { 1i64 } else { -1 }).sum();
    let s_obs = (s as f64).abs() / (n as f64).sqrt();
    let p = erfc(s_obs / 2.0_f64.sqrt());
    TestResult::from_p(name, p, s_obs, format!("S={s}, n={n}"))
}

/// Block frequency: proportion of ones within 128-bit blocks.
pub fn block_frequency(data: &[u8]) -> TestResult {
    let name = "Block Frequency";
    let block_size: usize = 128;
    let bits = to_bits(data);
    let n = bits.len();
    let num_blocks = n / block_size;
    if num_blocks < 10 {
        return insufficient(name, block_size * 10, n);
    }
    let chi2 = 4.0
        * block_size as f64
        * bits
            .chunks_exact(block_size)
            .map(|block| {
                let ones = block.iter().filter(|&&b| b == 1).count();
                let proportion = ones as f64 / block_size as f64;
                (proportion - 0.5) * (proportion - 0.5)
            })
            .sum::<f64>();
    let p = chi2_sf(num_blocks as f64, chi2);
    TestResult::from_p(name, p, chi2, format!("blocks={num_blocks}, M={block_size}"))
}

/// Byte chi-square: 256-bin histogram of byte values.
///
/// With 255 degrees of freedom the statistic is expected to sit near
/// [`CHI_THRESHOLD`]; the verdict comes from the p-value.
pub fn byte_chi_square(data: &[u8]) -> TestResult {
    let name = "Byte Chi-Square";
    let n = data.len();
    if n < 256 {
        return insufficient(name, 256, n);
    }
    let mut hist = [0u64; 256];
    for &b in data {
        hist[b as usize] += 1;
    }
    let expected = n as f64 / 256.0;
    let chi2: f64 = hist
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let p = chi2_sf(255.0, chi2);
    TestResult::from_p(
        name,
        p,
        chi2,
        format!("chi2={chi2:.1} (expected ~{CHI_THRESHOLD:.0}), n={n}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. RUNS TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs test: number of uninterrupted runs of 0s or 1s.
pub fn runs_test(data: &[u8]) -> TestResult {
    let name = "Runs Test";
    let bits = to_bits(data);
    let n = bits.len();
    if n < 100 {
        return insufficient(name, 100, n);
    }
    let ones = bits.iter().filter(|&&b| b == 1).count();
    let prop = ones as f64 / n as f64;
    if (prop - 0.5).abs() >= 2.0 / (n as f64).sqrt() {
        return TestResult::failed(name, &format!("Pre-test failed: proportion={prop:.4}"));
    }
    let runs = 1 + bits.windows(2).filter(|w| w[0] != w[1]).count();
    let expected = 2.0 * n as f64 * prop * (1.0 - prop) + 1.0;
    let std = 2.0 * (2.0 * n as f64).sqrt() * prop * (1.0 - prop);
    if std < 1e-10 {
        return TestResult::failed(name, "Zero variance");
    }
    let z = (runs as f64 - expected).abs() / std;
    let p = erfc(z / 2.0_f64.sqrt());
    TestResult::from_p(name, p, z, format!("runs={runs}, expected={expected:.0}"))
}

/// Longest run of ones within 8-bit blocks, chi-squared against theoretical probabilities.
pub fn longest_run_of_ones(data: &[u8]) -> TestResult {
    let name = "Longest Run of Ones";
    let bits = to_bits(data);
    let n = bits.len();
    if n < 128 {
        return insufficient(name, 128, n);
    }
    let block_size = 8;
    let num_blocks = n / block_size;

    // Bins: <=1, 2, 3, >=4
    let mut observed = [0u64; 4];
    for block in bits.chunks_exact(block_size) {
        let mut max_run = 0u32;
        let mut current = 0u32;
        for &bit in block {
            if bit == 1 {
                current += 1;
                max_run = max_run.max(current);
            } else {
                current = 0;
            }
        }
        observed[(max_run.clamp(1, 4) - 1) as usize] += 1;
    }

    let probs = [0.2148, 0.3672, 0.2305, 0.1875];
    let chi2: f64 = observed
        .iter()
        .zip(probs)
        .map(|(&obs, prob)| {
            let expected = prob * num_blocks as f64;
            let diff = obs as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let p = chi2_sf(3.0, chi2);
    TestResult::from_p(name, p, chi2, format!("blocks={num_blocks}, M={block_size}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. CORRELATION TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Serial correlation: lag-1 correlation of byte values. Z-test.
pub fn serial_correlation(data: &[u8]) -> TestResult {
    let name = "Serial Correlation";
    let n = data.len();
    if n < 20 {
        return insufficient(name, 20, n);
    }
    let arr: Vec<f64> = data.iter().map(|&b| f64::from(b)).collect();
    let mean = arr.iter().sum::<f64>() / n as f64;
    let var = arr.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
    if var < 1e-10 {
        return TestResult {
            p_value: None,
            statistic: 1.0,
            ..TestResult::failed(name, "Zero variance")
        };
    }
    let sum: f64 = arr.windows(2).map(|w| (w[0] - mean) * (w[1] - mean)).sum();
    let r = sum / ((n - 1) as f64 * var);
    let z = r * (n as f64).sqrt();
    let p = 2.0 * (1.0 - Normal::standard().cdf(z.abs()));
    TestResult::from_p(name, p, r.abs(), format!("r={r:.6}, z={z:.4}"))
}

/// Cumulative sums: maximum excursion of the ±1 random walk.
pub fn cusum_test(data: &[u8]) -> TestResult {
    let name = "Cumulative Sums";
    let bits = to_bits(data);
    let n = bits.len();
    if n < 100 {
        return insufficient(name, 100, n);
    }

    let mut s: i64 = 0;
    let mut max_abs: u64 = 0;
    for &bit in &bits {
        s += if bit == 1 { 1 } else { -1 };
        max_abs = max_abs.max(s.unsigned_abs());
    }
    let z = max_abs as f64;
    if z < 1e-10 {
        return TestResult {
            name: name.to_string(),
            passed: true,
            p_value: Some(1.0),
            statistic: 0.0,
            details: format!("max|S|=0, n={n}"),
            grade: 'A',
        };
    }

    let nf = n as f64;
    let sqrt_n = nf.sqrt();
    let norm = Normal::standard();
    let k_start = ((-nf / z + 1.0) / 4.0).floor() as i64;
    let k_end = ((nf / z - 1.0) / 4.0).ceil() as i64;
    let mut s_val = 0.0;
    for k in k_start..=k_end {
        let kf = k as f64;
        s_val += norm.cdf((4.0 * kf + 1.0) * z / sqrt_n) - norm.cdf((4.0 * kf - 1.0) * z / sqrt_n);
    }
    let p = (1.0 - s_val).clamp(0.0, 1.0);
    TestResult::from_p(name, p, z, format!("max|S|={z:.1}, n={n}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// 4. ENTROPY TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Shannon entropy in bits per byte (max 8.0).
pub fn shannon_entropy(data: &[u8]) -> TestResult {
    let name = "Shannon Entropy";
    let n = data.len();
    if n < 16 {
        return insufficient(name, 16, n);
    }
    let h = analysis::shannon_entropy(data);
    let ratio = h / 8.0;
    TestResult {
        name: name.to_string(),
        passed: ratio > 0.85,
        p_value: None,
        statistic: h,
        details: format!(
            "{h:.4} / 8.0 bits ({:.1}%), {:.2} bits/word (target {MIN_ENTROPY})",
            ratio * 100.0,
            h * 8.0
        ),
        grade: grade_from_ratio(ratio, [0.95, 0.85, 0.7, 0.5]),
    }
}

/// Min-entropy (NIST SP 800-90B most-common-value): -log2(p_max).
pub fn min_entropy(data: &[u8]) -> TestResult {
    let name = "Min-Entropy";
    let n = data.len();
    if n < 16 {
        return insufficient(name, 16, n);
    }
    let h_min = analysis::min_entropy(data);
    let ratio = h_min / 8.0;
    TestResult {
        name: name.to_string(),
        passed: ratio > 0.7,
        p_value: None,
        statistic: h_min,
        details: format!("{h_min:.4} / 8.0 bits ({:.1}%)", ratio * 100.0),
        grade: grade_from_ratio(ratio, [0.9, 0.75, 0.5, 0.25]),
    }
}

/// Compression ratio: zlib compressed size over input size (random ~ 1.0+).
pub fn compression_ratio(data: &[u8]) -> TestResult {
    let name = "Compression Ratio";
    let n = data.len();
    if n < 32 {
        return insufficient(name, 32, n);
    }
    let ratio = analysis::compression_ratio(data);
    TestResult {
        name: name.to_string(),
        passed: ratio > 0.85,
        p_value: None,
        statistic: ratio,
        details: format!("ratio={ratio:.4}, n={n}"),
        grade: grade_from_ratio(ratio, [0.95, 0.85, 0.7, 0.5]),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Run the complete battery on a byte slice.
pub fn run_all_tests(data: &[u8]) -> Vec<TestResult> {
    let tests: [fn(&[u8]) -> TestResult; 10] = [
        // Frequency (3)
        monobit_frequency,
        block_frequency,
        byte_chi_square,
        // Runs (2)
        runs_test,
        longest_run_of_ones,
        // Correlation (2)
        serial_correlation,
        cusum_test,
        // Entropy (3)
        shannon_entropy,
        min_entropy,
        compression_ratio,
    ];
    tests.iter().map(|test_fn| test_fn(data)).collect()
}

/// Calculate overall quality score (0-100) from test results.
///
/// Each grade maps to a score: A=100, B=75, C=50, D=25, F=0.
/// Returns the average across all tests.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrng_core::QuantumRng;

    /// Generate pseudo-random data for testing (simple LCG).
    fn pseudo_random(n: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(n);
        let mut state: u64 = 0xDEAD_BEEF_CAFE_BABE;
        for _ in 0..n {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            data.push((state >> 33) as u8);
        }
        data
    }

    #[test]
    fn test_to_bits() {
        let bits = to_bits(&[0b10110001u8]);
        assert_eq!(bits, vec![1, 0, 1, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_grade_from_p() {
        assert_eq!(TestResult::grade_from_p(Some(0.5)), 'A');
        assert_eq!(TestResult::grade_from_p(Some(0.05)), 'B');
        assert_eq!(TestResult::grade_from_p(Some(0.005)), 'C');
        assert_eq!(TestResult::grade_from_p(Some(0.0005)), 'D');
        assert_eq!(TestResult::grade_from_p(Some(0.00000001)), 'F');
        assert_eq!(TestResult::grade_from_p(None), 'F');
    }

    #[test]
    fn test_grade_from_ratio() {
        let cuts = [0.95, 0.85, 0.7, 0.5];
        assert_eq!(grade_from_ratio(0.99, cuts), 'A');
        assert_eq!(grade_from_ratio(0.9, cuts), 'B');
        assert_eq!(grade_from_ratio(0.75, cuts), 'C');
        assert_eq!(grade_from_ratio(0.6, cuts), 'D');
        assert_eq!(grade_from_ratio(0.1, cuts), 'F');
    }

    #[test]
    fn test_pass_from_p() {
        assert!(TestResult::pass_from_p(Some(0.05), PVALUE_THRESHOLD));
        assert!(!TestResult::pass_from_p(Some(0.005), PVALUE_THRESHOLD));
        assert!(!TestResult::pass_from_p(None, PVALUE_THRESHOLD));
    }

    #[test]
    fn test_insufficient_data() {
        let result = monobit_frequency(&[0u8; 5]);
        assert!(!result.passed);
        assert!(result.details.contains("Insufficient"));
    }

    #[test]
    fn test_constant_data_fails() {
        let results = run_all_tests(&[0u8; 1000]);
        let passed_count = results.iter().filter(|r| r.passed).count();
        assert!(passed_count < results.len() / 2);
    }

    #[test]
    fn test_pseudo_random_passes() {
        let results = run_all_tests(&pseudo_random(10000));
        let passed_count = results.iter().filter(|r| r.passed).count();
        assert!(
            passed_count > results.len() / 2,
            "Only {passed_count}/{} tests passed",
            results.len()
        );
    }

    #[test]
    fn test_generator_output_passes() {
        let mut rng = QuantumRng::with_seed(b"battery");
        let data = rng.generate_bytes(10_000).unwrap();
        let results = run_all_tests(&data);
        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.name.as_str())
            .collect();
        assert!(failed.len() <= 2, "failed: {failed:?}");
        assert!(calculate_quality_score(&results) > 60.0);
    }

    #[test]
    fn test_battery_size() {
        assert_eq!(run_all_tests(&pseudo_random(2000)).len(), 10);
    }

    #[test]
    fn test_byte_chi_square_skewed() {
        let data: Vec<u8> = (0..4096).map(|i| (i % 16) as u8).collect();
        let result = byte_chi_square(&data);
        assert!(!result.passed);
        assert!(result.statistic > CHI_THRESHOLD);
    }

    #[test]
    fn test_runs_alternating_fails() {
        // 0x55 = 01010101: maximal run count.
        let result = runs_test(&[0x55u8; 500]);
        assert!(!result.passed);
    }

    #[test]
    fn test_serial_correlation_ramp() {
        let data: Vec<u8> = (0..2000).map(|i| (i / 8) as u8).collect();
        let result = serial_correlation(&data);
        assert!(!result.passed);
        assert!(result.statistic > 0.5);
    }

    #[test]
    fn test_cusum_all_ones() {
        let result = cusum_test(&[0xFFu8; 200]);
        assert!(!result.passed);
        assert_eq!(result.statistic, 1600.0);
    }

    #[test]
    fn test_shannon_reports_word_target() {
        let result = shannon_entropy(&[0u8; 64]);
        assert!(!result.passed);
        assert_eq!(result.statistic, 0.0);
        assert!(result.details.contains("0.00 bits/word"));
        assert!(result.details.contains(&format!("target {MIN_ENTROPY}")));
    }

    #[test]
    fn test_quality_score() {
        let make = |grade: char| TestResult {
            name: grade.to_string(),
            passed: grade == 'A',
            p_value: None,
            statistic: 0.0,
            details: String::new(),
            grade,
        };
        let score = calculate_quality_score(&[make('A'), make('F')]);
        assert!((score - 50.0).abs() < 0.01);
        assert_eq!(calculate_quality_score(&[]), 0.0);
    }

    #[test]
    fn test_entropy_tests_on_random() {
        let data = pseudo_random(10000);
        assert!(shannon_entropy(&data).statistic > 7.0);
        assert!(min_entropy(&data).passed);
        assert!(compression_ratio(&data).statistic > 0.9);
    }
}
