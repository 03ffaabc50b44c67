use std::time::Instant;

use qrng_core::QualityReport;
use qrng_tests::TestResult;

pub fn run(samples: usize, output_path: Option<&str>) {
    if samples == 0 {
        super::fail("Sample count must be greater than zero");
    }
    let mut rng = super::make_rng();

    println!("Running test battery on {samples} generated bytes...\n");

    let t0 = Instant::now();
    let data = rng
        .generate_bytes(samples)
        .unwrap_or_else(|e| super::fail(e));
    let results = qrng_tests::run_all_tests(&data);
    let quality = qrng_core::quality_report(&data);
    let elapsed = t0.elapsed().as_secs_f64();

    let score = qrng_tests::calculate_quality_score(&results);
    let passed = results.iter().filter(|r| r.passed).count();

    println!("{}", "=".repeat(72));
    println!(
        "{:<22} {:>4} {:>6} {:>10} {:>12}",
        "Test", "Pass", "Grade", "p-value", "Statistic"
    );
    println!("{}", "-".repeat(72));
    for r in &results {
        println!(
            "{:<22} {:>4} {:>6} {:>10} {:>12.4}",
            r.name,
            if r.passed { "✓" } else { "✗" },
            r.grade,
            format_p(r.p_value),
            r.statistic
        );
    }
    println!("{}", "-".repeat(72));
    println!(
        "Score: {score:.1}/100  ({passed}/{} passed)  [{elapsed:.2}s]",
        results.len()
    );
    println!(
        "Shannon: {:.4} bits/byte  Min-entropy: {:.4}  Compression: {:.4}  Grade: {}",
        quality.shannon_entropy, quality.min_entropy, quality.compression_ratio, quality.grade
    );

    if let Some(path) = output_path {
        let report = generate_report(data.len(), &results, &quality);
        if let Err(e) = std::fs::write(path, &report) {
            eprintln!("Failed to write report to {path}: {e}");
        } else {
            println!("\nReport saved to: {path}");
        }
    }
}

fn format_p(p: Option<f64>) -> String {
    p.map(|p| format!("{p:.6}"))
        .unwrap_or_else(|| "-".to_string())
}

/// Markdown report of a battery run.
pub fn generate_report(samples: usize, tests: &[TestResult], quality: &QualityReport) -> String {
    let mut report = String::new();
    report.push_str("# QRNG Randomness Test Report\n\n");
    report.push_str(&format!(
        "Generated: {} (qrng {})\n\n",
        unix_now(),
        qrng_core::VERSION
    ));

    let score = qrng_tests::calculate_quality_score(tests);
    let passed = tests.iter().filter(|r| r.passed).count();
    report.push_str(&format!(
        "- Samples: {samples} bytes\n- Score: {score:.1}/100\n- Passed: {passed}/{}\n",
        tests.len()
    ));
    report.push_str(&format!(
        "- Shannon entropy: {:.4} bits/byte\n- Min-entropy: {:.4} bits/byte\n- Compression ratio: {:.4}\n- Quality grade: {}\n\n",
        quality.shannon_entropy, quality.min_entropy, quality.compression_ratio, quality.grade
    ));

    report.push_str("| Test | P | Grade | p-value | Statistic | Details |\n");
    report.push_str("|------|---|-------|---------|-----------|---------|\n");
    for t in tests {
        let ok = if t.passed { "✓" } else { "✗" };
        report.push_str(&format!(
            "| {} | {} | {} | {} | {:.4} | {} |\n",
            t.name,
            ok,
            t.grade,
            format_p(t.p_value),
            t.statistic,
            t.details
        ));
    }
    report
}

fn unix_now() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", dur.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrng_core::QuantumRng;

    #[test]
    fn test_format_p() {
        assert_eq!(format_p(Some(0.5)), "0.500000");
        assert_eq!(format_p(None), "-");
    }

    #[test]
    fn test_generate_report_contents() {
        let mut rng = QuantumRng::with_seed(b"report");
        let data = rng.generate_bytes(4096).unwrap();
        let results = qrng_tests::run_all_tests(&data);
        let quality = qrng_core::quality_report(&data);

        let report = generate_report(data.len(), &results, &quality);
        assert!(report.starts_with("# QRNG Randomness Test Report"));
        assert!(report.contains("- Samples: 4096 bytes"));
        assert!(report.contains("| Monobit Frequency |"));
        assert!(report.contains("| Cumulative Sums |"));
        // header + separator + one row per test
        let rows = report.lines().filter(|l| l.starts_with('|')).count();
        assert_eq!(rows, results.len() + 2);
    }

    #[test]
    fn test_report_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        let data = vec![0u8; 512];
        let results = qrng_tests::run_all_tests(&data);
        let quality = qrng_core::quality_report(&data);
        std::fs::write(&path, generate_report(data.len(), &results, &quality)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Quality grade: F"));
    }
}
