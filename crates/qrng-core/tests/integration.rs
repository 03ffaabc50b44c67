//! Integration tests for qrng-core.
//!
//! These tests drive the public API end to end:
//! context creation → draws → buffer operations → output quality.

use qrng_core::{
    QrngError, QuantumRng, bit_bias, bit_distribution, error_string, init, number_stats,
    quality_report, required_bits,
};

#[test]
fn smoke_call_sequence() {
    let mut rng = init();

    let bytes = rng.generate_bytes(16).unwrap();
    assert_eq!(bytes.len(), 16);

    let _ = rng.generate_uint64();

    let d = rng.generate_double();
    assert!((0.0..1.0).contains(&d));

    let v = rng.generate_range32(10, 100).unwrap();
    assert!((10..=100).contains(&v));

    let v = rng.generate_range64(100_000, 999_999).unwrap();
    assert!((100_000..=999_999).contains(&v));

    let e = rng.entropy_estimate();
    assert!(e.is_finite() && e >= 0.0);

    let mut s1 = [0u8; 16];
    let mut s2 = [0u8; 16];
    rng.entangle_states(&mut s1, &mut s2).unwrap();
    assert_eq!(s1, s2);

    let mut m = [0u8; 16];
    rng.measure_state(&mut m).unwrap();
    assert_ne!(m, [0u8; 16]);

    assert_eq!(error_string(-3), "Invalid length error");
}

#[test]
fn output_has_high_entropy() {
    let mut rng = QuantumRng::with_seed(b"integration");
    let bytes = rng.generate_bytes(50_000).unwrap();

    let report = quality_report(&bytes);
    assert!(
        report.shannon_entropy > 7.9,
        "entropy too low: {:.3}/8.0",
        report.shannon_entropy
    );
    assert!(report.compression_ratio > 0.95);
    assert_eq!(report.grade, 'A');
    assert!(!bit_bias(&bytes).has_significant_bias);
}

#[test]
fn independent_contexts_diverge() {
    let mut a = QuantumRng::new();
    let mut b = QuantumRng::new();
    assert_ne!(a.generate_bytes(64).unwrap(), b.generate_bytes(64).unwrap());
}

#[test]
fn range64_offsets_fill_required_bits() {
    let (low, high) = (1u64, 100u64);
    let mut rng = QuantumRng::with_seed(&[42; 32]);
    let values: Vec<u64> = (0..5000)
        .map(|_| rng.generate_range64(low, high).unwrap())
        .collect();

    let stats = number_stats(&values).unwrap();
    assert!(stats.min >= low && stats.max <= high);
    assert!((stats.mean - 50.5).abs() < 3.0, "mean {}", stats.mean);

    let bits = required_bits(low, high);
    let offsets: Vec<u64> = values.iter().map(|v| v - low).collect();
    let dist = bit_distribution(&offsets, bits);
    // Offsets reach 99 < 128, so bit 6 is set for 64..=99 only.
    assert!(dist.probability(0) > 0.4 && dist.probability(0) < 0.6);
    assert!(dist.probability(6) > 0.25 && dist.probability(6) < 0.47);
}

#[test]
fn errors_carry_codes() {
    let mut rng = QuantumRng::new();
    let err = rng.generate_range32(2, 1).unwrap_err();
    assert_eq!(err, QrngError::InvalidRange);
    assert_eq!(err.code(), -5);
    assert_eq!(error_string(err.code()), err.to_string());
}

#[test]
fn fill_errors_propagate_as_io() {
    let mut rng = QuantumRng::new();
    let err = rng.fill_bytes(&mut []).map_err(std::io::Error::other).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::Other);
    assert_eq!(err.to_string(), "Invalid length error");
}

#[test]
fn context_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<QuantumRng>();

    let handle = std::thread::spawn(|| {
        let mut rng = QuantumRng::new();
        rng.generate_uint64()
    });
    let _ = handle.join().unwrap();
}

#[test]
fn analysis_reports_serialize() {
    let mut rng = QuantumRng::new();
    let bytes = rng.generate_bytes(1024).unwrap();
    let json = serde_json::to_value(quality_report(&bytes)).unwrap();
    assert_eq!(json["samples"], 1024);
    assert!(json["grade"].is_string());
}
