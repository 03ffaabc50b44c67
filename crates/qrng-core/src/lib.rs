//! # qrng-core
//!
//! **A quantum-inspired random number generator.**
//!
//! `qrng-core` simulates a small register of qubits with Hadamard and phase
//! gates, mixes every measurement with live system entropy, and serves the
//! result as bytes, integers, ranges and doubles.
//!
//! ## Quick Start
//!
//! ```
//! use qrng_core::QuantumRng;
//!
//! let mut rng = QuantumRng::with_seed(b"my seed");
//!
//! let bytes = rng.generate_bytes(32).unwrap();
//! assert_eq!(bytes.len(), 32);
//!
//! let die = rng.generate_range32(1, 6).unwrap();
//! assert!((1..=6).contains(&die));
//!
//! let x = rng.generate_double();
//! assert!((0.0..1.0).contains(&x));
//! ```
//!
//! ## Architecture
//!
//! Seed + system entropy → qubits → mixing rounds → measurement → buffer → output
//!
//! - [`gates`]: pure word and amplitude transforms
//! - [`entropy`]: wall-clock, process and OS entropy collection
//! - [`context`]: the [`QuantumRng`] state machine
//! - [`analysis`]: statistics and quality scoring over generated output
//!
//! This is **not** a cryptographically secure generator, and nothing here
//! touches real quantum hardware. Output is intentionally non-reproducible:
//! the same seed never yields the same stream twice.

pub mod analysis;
pub mod constants;
pub mod context;
pub mod entropy;
pub mod error;
pub mod gates;

pub use analysis::{
    BitBiasResult, BitDistribution, NumberStats, QualityReport, bit_bias, bit_distribution,
    number_stats, quality_report, required_bits, required_bits_signed,
};
pub use context::QuantumRng;
pub use error::{QrngError, Result, error_string};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create a context seeded from the OS CSPRNG, falling back to system
/// entropy alone when the OS source is unavailable.
pub fn init() -> QuantumRng {
    QuantumRng::from_os_seed().unwrap_or_else(|e| {
        log::warn!("falling back to unseeded context: {e}");
        QuantumRng::new()
    })
}

/// Library version as `major.minor.patch`.
pub fn version() -> &'static str {
    VERSION
}
