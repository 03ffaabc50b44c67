//! Circuit dimensions, mixing constants and statistical thresholds.
//!
//! The 64-bit mixing constants are named after the physical quantities whose
//! digits seeded them. They are only bit patterns: no physics is computed with
//! them, they are multiplied and XORed into state words by [`crate::gates`].

/// Number of simulated qubits in the circuit.
pub const NUM_QUBITS: usize = 8;

/// State vector size multiplier.
pub const STATE_MULTIPLIER: usize = 16;

/// Total state size in bytes.
pub const STATE_SIZE: usize = NUM_QUBITS * STATE_MULTIPLIER;

/// Output buffer size in bytes. One [`quantum_step`](crate::QuantumRng) refills it.
pub const BUFFER_SIZE: usize = STATE_SIZE;

/// Output buffer size in 64-bit words.
pub const BUFFER_WORDS: usize = BUFFER_SIZE / 8;

/// Mixing rounds per circuit step.
pub const MIXING_ROUNDS: usize = 4;

/// Number of amplitude slots in the entropy pool.
pub const POOL_SIZE: usize = 16;

/// Smallest and largest circuit widths, kept for API compatibility.
pub const MIN_QUBITS: usize = 4;
pub const MAX_QUBITS: usize = 32;

// ---------------------------------------------------------------------------
// Mixing constants
// ---------------------------------------------------------------------------

/// α
pub const FINE_STRUCTURE: u64 = 0x7297_3527_4377_6A1B;
/// ħ
pub const PLANCK: u64 = 0x6955_9270_8649_5225;
/// R∞
pub const RYDBERG: u64 = 0x9E37_79B9_7F4A_7C15;
/// gₑ
pub const ELECTRON_G: u64 = 0x02B9_92DD_FA23_2945;
/// φ · 2⁶⁴ (same bits as [`RYDBERG`]).
pub const GOLDEN_RATIO: u64 = 0x9E37_79B9_7F4A_7C15;

pub const HEISENBERG: u64 = 0xC13F_A9A9_02A6_328F;
pub const SCHRODINGER: u64 = 0x91E1_0DA5_C79E_7B1D;
pub const PAULI_X: u64 = 0x4C95_7F2D_8A1E_6B3C;
pub const PAULI_Y: u64 = 0xD3E9_9E3B_6C1A_4F78;
pub const PAULI_Z: u64 = 0x8F14_2FC0_7892_A5B6;

// ---------------------------------------------------------------------------
// Statistical thresholds
// ---------------------------------------------------------------------------

/// Minimum acceptable entropy (bits per 64-bit word).
pub const MIN_ENTROPY: f64 = 63.9;

/// Upper bound for the byte-frequency chi-squared statistic (255 degrees of freedom).
pub const CHI_THRESHOLD: f64 = 255.0;

/// Significance level used by pass/fail decisions.
pub const PVALUE_THRESHOLD: f64 = 0.01;

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

pub const VERSION_MAJOR: u32 = 1;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_dimensions() {
        assert_eq!(STATE_SIZE, 128);
        assert_eq!(BUFFER_WORDS, 16);
        assert!(NUM_QUBITS >= MIN_QUBITS && NUM_QUBITS <= MAX_QUBITS);
    }

    #[test]
    fn test_golden_ratio_matches_rydberg() {
        assert_eq!(GOLDEN_RATIO, RYDBERG);
    }
}
