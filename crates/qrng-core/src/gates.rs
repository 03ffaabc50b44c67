//! Circuit gates and word mixers.
//!
//! Every function here is pure and deterministic. Non-determinism enters the
//! generator only through the entropy fed into these gates by
//! [`QuantumRng`](crate::QuantumRng).
//!
//! # Gates
//!
//! - [`quantum_noise`]: maps an amplitude through a chain of trigonometric
//!   transforms back into `[0, 1)`.
//! - [`hadamard_gate`]: puts a word into "superposition" by mixing it with
//!   its own noised amplitude and a phase rotation.
//! - [`phase_gate`]: XORs a word with a rotation derived from an angle word.
//!
//! Float-to-integer conversions saturate, so amplitudes at the edge of the
//! unit interval map to `0` or `u64::MAX` instead of wrapping.

use std::f64::consts::{E, PI};

use crate::constants::{
    FINE_STRUCTURE, HEISENBERG, PAULI_X, PAULI_Y, PAULI_Z, PLANCK, RYDBERG, SCHRODINGER,
};

const U64_MAX_F: f64 = u64::MAX as f64;

/// Normalize a word into `[0, 1]`.
#[inline]
pub fn unit(x: u64) -> f64 {
    x as f64 / U64_MAX_F
}

/// Scale an amplitude back to a full-width word (saturating).
#[inline]
pub fn word(amplitude: f64) -> u64 {
    (amplitude * U64_MAX_F) as u64
}

/// Amplitude noise transform. Output is always in `[0, 0.5]`, so in `[0, 1)`.
pub fn quantum_noise(x: f64) -> f64 {
    let noise = ((x * PI).sin() * (x * E).cos()).abs();

    // Conjugate pair: cos² + sin² of two unrelated phases.
    let momentum = (noise * FINE_STRUCTURE as f64).cos();
    let position = (noise * PLANCK as f64).sin();
    let noise = (momentum * momentum + position * position) * 0.5;

    let noise = (noise * (1.0 - noise)).max(0.0).sqrt();
    noise - noise.floor()
}

/// SplitMix64 finalizer with an extra multiply-xorshift round.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^= x >> 31;
    x = x.wrapping_mul(HEISENBERG);
    x ^= x >> 29;
    x
}

/// Full-avalanche word mixer used between every gate.
#[inline]
pub fn hadamard_mix(x: u64) -> u64 {
    let mut x = splitmix64(x);
    x ^= PAULI_X.wrapping_mul(x >> 12);
    x = x.wrapping_mul(FINE_STRUCTURE);
    x ^= PAULI_Y.wrapping_mul(x >> 25);
    x = x.wrapping_mul(PLANCK);
    x ^= PAULI_Z.wrapping_mul(x >> 27);
    x = x.wrapping_mul(SCHRODINGER);
    x ^= x >> 13;
    x
}

/// Hadamard gate: superposition of a word with its noised amplitude.
pub fn hadamard_gate(x: u64) -> u64 {
    let state = quantum_noise(unit(x));

    let superposition = hadamard_mix(word(state) ^ x);

    let phase = quantum_noise(state + 0.5);
    let rotation = word(phase);

    hadamard_mix(superposition ^ rotation)
}

/// Phase gate: rotate `x` by an angle word.
pub fn phase_gate(x: u64, angle: u64) -> u64 {
    let phase = quantum_noise(unit(angle));

    let mixed = hadamard_mix(word(phase).wrapping_mul(RYDBERG));
    x ^ pauli_finalize(mixed, 17, 23)
}

/// Pauli X/Y shifts around two multiplies. Shared by the phase gate and buffer refills.
#[inline]
pub fn pauli_finalize(mut x: u64, shift_x: u32, shift_y: u32) -> u64 {
    x ^= PAULI_X.wrapping_mul(x >> shift_x);
    x = x.wrapping_mul(HEISENBERG);
    x ^= PAULI_Y.wrapping_mul(x >> shift_y);
    x.wrapping_mul(SCHRODINGER)
}

/// [`pauli_finalize`] followed by a Pauli Z shift.
#[inline]
pub fn pauli_finalize_z(x: u64, shift_x: u32, shift_y: u32, shift_z: u32) -> u64 {
    let x = pauli_finalize(x, shift_x, shift_y);
    x ^ PAULI_Z.wrapping_mul(x >> shift_z)
}
