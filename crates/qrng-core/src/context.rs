//! Generator context: the simulated circuit, its entropy pool and output buffer.
//!
//! Architecture:
//! 1. Capture system entropy once (time, pid, CPU clock, stack, cycle counter)
//! 2. Initialize eight qubits from the seed through Hadamard and phase gates
//! 3. Every step runs four mixing rounds over all qubits, measuring each one
//!    and entangling it with its neighbour
//! 4. The step ends by measuring sixteen output words into a 128-byte buffer
//! 5. Draws consume the buffer and trigger a new step when it runs dry
//! 6. Every measurement re-reads the clock and feeds a 16-slot amplitude pool
//!
//! A context is single-owner: all draws take `&mut self`. Share one across
//! threads behind a mutex.

use std::fmt;

use crate::constants::{
    BUFFER_SIZE, BUFFER_WORDS, ELECTRON_G, GOLDEN_RATIO, HEISENBERG, MIXING_ROUNDS, NUM_QUBITS,
    PAULI_X, PAULI_Y, PAULI_Z, POOL_SIZE, SCHRODINGER,
};
use crate::entropy::{self, DEFAULT_SEED_LEN, Timestamp};
use crate::error::{QrngError, Result};
use crate::gates::{
    hadamard_gate, hadamard_mix, pauli_finalize, pauli_finalize_z, phase_gate, quantum_noise,
    splitmix64, unit, word,
};

/// Quantum-inspired random number generator context.
pub struct QuantumRng {
    phase: [u64; NUM_QUBITS],
    entangle: [u64; NUM_QUBITS],
    quantum_state: [f64; NUM_QUBITS],
    last_measurement: [u64; NUM_QUBITS],
    buffer: [u8; BUFFER_SIZE],
    buffer_pos: usize,
    counter: u64,
    entropy_pool: [f64; POOL_SIZE],
    pool_mixer: u64,
    pool_index: usize,
    init_time: Timestamp,
    pid: u64,
    unique_id: u64,
    system_entropy: u64,
    runtime_entropy: u64,
}

impl QuantumRng {
    /// Create a context without a seed. Entropy comes from the running system only.
    pub fn new() -> Self {
        Self::with_seed(&[])
    }

    /// Create a context seeded with `seed`. An empty seed is the same as [`QuantumRng::new`].
    ///
    /// Only the first eight seed positions (cycled for short seeds) reach the
    /// qubits directly; the rest of the state comes from system entropy.
    pub fn with_seed(seed: &[u8]) -> Self {
        let init_time = Timestamp::now();
        let pid = entropy::process_id();
        let system_entropy = entropy::system_entropy();
        let unique_id = splitmix64(system_entropy);

        let mut rng = Self {
            phase: [0; NUM_QUBITS],
            entangle: [0; NUM_QUBITS],
            quantum_state: [0.0; NUM_QUBITS],
            last_measurement: [0; NUM_QUBITS],
            buffer: [0; BUFFER_SIZE],
            buffer_pos: 0,
            counter: 0,
            entropy_pool: [0.0; POOL_SIZE],
            pool_mixer: HEISENBERG ^ unique_id,
            pool_index: 0,
            init_time,
            pid,
            unique_id,
            system_entropy,
            runtime_entropy: 0,
        };
        rng.refresh_runtime_entropy();
        rng.init_pool();
        rng.init_qubits(seed);

        for _ in 0..MIXING_ROUNDS * 2 {
            rng.quantum_step();
        }

        log::debug!(
            "qrng context initialized (seed: {} bytes, pid: {pid})",
            seed.len()
        );
        rng
    }

    /// Create a context seeded with 32 bytes from the OS CSPRNG.
    pub fn from_os_seed() -> Result<Self> {
        let seed = entropy::os_seed(DEFAULT_SEED_LEN)?;
        Ok(Self::with_seed(&seed))
    }

    fn init_pool(&mut self) {
        let rt = unit(self.runtime_entropy);
        for i in 0..POOL_SIZE {
            self.entropy_pool[i] = quantum_noise(
                unit(self.system_entropy >> i)
                    + unit(self.init_time.micros >> (i % 20))
                    + unit(self.pid << (i % 16))
                    + rt,
            );
        }
    }

    fn init_qubits(&mut self, seed: &[u8]) {
        let len = seed.len();
        let seed_at = |i: usize| -> Option<u64> {
            if len == 0 {
                None
            } else {
                Some(u64::from(seed[i % len]))
            }
        };

        let mut mixer = GOLDEN_RATIO ^ self.system_entropy;
        for i in 0..NUM_QUBITS {
            let input = seed_at(i).unwrap_or(i as u64);
            mixer = splitmix64(mixer ^ seed_at(i).unwrap_or(0) ^ self.runtime_entropy);

            self.phase[i] =
                hadamard_gate(input ^ mixer ^ self.unique_id ^ self.runtime_entropy);

            self.quantum_state[i] = quantum_noise(
                unit(self.phase[i] ^ self.system_entropy)
                    + self.entropy_pool[i % POOL_SIZE]
                    + unit(self.runtime_entropy),
            );

            // Mirrored seed position; index arithmetic wraps like unsigned size math.
            let last = seed_at(len.wrapping_sub(1).wrapping_sub(i)).unwrap_or(i as u64);
            self.last_measurement[i] = self.measure(self.quantum_state[i], last);

            self.entangle[i] = phase_gate(
                self.last_measurement[i],
                input ^ mixer ^ self.runtime_entropy,
            );
        }
    }

    /// Mix new seed material into the circuit.
    ///
    /// Re-derives the first `min(seed.len(), 8)` qubits, then runs eight steps.
    pub fn reseed(&mut self, seed: &[u8]) -> Result<()> {
        if seed.is_empty() {
            return Err(QrngError::InvalidLength);
        }
        let len = seed.len();
        self.refresh_runtime_entropy();

        let mut mixer = GOLDEN_RATIO ^ self.runtime_entropy;
        for i in 0..len.min(NUM_QUBITS) {
            let byte = u64::from(seed[i]);
            mixer = splitmix64(mixer ^ byte ^ self.runtime_entropy);
            self.phase[i] = hadamard_gate(self.phase[i] ^ byte ^ mixer ^ self.runtime_entropy);
            self.quantum_state[i] =
                quantum_noise(unit(self.phase[i]) + unit(self.runtime_entropy));
            self.last_measurement[i] =
                self.measure(self.quantum_state[i], u64::from(seed[len - 1 - i]) ^ mixer);
            self.entangle[i] =
                phase_gate(self.last_measurement[i], byte ^ mixer ^ self.runtime_entropy);
        }

        for _ in 0..MIXING_ROUNDS * 2 {
            self.quantum_step();
        }
        log::debug!("qrng context reseeded with {len} bytes");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Circuit internals
    // -----------------------------------------------------------------------

    fn refresh_runtime_entropy(&mut self) {
        self.runtime_entropy =
            entropy::runtime_entropy(self.system_entropy, self.unique_id, self.counter);
    }

    /// Collapse an amplitude into a word, feeding the entropy pool on the way.
    fn measure(&mut self, amplitude: f64, last: u64) -> u64 {
        self.refresh_runtime_entropy();
        let rt = self.runtime_entropy;

        let collapsed = quantum_noise(amplitude + unit(rt));

        let slot = &mut self.entropy_pool[self.pool_index];
        *slot = quantum_noise(*slot + collapsed + unit(rt));
        self.pool_index = (self.pool_index + 1) & (POOL_SIZE - 1);

        self.pool_mixer =
            hadamard_mix(self.pool_mixer ^ word(self.entropy_pool[self.pool_index]) ^ rt);

        let mut result = hadamard_mix(word(collapsed) ^ last.wrapping_mul(ELECTRON_G) ^ rt);
        result ^= PAULI_X.wrapping_mul(self.pool_mixer >> 29);
        result = result.wrapping_mul(HEISENBERG);
        result ^= PAULI_Y.wrapping_mul(result >> 31);
        result = result.wrapping_mul(SCHRODINGER);
        result ^= PAULI_Z.wrapping_mul(result >> 27);
        result
    }

    /// Advance the circuit one step and refill the output buffer.
    fn quantum_step(&mut self) {
        self.counter = self.counter.wrapping_add(1);
        let mut mixer = splitmix64(self.counter.wrapping_mul(GOLDEN_RATIO));
        self.refresh_runtime_entropy();

        for round in 0..MIXING_ROUNDS as u64 {
            mixer = hadamard_mix(mixer ^ self.pool_mixer ^ self.runtime_entropy);

            for i in 0..NUM_QUBITS {
                self.phase[i] = hadamard_gate(
                    self.counter
                        .wrapping_add(mixer)
                        .wrapping_add(i as u64)
                        .wrapping_add(round)
                        .wrapping_add(self.runtime_entropy),
                );

                self.quantum_state[i] = quantum_noise(
                    unit(self.phase[i])
                        + self.entropy_pool[i & (POOL_SIZE - 1)]
                        + unit(self.runtime_entropy),
                );

                let measured = self.measure(self.quantum_state[i], self.last_measurement[i]);
                self.entangle[i] =
                    phase_gate(measured, self.counter ^ mixer ^ self.runtime_entropy);
                self.last_measurement[i] = measured;

                // Neighbour entanglement.
                if i > 0 {
                    self.entangle[i] ^=
                        hadamard_mix(self.entangle[i - 1] ^ mixer ^ self.runtime_entropy);
                    self.quantum_state[i] = quantum_noise(
                        self.quantum_state[i]
                            + self.quantum_state[i - 1]
                            + unit(self.runtime_entropy),
                    );
                }

                mixer = splitmix64(mixer ^ measured ^ self.pool_mixer ^ self.runtime_entropy);
            }
        }

        let mut prev = mixer;
        for i in 0..BUFFER_WORDS {
            let q = i % NUM_QUBITS;
            let current = self.measure(self.quantum_state[q], self.entangle[q]);
            let current = hadamard_mix(current ^ prev ^ self.pool_mixer ^ self.runtime_entropy);
            let current = pauli_finalize(current, 29, 31);

            self.buffer[i * 8..(i + 1) * 8].copy_from_slice(&current.to_ne_bytes());
            prev = current;
        }
        self.buffer_pos = 0;
        log::trace!("qrng step {} refilled {BUFFER_SIZE} bytes", self.counter);
    }

    /// Copy buffered output into `out`, stepping the circuit whenever the buffer runs dry.
    fn fill(&mut self, out: &mut [u8]) {
        let mut written = 0;
        while written < out.len() {
            if self.buffer_pos >= BUFFER_SIZE {
                self.quantum_step();
            }
            let n = (BUFFER_SIZE - self.buffer_pos).min(out.len() - written);
            out[written..written + n]
                .copy_from_slice(&self.buffer[self.buffer_pos..self.buffer_pos + n]);
            self.buffer_pos += n;
            written += n;
        }
    }

    // -----------------------------------------------------------------------
    // Draws
    // -----------------------------------------------------------------------

    /// Fill `out` with random bytes. Empty output is an [`QrngError::InvalidLength`].
    pub fn fill_bytes(&mut self, out: &mut [u8]) -> Result<()> {
        if out.is_empty() {
            return Err(QrngError::InvalidLength);
        }
        self.fill(out);
        Ok(())
    }

    /// Return `len` random bytes.
    pub fn generate_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.fill_bytes(&mut out)?;
        Ok(out)
    }

    /// Random 64-bit unsigned integer.
    pub fn generate_uint64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill(&mut bytes);
        let result = u64::from_ne_bytes(bytes);

        self.refresh_runtime_entropy();
        let result = splitmix64(result ^ self.runtime_entropy);
        pauli_finalize_z(result, 27, 31, 29)
    }

    /// Random double in `[0, 1)` with 53 bits of precision.
    pub fn generate_double(&mut self) -> f64 {
        (self.generate_uint64() >> 11) as f64 * (1.0 / 9_007_199_254_740_992.0)
    }

    /// Random signed integer in `[low, high]` (both inclusive).
    ///
    /// Uses rejection sampling on the low 32 bits of [`generate_uint64`](Self::generate_uint64)
    /// so every value in the range is equally likely.
    pub fn generate_range32(&mut self, low: i32, high: i32) -> Result<i32> {
        if low > high {
            log::warn!("rejected range32 [{low}, {high}]");
            return Err(QrngError::InvalidRange);
        }
        let span = (i64::from(high) - i64::from(low) + 1) as u64;
        if span > u64::from(u32::MAX) {
            // Full i32 range: every 32-bit pattern is valid.
            return Ok(self.generate_uint64() as u32 as i32);
        }

        let span = span as u32;
        let threshold = span.wrapping_neg() % span;
        let r = loop {
            let r = self.generate_uint64() as u32;
            if r >= threshold {
                break r;
            }
        };
        Ok((i64::from(low) + i64::from(r % span)) as i32)
    }

    /// Random unsigned integer in `[low, high]` (both inclusive).
    pub fn generate_range64(&mut self, low: u64, high: u64) -> Result<u64> {
        if low > high {
            log::warn!("rejected range64 [{low}, {high}]");
            return Err(QrngError::InvalidRange);
        }
        if low == high {
            return Ok(low);
        }
        let span = (high - low).wrapping_add(1);
        if span == 0 {
            return Ok(self.generate_uint64());
        }

        let threshold = span.wrapping_neg() % span;
        let r = loop {
            let r = self.generate_uint64();
            if r >= threshold {
                break r;
            }
        };
        Ok(low + r % span)
    }

    /// Estimated entropy per bit of the current state.
    ///
    /// Mean of `-log2(p)` over the sixteen pool amplitudes and the low byte
    /// of a fresh runtime-entropy reading. Always finite and non-negative.
    pub fn entropy_estimate(&mut self) -> f64 {
        let mut entropy: f64 = self
            .entropy_pool
            .iter()
            .map(|&p| -(p + 1e-10).log2())
            .sum();

        self.refresh_runtime_entropy();
        entropy += -((self.runtime_entropy & 0xFF) as f64 / 256.0 + 1e-10).log2();

        entropy / (POOL_SIZE + 1) as f64
    }

    /// Entangle two equal-length state buffers in place.
    ///
    /// Each byte pair is pushed through the Hadamard gate and then XORed with a
    /// shared phase word, so the two outputs are correlated: identical inputs
    /// produce identical outputs.
    pub fn entangle_states(&mut self, state_a: &mut [u8], state_b: &mut [u8]) -> Result<()> {
        if state_a.is_empty() || state_b.is_empty() || state_a.len() != state_b.len() {
            return Err(QrngError::InvalidLength);
        }
        self.refresh_runtime_entropy();
        let rt = self.runtime_entropy;

        let mut mixer = splitmix64(self.counter.wrapping_mul(GOLDEN_RATIO));
        for (a, b) in state_a.iter_mut().zip(state_b.iter_mut()) {
            let s1 = hadamard_gate(u64::from(*a) ^ mixer ^ rt);
            let s2 = hadamard_gate(u64::from(*b) ^ mixer ^ rt);

            let phase = phase_gate(s1 ^ s2, self.counter ^ mixer ^ rt);

            *a = (s1 ^ phase) as u8;
            *b = (s2 ^ phase) as u8;

            mixer = splitmix64(mixer ^ s1 ^ s2 ^ rt);
        }

        for amplitude in &mut self.quantum_state {
            *amplitude = quantum_noise(*amplitude + unit(rt));
        }
        Ok(())
    }

    /// Measure a state buffer in place, collapsing every byte to a new value.
    pub fn measure_state(&mut self, state: &mut [u8]) -> Result<()> {
        if state.is_empty() {
            return Err(QrngError::InvalidLength);
        }
        self.refresh_runtime_entropy();

        let mut mixer = splitmix64(self.counter.wrapping_mul(GOLDEN_RATIO));
        for byte in state.iter_mut() {
            let amplitude =
                quantum_noise(f64::from(*byte) / 255.0 + unit(self.runtime_entropy));
            let measured = self.measure(amplitude, mixer);
            *byte = (measured & 0xFF) as u8;
            mixer = splitmix64(mixer ^ measured ^ self.runtime_entropy);
        }

        for i in 0..NUM_QUBITS {
            self.last_measurement[i] =
                self.measure(self.quantum_state[i], self.last_measurement[i]);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of circuit steps run so far.
    pub fn steps(&self) -> u64 {
        self.counter
    }

    /// Bytes left in the output buffer before the next step.
    pub fn buffered(&self) -> usize {
        BUFFER_SIZE - self.buffer_pos
    }

    /// Current qubit amplitudes.
    pub fn amplitudes(&self) -> &[f64; NUM_QUBITS] {
        &self.quantum_state
    }

    /// Current entropy pool amplitudes.
    pub fn pool(&self) -> &[f64; POOL_SIZE] {
        &self.entropy_pool
    }

    /// Zero every field with volatile stores so the wipe survives `Drop`.
    fn wipe(&mut self) {
        clear(&mut self.phase, [0; NUM_QUBITS]);
        clear(&mut self.entangle, [0; NUM_QUBITS]);
        clear(&mut self.quantum_state, [0.0; NUM_QUBITS]);
        clear(&mut self.last_measurement, [0; NUM_QUBITS]);
        clear(&mut self.buffer, [0; BUFFER_SIZE]);
        clear(&mut self.buffer_pos, 0);
        clear(&mut self.counter, 0);
        clear(&mut self.entropy_pool, [0.0; POOL_SIZE]);
        clear(&mut self.pool_mixer, 0);
        clear(&mut self.pool_index, 0);
        clear(&mut self.init_time, Timestamp::default());
        clear(&mut self.pid, 0);
        clear(&mut self.unique_id, 0);
        clear(&mut self.system_entropy, 0);
        clear(&mut self.runtime_entropy, 0);
        std::sync::atomic::compiler_fence(std::sync::atomic::Ordering::SeqCst);
    }
}

fn clear<T: Copy>(dst: &mut T, value: T) {
    // SAFETY: `dst` is a valid, aligned, exclusive reference and `T: Copy`
    // has no drop glue to skip.
    unsafe { std::ptr::write_volatile(dst, value) }
}

impl Default for QuantumRng {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QuantumRng {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl fmt::Debug for QuantumRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // State words stay out of logs.
        f.debug_struct("QuantumRng")
            .field("steps", &self.counter)
            .field("buffered", &self.buffered())
            .field("pool_index", &self.pool_index)
            .finish_non_exhaustive()
    }
}

impl rand::RngCore for QuantumRng {
    fn next_u32(&mut self) -> u32 {
        self.generate_uint64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.generate_uint64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.fill(dst);
    }
}
