//! Ambient entropy collection.
//!
//! The generator never runs on its seed alone: every measurement re-reads the
//! wall clock and folds it into state together with entropy captured once at
//! context creation (time, process id, CPU clock, stack address, cycle counter).
//!
//! Seeds for freshly created contexts come from the OS CSPRNG via
//! [`os_seed`].

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{QrngError, Result};
use crate::gates::hadamard_mix;

/// Default seed length drawn from the OS for new contexts.
pub const DEFAULT_SEED_LEN: usize = 32;

/// Wall-clock reading split like `struct timeval`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub secs: u64,
    pub micros: u64,
}

impl Timestamp {
    pub fn now() -> Self {
        let d = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: d.as_secs(),
            micros: u64::from(d.subsec_micros()),
        }
    }

    /// Pack as `secs << 32 | micros`.
    pub fn packed(self) -> u64 {
        (self.secs << 32) | self.micros
    }
}

/// Current process id.
pub fn process_id() -> u64 {
    u64::from(std::process::id())
}

/// Processor time consumed by this process, in nanoseconds.
#[cfg(unix)]
pub fn cpu_clock() -> u64 {
    // SAFETY: timespec is plain integers, so all-zero is a valid value, and
    // `&mut ts` is a valid writable pointer for the duration of the call.
    let (rc, ts) = unsafe {
        let mut ts: libc::timespec = std::mem::zeroed();
        let rc = libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts);
        (rc, ts)
    };
    if rc != 0 {
        return 0;
    }
    (ts.tv_sec as u64)
        .wrapping_mul(1_000_000_000)
        .wrapping_add(ts.tv_nsec as u64)
}

#[cfg(not(unix))]
pub fn cpu_clock() -> u64 {
    0
}

/// CPU cycle counter, or monotonic nanoseconds where no counter is exposed.
#[cfg(target_arch = "x86_64")]
fn cycle_counter() -> u64 {
    // SAFETY: RDTSC is available on every x86_64 CPU and has no side effects.
    unsafe { core::arch::x86_64::_rdtsc() }
}

#[cfg(target_arch = "x86")]
fn cycle_counter() -> u64 {
    // SAFETY: RDTSC is available on every CPU this target supports.
    unsafe { core::arch::x86::_rdtsc() }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
fn cycle_counter() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// One-shot system entropy: time, pid, CPU clock, stack address, cycle counter.
pub fn system_entropy() -> u64 {
    let ts = Timestamp::now();
    let mut entropy = ts.packed();
    entropy ^= process_id() << 32;
    entropy ^= cpu_clock();

    let stack_addr = std::ptr::from_ref(&ts) as usize as u64;
    entropy ^= stack_addr;

    entropy ^= cycle_counter();
    entropy
}

/// Runtime entropy: the current time mixed with the context's identity and counter.
pub fn runtime_entropy(system_entropy: u64, unique_id: u64, counter: u64) -> u64 {
    let runtime = Timestamp::now().packed() ^ system_entropy ^ unique_id ^ counter;
    hadamard_mix(runtime)
}

/// Fill a fresh seed from the OS CSPRNG.
pub fn os_seed(len: usize) -> Result<Vec<u8>> {
    let mut seed = vec![0u8; len];
    getrandom::fill(&mut seed).map_err(|e| {
        log::warn!("OS entropy unavailable: {e}");
        QrngError::InsufficientEntropy
    })?;
    Ok(seed)
}
