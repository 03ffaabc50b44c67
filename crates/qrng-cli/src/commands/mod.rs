pub mod demo;
pub mod generate;
pub mod report;
pub mod server;
pub mod stream;

use qrng_core::QuantumRng;

/// Build a context seeded with 32 bytes from the OS.
///
/// Exits when the OS entropy source is unavailable; every command needs a
/// properly seeded generator.
pub fn make_rng() -> QuantumRng {
    match QuantumRng::from_os_seed() {
        Ok(rng) => rng,
        Err(e) => fail(format!("Could not read random seed ({e})")),
    }
}

/// Print `Error: {msg}` to stderr and exit with status 1.
pub fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

/// Lowercase hex encoding.
pub fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[]), "");
        assert_eq!(to_hex(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
    }

    #[test]
    fn test_make_rng_is_usable() {
        let mut rng = make_rng();
        assert_eq!(rng.generate_bytes(8).unwrap().len(), 8);
    }
}
