use qrng_core::QuantumRng;

use super::to_hex;

/// Walk through every generator call once and print the results.
pub fn run() {
    let mut rng = qrng_core::init();
    match demo_lines(&mut rng) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(e) => super::fail(e),
    }
}

/// The demo sequence as printable lines.
pub fn demo_lines(rng: &mut QuantumRng) -> qrng_core::Result<Vec<String>> {
    let mut lines = Vec::with_capacity(11);

    let bytes = rng.generate_bytes(16)?;
    lines.push(format!("Random Bytes: {}", to_hex(&bytes)));

    lines.push(format!("Random 64-bit Integer: {}", rng.generate_uint64()));
    lines.push(format!("Random Double [0,1): {}", rng.generate_double()));
    lines.push(format!(
        "Random Integer [10,100]: {}",
        rng.generate_range32(10, 100)?
    ));
    lines.push(format!(
        "Random 64-bit Integer [100000,999999]: {}",
        rng.generate_range64(100_000, 999_999)?
    ));
    lines.push(format!(
        "Estimated Entropy per Bit: {}",
        rng.entropy_estimate()
    ));

    let mut state1 = [0u8; 16];
    let mut state2 = [0u8; 16];
    rng.entangle_states(&mut state1, &mut state2)?;
    lines.push(format!("Entangled State 1: {}", to_hex(&state1)));
    lines.push(format!("Entangled State 2: {}", to_hex(&state2)));

    let mut measured = [0u8; 16];
    rng.measure_state(&mut measured)?;
    lines.push(format!("Measured State: {}", to_hex(&measured)));

    lines.push(format!(
        "Error Message (-3): {}",
        qrng_core::error_string(-3)
    ));
    Ok(lines)
}
