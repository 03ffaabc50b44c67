//! Basic generator walk-through.
//!
//! Creates a context and calls every draw once.
//!
//! Run: `cargo run --example basic`

use qrng_core::error_string;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn main() -> Result<(), qrng_core::QrngError> {
    let mut rng = qrng_core::init();

    let bytes = rng.generate_bytes(16)?;
    println!("Random bytes:     {}", to_hex(&bytes));
    println!("Random uint64:    {}", rng.generate_uint64());
    println!("Random double:    {}", rng.generate_double());
    println!("Die roll [1,6]:   {}", rng.generate_range32(1, 6)?);
    println!(
        "Range64 [100000,999999]: {}",
        rng.generate_range64(100_000, 999_999)?
    );
    println!("Entropy estimate: {:.4}", rng.entropy_estimate());

    let mut a = [0u8; 16];
    let mut b = [0u8; 16];
    rng.entangle_states(&mut a, &mut b)?;
    println!("Entangled A:      {}", to_hex(&a));
    println!("Entangled B:      {}", to_hex(&b));

    println!("Error -3:         {}", error_string(-3));
    Ok(())
}
