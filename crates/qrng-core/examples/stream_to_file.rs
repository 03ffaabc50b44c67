//! Stream generator output to a file.
//!
//! Writes random bytes in chunks, stepping the circuit as the buffer drains.
//!
//! Run: `cargo run --example stream_to_file`

use std::fs::File;
use std::io::{self, Write};

fn main() -> io::Result<()> {
    let output_path = "qrng_output.bin";
    let total_bytes: usize = 4096;
    let chunk_size: usize = 256;

    let mut rng = qrng_core::init();
    println!("Streaming {total_bytes} bytes to {output_path}");

    let mut file = File::create(output_path)?;
    let mut written = 0;
    let mut chunk = vec![0u8; chunk_size];

    while written < total_bytes {
        let n = chunk_size.min(total_bytes - written);
        rng.fill_bytes(&mut chunk[..n]).map_err(io::Error::other)?;
        file.write_all(&chunk[..n])?;
        written += n;
        print!("\r  {written}/{total_bytes} bytes written");
    }

    println!("\nDone. Wrote {written} bytes in {} steps", rng.steps());
    Ok(())
}
