use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use qrng_core::QuantumRng;

const CHUNK_SIZE: usize = 4096;

/// Stream generator output to stdout until `n_bytes` are written (0 = until Ctrl+C).
pub fn run(format: &str, rate: usize, n_bytes: usize) {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    let mut rng = super::make_rng();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let total = stream_to(&mut out, &mut rng, format, rate, n_bytes, &running);
    log::info!("streamed {total} bytes");
}

/// Write encoded chunks to `out`. Stops on byte limit, broken pipe, or when `running` clears.
pub fn stream_to<W: Write>(
    out: &mut W,
    rng: &mut QuantumRng,
    format: &str,
    rate: usize,
    n_bytes: usize,
    running: &AtomicBool,
) -> usize {
    let chunk_size = if rate > 0 {
        rate.min(CHUNK_SIZE)
    } else {
        CHUNK_SIZE
    };
    let mut chunk = vec![0u8; chunk_size];
    let mut total = 0usize;

    while running.load(Ordering::SeqCst) {
        if n_bytes > 0 && total >= n_bytes {
            break;
        }
        let want = if n_bytes == 0 {
            chunk_size
        } else {
            chunk_size.min(n_bytes - total)
        };
        let data = &mut chunk[..want];
        if let Err(e) = rng.fill_bytes(data) {
            super::fail(e);
        }

        let write_result = match format {
            "hex" => out.write_all(super::to_hex(data).as_bytes()),
            "base64" => out.write_all(base64_encode(data).as_bytes()),
            _ => out.write_all(data),
        };
        if write_result.is_err() {
            break; // Broken pipe
        }
        let _ = out.flush();

        total += want;

        if rate > 0 {
            let sleep_dur = std::time::Duration::from_secs_f64(want as f64 / rate as f64);
            std::thread::sleep(sleep_dur);
        }
    }
    total
}

fn base64_encode(data: &[u8]) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut result = String::with_capacity(data.len().div_ceil(3) * 4);
    for chunk in data.chunks(3) {
        let b0 = u32::from(chunk[0]);
        let b1 = chunk.get(1).copied().map_or(0, u32::from);
        let b2 = chunk.get(2).copied().map_or(0, u32::from);
        let triple = (b0 << 16) | (b1 << 8) | b2;
        result.push(CHARS[((triple >> 18) & 0x3F) as usize] as char);
        result.push(CHARS[((triple >> 12) & 0x3F) as usize] as char);
        result.push(if chunk.len() > 1 {
            CHARS[((triple >> 6) & 0x3F) as usize] as char
        } else {
            '='
        });
        result.push(if chunk.len() > 2 {
            CHARS[(triple & 0x3F) as usize] as char
        } else {
            '='
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_padding() {
        assert_eq!(base64_encode(b""), "");
        assert_eq!(base64_encode(b"f"), "Zg==");
        assert_eq!(base64_encode(b"fo"), "Zm8=");
        assert_eq!(base64_encode(b"foo"), "Zm9v");
        assert_eq!(base64_encode(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn test_stream_raw_byte_limit() {
        let mut rng = QuantumRng::with_seed(b"stream");
        let running = AtomicBool::new(true);
        let mut out = Vec::new();
        let total = stream_to(&mut out, &mut rng, "raw", 0, 10_000, &running);
        assert_eq!(total, 10_000);
        assert_eq!(out.len(), 10_000);
    }

    #[test]
    fn test_stream_hex_doubles_length() {
        let mut rng = QuantumRng::with_seed(b"stream");
        let running = AtomicBool::new(true);
        let mut out = Vec::new();
        stream_to(&mut out, &mut rng, "hex", 0, 100, &running);
        assert_eq!(out.len(), 200);
        assert!(out.iter().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_stream_stops_when_interrupted() {
        let mut rng = QuantumRng::with_seed(b"stream");
        let running = AtomicBool::new(false);
        let mut out = Vec::new();
        assert_eq!(stream_to(&mut out, &mut rng, "raw", 0, 0, &running), 0);
        assert!(out.is_empty());
    }
}
