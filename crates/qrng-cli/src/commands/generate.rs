use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use qrng_core::QuantumRng;
use qrng_core::analysis::{self, bit_distribution, number_stats};

/// Output format for generated numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Dec,
    Hex,
    Bin,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dec" => Some(Self::Dec),
            "hex" => Some(Self::Hex),
            "bin" => Some(Self::Bin),
            _ => None,
        }
    }
}

/// Inclusive draw range. A negative minimum selects the signed 32-bit generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bounds {
    Unsigned { low: u64, high: u64 },
    Signed { low: i32, high: i32 },
}

/// One drawn value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    Unsigned(u64),
    Signed(i64),
}

impl Bounds {
    fn draw(self, rng: &mut QuantumRng) -> qrng_core::Result<Sample> {
        match self {
            Self::Unsigned { low, high } => rng.generate_range64(low, high).map(Sample::Unsigned),
            Self::Signed { low, high } => rng
                .generate_range32(low, high)
                .map(|v| Sample::Signed(i64::from(v))),
        }
    }

    /// Bits shown for binary output and the bit-distribution table.
    pub fn required_bits(self) -> u32 {
        match self {
            Self::Unsigned { low, high } => analysis::required_bits(low, high),
            Self::Signed { low, high } => {
                analysis::required_bits_signed(i64::from(low), i64::from(high))
            }
        }
    }

    /// Distance of a sample from the lower bound.
    pub fn offset(self, sample: Sample) -> u64 {
        match (self, sample) {
            (Self::Unsigned { low, .. }, Sample::Unsigned(v)) => v.wrapping_sub(low),
            (Self::Signed { low, .. }, Sample::Signed(v)) => v.wrapping_sub(i64::from(low)) as u64,
            (Self::Unsigned { low, .. }, Sample::Signed(v)) => (v as u64).wrapping_sub(low),
            (Self::Signed { low, .. }, Sample::Unsigned(v)) => {
                v.wrapping_sub(i64::from(low) as u64)
            }
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned { low, high } => write!(f, "{low} to {high}"),
            Self::Signed { low, high } => write!(f, "{low} to {high}"),
        }
    }
}

/// Parse an unsigned value, decimal or `0x`-prefixed hex.
fn parse_u64(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

/// Parse a signed value, decimal or `0x`-prefixed hex, with optional leading `-`.
fn parse_i64(s: &str) -> Option<i64> {
    let s = s.trim();
    match s.strip_prefix('-') {
        Some(rest) => i64::try_from(-i128::from(parse_u64(rest)?)).ok(),
        None => i64::try_from(parse_u64(s)?).ok(),
    }
}

/// Unsigned bound, also accepting signed spellings of non-negative values (`-0`).
fn parse_unsigned(s: &str) -> Option<u64> {
    parse_u64(s).or_else(|| parse_i64(s).and_then(|v| u64::try_from(v).ok()))
}

/// Resolve `--min`/`--max` into draw bounds.
///
/// A negative minimum switches to signed mode, where the maximum defaults to
/// `i32::MAX` and both bounds must fit in 32 bits. Otherwise the maximum
/// defaults to `u64::MAX`.
pub fn resolve_bounds(min: &str, max: Option<&str>) -> Result<Bounds, String> {
    let bounds = match parse_i64(min) {
        Some(low) if low < 0 => {
            let high = match max {
                Some(m) => parse_i64(m).ok_or("Invalid maximum value")?,
                None => i64::from(i32::MAX),
            };
            let low = i32::try_from(low).map_err(|_| "Signed minimum must fit in 32 bits")?;
            let high = i32::try_from(high).map_err(|_| "Signed maximum must fit in 32 bits")?;
            if low > high {
                return Err("Min value cannot be greater than max value".into());
            }
            Bounds::Signed { low, high }
        }
        _ => {
            let low = parse_unsigned(min).ok_or("Invalid minimum value")?;
            let high = match max {
                Some(m) => parse_unsigned(m).ok_or("Invalid maximum value")?,
                None => u64::MAX,
            };
            if low > high {
                return Err("Min value cannot be greater than max value".into());
            }
            Bounds::Unsigned { low, high }
        }
    };
    Ok(bounds)
}

/// Render `value` as `bits` binary digits, grouped by four, with a `(N bits)` suffix.
pub fn format_binary(value: u64, bits: u32) -> String {
    let mut s = String::with_capacity(bits as usize * 2 + 12);
    for (printed, i) in (0..bits).rev().enumerate() {
        s.push(if (value >> i) & 1 == 1 { '1' } else { '0' });
        if i > 0 && (printed + 1) % 4 == 0 {
            s.push(' ');
        }
    }
    format!("{s} ({bits} bits)")
}

pub fn format_sample(sample: Sample, bounds: Bounds, format: Format) -> String {
    match format {
        Format::Dec => match sample {
            Sample::Unsigned(v) => v.to_string(),
            Sample::Signed(v) => v.to_string(),
        },
        Format::Hex => {
            let raw = match sample {
                Sample::Unsigned(v) => v,
                Sample::Signed(v) => v as u64,
            };
            format!("{raw:#018x}")
        }
        Format::Bin => format_binary(bounds.offset(sample), bounds.required_bits()),
    }
}

/// Draw `count` values and write one per line. Values are returned only when `keep` is set.
pub fn write_numbers<W: Write>(
    out: &mut W,
    rng: &mut QuantumRng,
    bounds: Bounds,
    count: u64,
    format: Format,
    keep: bool,
) -> Result<Vec<Sample>, Box<dyn std::error::Error>> {
    let mut kept = Vec::new();
    for _ in 0..count {
        let sample = bounds.draw(rng)?;
        writeln!(out, "{}", format_sample(sample, bounds, format))?;
        if keep {
            kept.push(sample);
        }
    }
    out.flush()?;
    Ok(kept)
}

fn stats_text<T>(values: &[T]) -> String
where
    T: Copy + Ord + Into<i128> + fmt::Display,
{
    match number_stats(values) {
        Some(stats) => format!(
            "Minimum:        {}\nMaximum:        {}\nMean:           {:.2}\nStd Deviation:  {:.2}\n",
            stats.min, stats.max, stats.mean, stats.std_dev
        ),
        None => String::new(),
    }
}

/// Statistical summary plus the per-bit frequency table.
pub fn analysis_text(samples: &[Sample], bounds: Bounds) -> String {
    if samples.is_empty() {
        return String::new();
    }

    let stats = match bounds {
        Bounds::Unsigned { .. } => {
            let values: Vec<u64> = samples
                .iter()
                .filter_map(|s| match s {
                    Sample::Unsigned(v) => Some(*v),
                    Sample::Signed(_) => None,
                })
                .collect();
            stats_text(&values)
        }
        Bounds::Signed { .. } => {
            let values: Vec<i64> = samples
                .iter()
                .filter_map(|s| match s {
                    Sample::Signed(v) => Some(*v),
                    Sample::Unsigned(_) => None,
                })
                .collect();
            stats_text(&values)
        }
    };

    let bits = bounds.required_bits();
    let offsets: Vec<u64> = samples.iter().map(|&s| bounds.offset(s)).collect();
    let dist = bit_distribution(&offsets, bits);
    let positions: Vec<usize> = (0..bits as usize).rev().collect();

    let join = |cells: Vec<String>| cells.join(" ");
    let header = join(positions.iter().map(|i| (i % 10).to_string()).collect());
    let rule = join(positions.iter().map(|_| "-".to_string()).collect());
    let freq = join(positions.iter().map(|&i| dist.digit(i).to_string()).collect());

    format!(
        "\nStatistical Analysis:\n{stats}\nBit Distribution ({bits} bits needed for range {bounds}):\nBit: {header}\n     {rule}\nFreq: {freq}\n"
    )
}

/// Open the output sink: a file when a path is given, stdout otherwise.
pub fn open_output(path: Option<&str>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

pub fn run(
    count: u64,
    min: &str,
    max: Option<&str>,
    format: &str,
    analyze: bool,
    output_path: Option<&str>,
) {
    let bounds = resolve_bounds(min, max).unwrap_or_else(|e| super::fail(e));
    let format =
        Format::parse(format).unwrap_or_else(|| super::fail(format!("Unknown format '{format}'")));
    let mut rng = super::make_rng();

    let mut out = open_output(output_path).unwrap_or_else(|e| {
        super::fail(format!(
            "Could not open output file '{}': {e}",
            output_path.unwrap_or("-")
        ))
    });

    let samples = write_numbers(&mut out, &mut rng, bounds, count, format, analyze)
        .unwrap_or_else(|e| super::fail(e));
    drop(out);

    if analyze {
        print!("{}", analysis_text(&samples, bounds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> QuantumRng {
        QuantumRng::with_seed(b"cli tests")
    }

    // -----------------------------------------------------------------------
    // Argument resolution
    // -----------------------------------------------------------------------

    #[test]
    fn test_resolve_default_unsigned() {
        assert_eq!(
            resolve_bounds("0", None).unwrap(),
            Bounds::Unsigned {
                low: 0,
                high: u64::MAX
            }
        );
    }

    #[test]
    fn test_resolve_hex_bounds() {
        assert_eq!(
            resolve_bounds("0x10", Some("0xff")).unwrap(),
            Bounds::Unsigned { low: 16, high: 255 }
        );
    }

    #[test]
    fn test_resolve_negative_min_is_signed() {
        assert_eq!(
            resolve_bounds("-5", Some("5")).unwrap(),
            Bounds::Signed { low: -5, high: 5 }
        );
        assert_eq!(
            resolve_bounds("-1", None).unwrap(),
            Bounds::Signed {
                low: -1,
                high: i32::MAX
            }
        );
    }

    #[test]
    fn test_resolve_negative_zero_is_unsigned() {
        assert_eq!(
            resolve_bounds("-0", Some("5")).unwrap(),
            Bounds::Unsigned { low: 0, high: 5 }
        );
        assert_eq!(
            resolve_bounds("0", Some("-0")).unwrap(),
            Bounds::Unsigned { low: 0, high: 0 }
        );
    }

    #[test]
    fn test_resolve_errors() {
        assert!(resolve_bounds("10", Some("5")).is_err());
        assert!(resolve_bounds("-1", Some("-5")).is_err());
        assert!(resolve_bounds("abc", None).is_err());
        assert!(resolve_bounds("1", Some("xyz")).is_err());
        assert!(resolve_bounds("-3000000000", Some("0")).is_err());
        assert!(resolve_bounds("-1", Some("3000000000")).is_err());
    }

    #[test]
    fn test_parse_i64_extremes() {
        assert_eq!(parse_i64("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_i64("-0x10"), Some(-16));
        assert_eq!(parse_i64("9223372036854775808"), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(Format::parse("dec"), Some(Format::Dec));
        assert_eq!(Format::parse("hex"), Some(Format::Hex));
        assert_eq!(Format::parse("bin"), Some(Format::Bin));
        assert_eq!(Format::parse("oct"), None);
    }

    // -----------------------------------------------------------------------
    // Formatting
    // -----------------------------------------------------------------------

    #[test]
    fn test_format_binary_groups() {
        assert_eq!(format_binary(5, 7), "0000 101 (7 bits)");
        assert_eq!(format_binary(0xff, 8), "1111 1111 (8 bits)");
        assert_eq!(format_binary(1, 1), "1 (1 bits)");
    }

    #[test]
    fn test_format_sample_hex() {
        let bounds = Bounds::Unsigned {
            low: 0,
            high: u64::MAX,
        };
        assert_eq!(
            format_sample(Sample::Unsigned(255), bounds, Format::Hex),
            "0x00000000000000ff"
        );
        let signed = Bounds::Signed { low: -5, high: 5 };
        assert_eq!(
            format_sample(Sample::Signed(-1), signed, Format::Hex),
            "0xffffffffffffffff"
        );
        assert_eq!(format_sample(Sample::Signed(-1), signed, Format::Dec), "-1");
    }

    #[test]
    fn test_format_sample_binary_uses_offset() {
        let bounds = Bounds::Unsigned { low: 1, high: 100 };
        assert_eq!(
            format_sample(Sample::Unsigned(6), bounds, Format::Bin),
            "0000 101 (7 bits)"
        );
        let signed = Bounds::Signed { low: -5, high: 5 };
        assert_eq!(
            format_sample(Sample::Signed(-5), signed, Format::Bin),
            "0000 0 (5 bits)"
        );
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    #[test]
    fn test_write_numbers_in_range() {
        let mut out = Vec::new();
        let bounds = Bounds::Unsigned { low: 1, high: 100 };
        let kept = write_numbers(&mut out, &mut rng(), bounds, 50, Format::Dec, true).unwrap();
        assert_eq!(kept.len(), 50);

        let text = String::from_utf8(out).unwrap();
        let values: Vec<u64> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(values.len(), 50);
        assert!(values.iter().all(|v| (1..=100).contains(v)));
    }

    #[test]
    fn test_write_numbers_signed() {
        let mut out = Vec::new();
        let bounds = Bounds::Signed { low: -10, high: -1 };
        write_numbers(&mut out, &mut rng(), bounds, 20, Format::Dec, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        for line in text.lines() {
            let v: i64 = line.parse().unwrap();
            assert!((-10..=-1).contains(&v));
        }
    }

    #[test]
    fn test_analysis_text_layout() {
        let bounds = Bounds::Unsigned { low: 1, high: 100 };
        let samples: Vec<Sample> = [1u64, 2, 3, 100].into_iter().map(Sample::Unsigned).collect();
        let text = analysis_text(&samples, bounds);
        assert!(text.contains("Minimum:        1\n"));
        assert!(text.contains("Maximum:        100\n"));
        assert!(text.contains("Mean:           26.50\n"));
        assert!(text.contains("Bit Distribution (7 bits needed for range 1 to 100):"));
        assert!(text.contains("Bit: 6 5 4 3 2 1 0\n"));
        assert!(text.contains("     - - - - - - -\n"));
        // offsets 0,1,2,99: bit0 set in 1,99 → 2/4·9 = 4
        assert!(text.ends_with(" 4\n"), "{text}");
    }

    #[test]
    fn test_analysis_text_empty() {
        let bounds = Bounds::Signed { low: -1, high: 1 };
        assert!(analysis_text(&[], bounds).is_empty());
    }

    #[test]
    fn test_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.txt");
        let path_str = path.to_str().unwrap();
        {
            let mut out = open_output(Some(path_str)).unwrap();
            let bounds = Bounds::Unsigned { low: 0, high: 9 };
            write_numbers(&mut out, &mut rng(), bounds, 12, Format::Hex, false).unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 12);
        assert!(text.lines().all(|l| l.starts_with("0x") && l.len() == 18));
    }
}
