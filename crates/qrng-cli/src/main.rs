//! CLI for qrng, a quantum-inspired random number generator.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qrng")]
#[command(about = "qrng: quantum-inspired random numbers from a simulated qubit circuit")]
#[command(version = qrng_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate random numbers in a range, with optional analysis.
    /// A negative --min switches to signed 32-bit mode.
    Generate {
        /// Number of random numbers to generate
        #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,

        /// Minimum value (decimal or 0x hex)
        #[arg(short = 'm', long, default_value = "0", allow_negative_numbers = true)]
        min: String,

        /// Maximum value (default: u64::MAX, or i32::MAX in signed mode)
        #[arg(short = 'M', long, allow_negative_numbers = true)]
        max: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "dec", value_parser = ["dec", "hex", "bin"])]
        format: String,

        /// Print min, max, mean, std-dev and the bit distribution
        #[arg(short, long)]
        analyze: bool,

        /// Write numbers to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Call every generator operation once and print the results
    Demo,

    /// Stream random bytes to stdout (pipe-friendly)
    Stream {
        /// Output format
        #[arg(long, default_value = "raw", value_parser = ["raw", "hex", "base64"])]
        format: String,

        /// Bytes/sec rate limit (0 = unlimited)
        #[arg(long, default_value = "0")]
        rate: usize,

        /// Total bytes (0 = until interrupted)
        #[arg(long, default_value = "0")]
        bytes: usize,
    },

    /// Run the NIST-inspired randomness test battery on generated bytes
    Report {
        /// Number of bytes to generate
        #[arg(long, default_value = "10000")]
        samples: usize,

        /// Output path for a markdown report
        #[arg(long)]
        output: Option<String>,
    },

    /// Start an HTTP random number server (ANU QRNG API compatible)
    Server {
        /// Port to listen on
        #[arg(long, default_value = "8042")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            count,
            min,
            max,
            format,
            analyze,
            output,
        } => commands::generate::run(
            count,
            &min,
            max.as_deref(),
            &format,
            analyze,
            output.as_deref(),
        ),
        Commands::Demo => commands::demo::run(),
        Commands::Stream {
            format,
            rate,
            bytes,
        } => commands::stream::run(&format, rate, bytes),
        Commands::Report { samples, output } => commands::report::run(samples, output.as_deref()),
        Commands::Server { port, host } => commands::server::run(&host, port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_negative_min() {
        let cli = Cli::try_parse_from(["qrng", "generate", "-m", "-10", "-M", "-1", "-f", "bin"])
            .unwrap();
        match cli.command {
            Commands::Generate {
                min, max, format, ..
            } => {
                assert_eq!(min, "-10");
                assert_eq!(max.as_deref(), Some("-1"));
                assert_eq!(format, "bin");
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_rejects_zero_count() {
        assert!(Cli::try_parse_from(["qrng", "generate", "-c", "0"]).is_err());
        assert!(Cli::try_parse_from(["qrng", "generate", "-f", "oct"]).is_err());
    }
}
