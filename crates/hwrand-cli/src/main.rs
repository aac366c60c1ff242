//! CLI for hwrand — probe CPU entropy instructions and draw samples.
//!
//! The binary is a plain consumer of the device: it calls `next()` and
//! reads `min()`/`max()`/`entropy_estimate()`, nothing more.

use clap::{Parser, Subcommand};
use serde::Serialize;

use hwrand_core::{HardwareSource, HybridDevice, PlatformSource, Sample, cpuid};

#[derive(Parser)]
#[command(name = "hwrand")]
#[command(about = "hwrand — hybrid hardware/pseudo random device")]
#[command(version = hwrand_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the CPU's entropy-instruction capabilities
    Probe {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Draw random samples to stdout, one per line
    Gen {
        /// Number of samples to draw
        #[arg(long, short = 'n', default_value_t = 1)]
        count: usize,

        /// Sample width in bits
        #[arg(long, default_value = "64", value_parser = ["16", "32", "64"])]
        width: String,

        /// Print samples as zero-padded hex instead of decimal
        #[arg(long)]
        hex: bool,
    },
}

#[derive(Serialize)]
struct ProbeReport {
    vendor_supported: bool,
    rdrand: bool,
    rdseed: bool,
    entropy_estimate: f64,
}

fn probe_report() -> ProbeReport {
    let dev = HybridDevice::<u64>::new();
    ProbeReport {
        vendor_supported: cpuid::is_genuine_intel(),
        rdrand: dev.supports_weak_entropy(),
        rdseed: dev.supports_strong_entropy(),
        entropy_estimate: dev.entropy_estimate(),
    }
}

fn cmd_probe(json: bool) {
    let report = probe_report();
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to encode report: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("vendor signature:  {}", yes_no(report.vendor_supported));
    println!("rdrand (weak):     {}", yes_no(report.rdrand));
    println!("rdseed (strong):   {}", yes_no(report.rdseed));
    println!("entropy estimate:  {:.1}", report.entropy_estimate);
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

fn cmd_gen<T: Sample>(count: usize, hex: bool)
where
    PlatformSource: HardwareSource<T>,
{
    let mut dev = HybridDevice::<T>::new();
    log::debug!(
        "drawing {count} samples at {} bits, entropy estimate {:.1}",
        T::BITS,
        dev.entropy_estimate()
    );
    let hex_digits = (T::BITS / 4) as usize;
    for _ in 0..count {
        let sample = dev.next();
        if hex {
            println!("{sample:0width$x}", width = hex_digits);
        } else {
            println!("{sample}");
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe { json } => cmd_probe(json),
        Commands::Gen { count, width, hex } => match width.as_str() {
            "16" => cmd_gen::<u16>(count, hex),
            "32" => cmd_gen::<u32>(count, hex),
            "64" => cmd_gen::<u64>(count, hex),
            // value_parser restricts to the three widths above
            _ => unreachable!(),
        },
    }
}
