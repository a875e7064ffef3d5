//! Command-line entry point.
//!
//! Usage:
//!   autoscan <module> [--max-examples N] [--quant] [--seed S] [-v...]
//!   autoscan list
//!
//! Exit status is 0 when every example passed, 1 on a failing case and 2 on a
//! harness error.

use std::process::ExitCode;
use std::str::FromStr;

use autoscan::{OpModule, ScanConfig, SearchDriver};
use clap::Parser;
use strum::VariantArray;
use tracing_subscriber::EnvFilter;

/// Generative differential testing of operator kernels.
#[derive(Debug, Parser)]
#[command(name = "autoscan", version, about, long_about = None)]
struct Cli {
    /// Operator module to scan, or `list` to show the available modules.
    module: String,

    /// Example bound, overriding the module default.
    #[arg(long)]
    max_examples: Option<u32>,

    /// Fake-quantize float inputs and enable int8 configs.
    #[arg(long)]
    quant: bool,

    /// Seed of the draw source.
    #[arg(long)]
    seed: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    if cli.module == "list" {
        for module in OpModule::VARIANTS {
            println!("{:<12} {}", module.name(), module.description());
        }
        return ExitCode::SUCCESS;
    }

    let module = match OpModule::from_str(&cli.module) {
        Ok(module) => module,
        Err(_) => {
            eprintln!("error: {}", autoscan::Error::UnknownModule { name: cli.module });
            return ExitCode::from(2);
        }
    };

    let config = ScanConfig::from_env().with_overrides(cli.seed, cli.max_examples, cli.quant);

    match module.run(&SearchDriver::new(config)) {
        Ok(report) => {
            print!("{report}");
            if report.passed() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(2)
        }
    }
}
