// Licensed under the Apache-2.0 license

use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Generates pin-mapping headers and sources from family CSV tables.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Pin-mapping CSV files, one per family member
    #[arg(required = true)]
    csv: Vec<PathBuf>,

    /// Directory the generated files are written below
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Also write the XML family description
    #[arg(long)]
    xml: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> Result<()> {
    for path in &cli.csv {
        let info = pinmap_generator::parse_file(path)?;
        pinmap_generator::write_all(&info, &cli.output, cli.xml)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = SimpleLogger::new().with_level(level).init();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}
