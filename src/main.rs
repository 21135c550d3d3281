//! Command-line interface for the SID relocation tool
//!
//! Usage: sid-relocator [SET] [--analyze-only] [--verbose] [--output DIR]
//!
//! This program is unlicensed and dedicated to the public domain.
//! Developed by the EVO64 Super Quattro project.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use sid_relocator::config::{set_names, tune_set, Config, VERSION};
use sid_relocator::process_set::{ProcessOptions, ProcessSet};

#[derive(Debug, Parser)]
#[command(
    name = "sid-relocator",
    version = VERSION,
    about = "Relocates and patches SID-WIZARD tunes for the EVO64 Super Quattro quad-SID player"
)]
struct Args {
    /// Tune set to process
    #[arg(default_value = "quadcore")]
    set: String,

    /// Analyze the binaries without writing any output
    #[arg(long)]
    analyze_only: bool,

    /// Print every individual patch
    #[arg(long, short)]
    verbose: bool,

    /// Output directory for the binaries and the include file
    #[arg(long, short, default_value = "build")]
    output: PathBuf,

    /// Path to KickAss.jar (overrides the KICKASS_JAR environment variable)
    #[arg(long)]
    kickass_jar: Option<PathBuf>,

    /// Assemble the given player source with KickAssembler after processing
    #[arg(long)]
    assemble: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    println!("{}", "=".repeat(70));
    println!("  EVO64 Super Quattro - SID Relocator v{}", VERSION);
    println!("{}", "=".repeat(70));

    let jobs = match tune_set(&args.set) {
        Some(jobs) => jobs,
        None => {
            eprintln!("Error: Unknown tune set '{}'", args.set);
            eprintln!("Available sets: {}", set_names().join(", "));
            process::exit(1);
        }
    };

    let mut config = Config::new(&args.output);
    config.kickass_jar = args.kickass_jar;

    let options = ProcessOptions {
        analyze_only: args.analyze_only,
        verbose: args.verbose,
        assemble: args.assemble,
    };

    match ProcessSet::new(config).process(&jobs, &options) {
        Ok(()) => {
            println!();
            println!("✓ Success!");
            println!();
            process::exit(0);
        }
        Err(e) => {
            eprintln!();
            eprintln!("✗ Processing failed:");
            eprintln!("  {}", e);
            eprintln!();
            process::exit(1);
        }
    }
}
