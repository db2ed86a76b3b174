use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    evolve::{self, EvolveArgs},
    fit_hist::{self, FitArgs},
    snapshot::{self, SnapshotArgs},
};

mod commands;
mod report;

#[derive(Parser, Debug)]
#[command(name = "ebs-sim", about = "Bunch crossing overlap simulator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute and fit the overlap densities at a single time.
    Snapshot(SnapshotArgs),
    /// Step the overlap across a time range and export the series.
    Evolve(EvolveArgs),
    /// Fit a Gaussian to a standalone histogram file.
    Fit(FitArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Snapshot(args) => snapshot::run(&args),
        Command::Evolve(args) => evolve::run(&args),
        Command::Fit(args) => fit_hist::run(&args),
    }
}
