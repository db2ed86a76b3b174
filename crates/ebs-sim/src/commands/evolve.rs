use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use ebs_core::Axis;
use ebs_fit::fit_gaussian;
use ebs_model::{
    build_simulation, EvolutionReport, EvolutionSeries, EvolutionTracker, IntegralSummary,
    OverlapSimulation, OverlapSummary, PeakSummary,
};

use super::{fit_opts, load_config, write_json};
use crate::report::Report;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SummaryKind {
    /// Total pair count per step.
    Integral,
    /// Largest bin content per step.
    Peak,
}

#[derive(Args, Debug)]
pub struct EvolveArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for artifacts.
    #[arg(long)]
    pub out: PathBuf,
    /// Start of the time range in ns.
    #[arg(long, allow_hyphen_values = true)]
    pub tmin: f64,
    /// End of the time range in ns, exclusive.
    #[arg(long, allow_hyphen_values = true)]
    pub tmax: f64,
    /// Number of uniform time steps.
    #[arg(long, default_value_t = 200)]
    pub steps: u32,
    /// Per-step reduction recorded in the series.
    #[arg(long, value_enum, default_value_t = SummaryKind::Integral)]
    pub summary: SummaryKind,
}

pub fn run(args: &EvolveArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let config = load_config(&args.config)?;
    let sim = build_simulation(&config)?;
    let report = match args.summary {
        SummaryKind::Integral => run_tracker(sim, IntegralSummary, args)?,
        SummaryKind::Peak => run_tracker(sim, PeakSummary, args)?,
    };

    let mut log = Report::open(&args.out.join("out.txt"))?;
    for axis in Axis::ALL {
        let out = report.axis(axis);
        write_series_csv(&args.out.join(format!("evolution_{axis}.csv")), &out.series)?;
        write_json(&args.out.join(format!("integrated_{axis}.json")), &out.integrated)?;

        let mut density = out.integrated.clone();
        density.normalize_density()?;
        let fit = fit_gaussian(&density.edges, &density.content, &fit_opts(&config.fit, axis))?;
        log.append_fit(axis, &fit)?;
    }
    Ok(())
}

fn run_tracker<S: OverlapSummary>(
    sim: OverlapSimulation,
    summary: S,
    args: &EvolveArgs,
) -> Result<EvolutionReport, Box<dyn Error>> {
    let mut tracker = EvolutionTracker::new(sim, summary);
    Ok(tracker.run(args.tmin, args.tmax, args.steps)?)
}

fn write_series_csv(path: &Path, series: &EvolutionSeries) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    for sample in &series.samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}
