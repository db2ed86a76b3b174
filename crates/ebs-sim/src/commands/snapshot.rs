use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use ebs_core::Axis;
use ebs_fit::{fit_gaussian, FitResult};
use ebs_model::build_simulation;
use serde::Serialize;

use super::{fit_opts, load_config, write_json};
use crate::report::Report;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for artifacts.
    #[arg(long)]
    pub out: PathBuf,
    /// Time of the snapshot in ns, zero is the nominal crossing.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub time: f64,
}

#[derive(Debug, Serialize)]
struct AxisFit {
    axis: Axis,
    #[serde(flatten)]
    fit: FitResult,
}

pub fn run(args: &SnapshotArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let config = load_config(&args.config)?;
    let mut sim = build_simulation(&config)?;
    sim.advance(args.time);

    let mut report = Report::open(&args.out.join("out.txt"))?;
    let mut fits = Vec::new();
    for axis in Axis::ALL {
        let density = sim.density(axis)?;
        write_json(&args.out.join(format!("density_{axis}.json")), &density)?;
        let fit = fit_gaussian(&density.edges, &density.content, &fit_opts(&config.fit, axis))?;
        report.append_fit(axis, &fit)?;
        fits.push(AxisFit { axis, fit });
    }
    write_json(&args.out.join("fits.json"), &fits)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebs_core::config::{AxisBins, BeamParams, FitGuesses, GridConfig, SimConfig};

    fn beam() -> BeamParams {
        // sigma_x = sigma_y = 0.3 mm, sigma_z = 30 mm.
        BeamParams {
            particles: 8_000,
            emittance_x_nm: 100.0,
            beta_star_x_cm: 90.0,
            emittance_y_nm: 100.0,
            beta_star_y_cm: 90.0,
            bunch_length_cm: 3.0,
            energy_gev: 18.0,
        }
    }

    fn config() -> SimConfig {
        SimConfig {
            cross_angle_mrad: 25.0,
            y_angle_urad: 0.0,
            electron: beam(),
            hadron: BeamParams {
                energy_gev: 275.0,
                ..beam()
            },
            mass_number: 1,
            charge_number: 1,
            binning: GridConfig {
                x: AxisBins::new(60, -2.0, 2.0),
                y: AxisBins::new(60, -2.0, 2.0),
                z: AxisBins::new(60, -200.0, 200.0),
            },
            seed: 7,
            fit: FitGuesses {
                x: Some((0.0, 0.3)),
                y: Some((0.0, 0.3)),
                z: Some((0.0, 10.0)),
            },
        }
    }

    #[test]
    fn snapshot_writes_artifacts_and_report() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("run.yaml");
        let yaml = serde_yaml::to_string(&config()).expect("serialize config");
        fs::write(&config_path, yaml).expect("write config");

        let args = SnapshotArgs {
            config: config_path,
            out: dir.path().join("out"),
            time: 0.0,
        };
        run(&args).expect("snapshot runs");

        for axis in Axis::ALL {
            assert!(args.out.join(format!("density_{axis}.json")).exists());
        }
        assert!(args.out.join("fits.json").exists());
        let text = fs::read_to_string(args.out.join("out.txt")).expect("read report");
        assert!(text.contains("mu_x (mm):"));
        assert!(text.contains("sigma_y (um):"));
        assert!(text.contains("sigma_z (mm):"));
    }
}
