use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use ebs_core::Axis;
use ebs_fit::{fit_gaussian, FitOpts};
use ebs_model::Hist1D;

use super::serde_error;
use crate::report::Report;

#[derive(Args, Debug)]
pub struct FitArgs {
    /// Histogram JSON with `edges` and `content` arrays.
    #[arg(long)]
    pub input: PathBuf,
    /// Report file receiving the result lines.
    #[arg(long, default_value = "out.txt")]
    pub report: PathBuf,
    /// Axis label used for the report lines.
    #[arg(long, default_value = "z")]
    pub axis: Axis,
    /// Starting mean for the fit.
    #[arg(long, requires = "sigma0", allow_hyphen_values = true)]
    pub mu0: Option<f64>,
    /// Starting sigma for the fit.
    #[arg(long, requires = "mu0")]
    pub sigma0: Option<f64>,
    /// Normalize the content to a probability density before fitting.
    #[arg(long)]
    pub normalize: bool,
}

pub fn run(args: &FitArgs) -> Result<(), Box<dyn Error>> {
    let json = fs::read_to_string(&args.input)?;
    let mut hist: Hist1D =
        serde_json::from_str(&json).map_err(|err| serde_error("hist-json", err, &args.input))?;
    if args.normalize {
        hist.normalize_density()?;
    }

    let initial_guess = match (args.mu0, args.sigma0) {
        (Some(mu), Some(sigma)) => Some((mu, sigma)),
        _ => None,
    };
    let opts = FitOpts {
        initial_guess,
        ..FitOpts::default()
    };
    let fit = fit_gaussian(&hist.edges, &hist.content, &opts)?;

    println!(
        "mu_{} = {:.6} +- {:.6}",
        args.axis, fit.mean, fit.mean_err
    );
    println!(
        "sigma_{} = {:.6} +- {:.6}",
        args.axis, fit.sigma, fit.sigma_err
    );

    let mut log = Report::open(&args.report)?;
    log.append_fit(args.axis, &fit)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebs_core::EbsError;
    use ebs_fit::normal_pdf;

    #[test]
    fn malformed_histogram_surfaces_structured_serde_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("hist.json");
        fs::write(&input, "{\"edges\": [0.0, 1.0], \"content\": \"oops\"}").expect("write");

        let args = FitArgs {
            input,
            report: dir.path().join("out.txt"),
            axis: Axis::Z,
            mu0: None,
            sigma0: None,
            normalize: false,
        };
        let err = run(&args).expect_err("histogram must not parse");
        let err = err.downcast_ref::<EbsError>().expect("structured error");
        assert!(matches!(err, EbsError::Serde(_)));
        assert_eq!(err.info().code, "hist-json");
    }

    #[test]
    fn standalone_histogram_is_fitted_and_logged() {
        let dir = tempfile::tempdir().expect("temp dir");
        let edges: Vec<f64> = (0..=120).map(|i| -30.0 + i as f64 * 0.5).collect();
        let content: Vec<f64> = edges
            .windows(2)
            .map(|pair| normal_pdf(0.5 * (pair[0] + pair[1]), -4.0, 6.5))
            .collect();
        let hist = Hist1D::from_parts(edges, content).expect("valid histogram");
        let input = dir.path().join("hist.json");
        fs::write(&input, serde_json::to_string(&hist).expect("serialize")).expect("write");

        let args = FitArgs {
            input,
            report: dir.path().join("out.txt"),
            axis: Axis::Z,
            mu0: Some(0.0),
            sigma0: Some(10.0),
            normalize: false,
        };
        run(&args).expect("fit runs");

        let text = fs::read_to_string(&args.report).expect("read report");
        assert!(text.contains("mu_z (mm):    -4.00"));
        assert!(text.contains("sigma_z (mm): 6.50"));
    }
}
