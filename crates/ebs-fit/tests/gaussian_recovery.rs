use ebs_fit::{fit_gaussian, normal_pdf, FitOpts, FitResult};
use ebs_core::EbsError;

fn analytic_histogram(mean: f64, sigma: f64, bins: usize, lo: f64, hi: f64) -> (Vec<f64>, Vec<f64>) {
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
    let content: Vec<f64> = (0..bins)
        .map(|i| normal_pdf(lo + (i as f64 + 0.5) * width, mean, sigma))
        .collect();
    (edges, content)
}

fn fit(edges: &[f64], content: &[f64], opts: &FitOpts) -> FitResult {
    fit_gaussian(edges, content, opts).expect("fit converges")
}

#[test]
fn recovers_standard_normal_from_default_start() {
    let (edges, content) = analytic_histogram(0.0, 1.0, 50, -5.0, 5.0);
    let result = fit(&edges, &content, &FitOpts::default());
    assert!(result.mean.abs() < 0.01);
    assert!((result.sigma - 1.0).abs() / 1.0 < 0.01);
    // An exact model has vanishing residuals and uncertainties.
    assert!(result.residual_norm < 1e-6);
    assert!(result.mean_err < 1e-3);
    assert!(result.sigma_err < 1e-3);
}

#[test]
fn recovers_offset_narrow_peak_with_explicit_guess() {
    let (edges, content) = analytic_histogram(-42.0, 12.0, 200, -300.0, 300.0);
    let opts = FitOpts {
        initial_guess: Some((0.0, 10.0)),
        ..FitOpts::default()
    };
    let result = fit(&edges, &content, &opts);
    assert!((result.mean + 42.0).abs() < 0.1);
    assert!((result.sigma - 12.0).abs() / 12.0 < 0.01);
}

#[test]
fn noisy_histogram_reports_finite_uncertainties() {
    let (edges, mut content) = analytic_histogram(1.5, 2.0, 80, -10.0, 10.0);
    // Deterministic few-percent distortion standing in for sampling noise.
    for (i, bin) in content.iter_mut().enumerate() {
        *bin *= 1.0 + 0.03 * ((i as f64 * 0.7).sin());
    }
    let result = fit(&edges, &content, &FitOpts::default());
    assert!((result.mean - 1.5).abs() < 0.1);
    assert!((result.sigma - 2.0).abs() / 2.0 < 0.05);
    assert!(result.mean_err > 0.0 && result.mean_err.is_finite());
    assert!(result.sigma_err > 0.0 && result.sigma_err.is_finite());
}

#[test]
fn mismatched_lengths_are_rejected() {
    let err = fit_gaussian(&[0.0, 1.0, 2.0], &[1.0], &FitOpts::default())
        .expect_err("shape mismatch");
    assert!(matches!(err, EbsError::InvalidParameter(_)));
    assert_eq!(err.info().code, "hist-shape");
}

#[test]
fn underdetermined_histogram_is_rejected() {
    let err = fit_gaussian(&[0.0, 1.0, 2.0], &[0.2, 0.3], &FitOpts::default())
        .expect_err("two bins cannot constrain two parameters");
    assert_eq!(err.info().code, "hist-underdetermined");
}

#[test]
fn non_positive_starting_sigma_is_rejected() {
    let (edges, content) = analytic_histogram(0.0, 1.0, 50, -5.0, 5.0);
    let opts = FitOpts {
        initial_guess: Some((0.0, 0.0)),
        ..FitOpts::default()
    };
    let err = fit_gaussian(&edges, &content, &opts).expect_err("zero sigma start");
    assert_eq!(err.info().code, "guess-invalid");
}

#[test]
fn exhausted_iteration_budget_surfaces_convergence_error() {
    let (edges, content) = analytic_histogram(-42.0, 12.0, 200, -300.0, 300.0);
    let opts = FitOpts {
        initial_guess: Some((250.0, 0.5)),
        max_iters: 2,
        ..FitOpts::default()
    };
    let err = fit_gaussian(&edges, &content, &opts).expect_err("budget too small");
    assert!(matches!(err, EbsError::FitConvergence(_)));
    assert_eq!(err.info().code, "iters-exhausted");
}

#[test]
fn fit_result_serializes() {
    let (edges, content) = analytic_histogram(0.0, 1.0, 50, -5.0, 5.0);
    let result = fit(&edges, &content, &FitOpts::default());
    let json = serde_json::to_string(&result).expect("serialize");
    let back: FitResult = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(result, back);
}
