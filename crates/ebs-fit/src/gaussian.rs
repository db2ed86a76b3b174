//! Nonlinear least-squares fit of a normal probability density to a binned
//! distribution.

use ebs_core::errors::{EbsError, ErrorInfo};
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

fn default_max_iters() -> usize {
    64
}

fn default_tolerance() -> f64 {
    1e-10
}

/// Options controlling the Gaussian fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOpts {
    /// Starting `(mean, sigma)`. Defaults to the solver's all-ones start;
    /// narrow distributions offset from the origin need an explicit guess.
    #[serde(default)]
    pub initial_guess: Option<(f64, f64)>,
    /// Iteration budget for the solver.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    /// Relative cost-decrease threshold declaring convergence.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for FitOpts {
    fn default() -> Self {
        Self {
            initial_guess: None,
            max_iters: default_max_iters(),
            tolerance: default_tolerance(),
        }
    }
}

/// Location and scale of a fitted Gaussian with one-sigma uncertainties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Fitted location (mean).
    pub mean: f64,
    /// Fitted scale (sigma), always positive.
    pub sigma: f64,
    /// Standard error of the mean from the fit covariance.
    pub mean_err: f64,
    /// Standard error of the sigma from the fit covariance.
    pub sigma_err: f64,
    /// Euclidean norm of the residuals at the solution.
    pub residual_norm: f64,
    /// Solver iterations spent.
    pub iterations: usize,
}

/// Normal probability density.
pub fn normal_pdf(x: f64, mean: f64, sigma: f64) -> f64 {
    let norm = 1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt());
    let pull = (x - mean) / sigma;
    norm * (-0.5 * pull * pull).exp()
}

fn fit_error(code: &str, message: impl Into<String>) -> EbsError {
    EbsError::FitConvergence(ErrorInfo::new(code, message.into()))
}

struct Residuals {
    values: Vec<f64>,
    cost: f64,
}

fn residuals(centers: &[f64], content: &[f64], mean: f64, sigma: f64) -> Residuals {
    let values: Vec<f64> = centers
        .iter()
        .zip(content.iter())
        .map(|(&x, &y)| y - normal_pdf(x, mean, sigma))
        .collect();
    let cost = values.iter().map(|r| r * r).sum();
    Residuals { values, cost }
}

/// Accumulates the 2x2 normal matrix and gradient for the current parameters.
fn normal_system(
    centers: &[f64],
    resid: &Residuals,
    mean: f64,
    sigma: f64,
) -> (Matrix2<f64>, Vector2<f64>) {
    let mut jtj = Matrix2::zeros();
    let mut jtr = Vector2::zeros();
    for (&x, &r) in centers.iter().zip(resid.values.iter()) {
        let f = normal_pdf(x, mean, sigma);
        let pull = (x - mean) / sigma;
        // Analytic Jacobian of the model (not of the residual, hence the
        // sign flip when accumulating the gradient).
        let d_mean = f * pull / sigma;
        let d_sigma = f * (pull * pull - 1.0) / sigma;
        jtj[(0, 0)] += d_mean * d_mean;
        jtj[(0, 1)] += d_mean * d_sigma;
        jtj[(1, 1)] += d_sigma * d_sigma;
        jtr[0] += d_mean * r;
        jtr[1] += d_sigma * r;
    }
    jtj[(1, 0)] = jtj[(0, 1)];
    (jtj, jtr)
}

/// Fits a normal pdf to `(bin centers, content)` by Levenberg-Marquardt.
///
/// Bin centers are midpoints of adjacent `edges`. Parameter uncertainties
/// are the square roots of the diagonal of `(J^T J)^-1 * s^2` with
/// `s^2 = SSR / (n - 2)`, the covariance convention of standard curve-fit
/// routines.
pub fn fit_gaussian(edges: &[f64], content: &[f64], opts: &FitOpts) -> Result<FitResult, EbsError> {
    if edges.len() != content.len() + 1 {
        return Err(EbsError::InvalidParameter(
            ErrorInfo::new("hist-shape", "edges must outnumber content by one")
                .with_context("edges", edges.len().to_string())
                .with_context("content", content.len().to_string()),
        ));
    }
    if content.len() < 3 {
        return Err(EbsError::invalid_parameter(
            "hist-underdetermined",
            "at least three bins are required for a two-parameter fit",
            "bins",
            content.len(),
        ));
    }

    let centers: Vec<f64> = edges.windows(2).map(|pair| 0.5 * (pair[0] + pair[1])).collect();
    let (mut mean, mut sigma) = opts.initial_guess.unwrap_or((1.0, 1.0));
    if sigma <= 0.0 {
        return Err(EbsError::invalid_parameter(
            "guess-invalid",
            "starting sigma must be positive",
            "sigma",
            sigma,
        ));
    }

    let mut current = residuals(&centers, content, mean, sigma);
    let mut lambda = 1e-3;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < opts.max_iters {
        iterations += 1;
        let (jtj, jtr) = normal_system(&centers, &current, mean, sigma);

        // Exactly vanishing gradient: the solution reproduces the data.
        if jtr[0] == 0.0 && jtr[1] == 0.0 {
            converged = true;
            break;
        }

        let mut damped = jtj;
        damped[(0, 0)] += lambda * jtj[(0, 0)].max(f64::EPSILON);
        damped[(1, 1)] += lambda * jtj[(1, 1)].max(f64::EPSILON);

        let Some(inverse) = damped.try_inverse() else {
            return Err(fit_error("normal-singular", "normal matrix is singular"));
        };
        let step = inverse * jtr;
        let trial_mean = mean + step[0];
        let trial_sigma = sigma + step[1];

        if !trial_sigma.is_finite() || !trial_mean.is_finite() || trial_sigma == 0.0 {
            lambda *= 10.0;
            continue;
        }

        let trial = residuals(&centers, content, trial_mean, trial_sigma);
        if trial.cost < current.cost {
            let decrease = current.cost - trial.cost;
            mean = trial_mean;
            sigma = trial_sigma;
            current = trial;
            lambda = (lambda / 10.0).max(1e-12);
            if decrease <= opts.tolerance * current.cost.max(opts.tolerance) {
                converged = true;
                break;
            }
        } else if trial.cost == current.cost {
            // No further progress is possible in floating point.
            mean = trial_mean;
            sigma = trial_sigma;
            current = trial;
            converged = true;
            break;
        } else {
            lambda *= 10.0;
        }
    }

    if !converged {
        return Err(EbsError::FitConvergence(
            ErrorInfo::new("iters-exhausted", "fit did not converge within the iteration budget")
                .with_context("max_iters", opts.max_iters.to_string())
                .with_context("cost", current.cost.to_string()),
        ));
    }

    // A converged negative sigma is a mirror solution; report the scale.
    sigma = sigma.abs();

    let (jtj, _) = normal_system(&centers, &current, mean, sigma);
    let Some(covariance) = jtj.try_inverse() else {
        return Err(fit_error("covariance-singular", "fit covariance is singular"));
    };
    let dof = (content.len() - 2) as f64;
    let variance_scale = current.cost / dof;
    let mean_var = covariance[(0, 0)] * variance_scale;
    let sigma_var = covariance[(1, 1)] * variance_scale;
    if mean_var < 0.0 || sigma_var < 0.0 {
        return Err(fit_error(
            "covariance-indefinite",
            "fit covariance has negative diagonal entries",
        ));
    }

    Ok(FitResult {
        mean,
        sigma,
        mean_err: mean_var.sqrt(),
        sigma_err: sigma_var.sqrt(),
        residual_norm: current.cost.sqrt(),
        iterations,
    })
}
