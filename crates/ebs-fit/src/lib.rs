#![deny(missing_docs)]
#![doc = "Gaussian profile extraction: nonlinear least squares of a normal pdf against a binned density, with propagated parameter uncertainties."]

pub mod gaussian;

pub use gaussian::{fit_gaussian, normal_pdf, FitOpts, FitResult};
