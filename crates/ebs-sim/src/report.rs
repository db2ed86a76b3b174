//! Cumulative human-readable report of fitted overlap widths.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use ebs_core::Axis;
use ebs_fit::FitResult;

/// Append-only text sink collecting fit results across runs.
#[derive(Debug)]
pub struct Report {
    file: File,
}

impl Report {
    /// Opens the report file for appending, creating it when missing.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Appends the fitted mean and width for one axis.
    ///
    /// Horizontal and longitudinal results are reported in mm; the vertical
    /// overlap is narrow enough that its result is reported in micrometers.
    pub fn append_fit(&mut self, axis: Axis, fit: &FitResult) -> io::Result<()> {
        match axis {
            Axis::X => {
                writeln!(
                    self.file,
                    "    mu_x (mm):    {:.4} +- {:.4}",
                    fit.mean, fit.mean_err
                )?;
                writeln!(
                    self.file,
                    "    sigma_x (mm): {:.4} +- {:.4}",
                    fit.sigma, fit.sigma_err
                )?;
            }
            Axis::Y => {
                writeln!(
                    self.file,
                    "    mu_y (um):    {:.4} +- {:.4}",
                    fit.mean * 1e3,
                    fit.mean_err * 1e3
                )?;
                writeln!(
                    self.file,
                    "    sigma_y (um): {:.4} +- {:.4}",
                    fit.sigma * 1e3,
                    fit.sigma_err * 1e3
                )?;
            }
            Axis::Z => {
                writeln!(
                    self.file,
                    "    mu_z (mm):    {:.2} +- {:.2}",
                    fit.mean, fit.mean_err
                )?;
                writeln!(
                    self.file,
                    "    sigma_z (mm): {:.2} +- {:.2}",
                    fit.sigma, fit.sigma_err
                )?;
            }
        }
        writeln!(self.file)
    }
}
