//! Typed run configuration for the beam-shape simulator.
//!
//! Every parameter previously looked up by string name in the original
//! configuration files has a named, validated field here. The record is
//! constructed once (usually from YAML) and passed by reference into the
//! simulation builder.

use serde::{Deserialize, Serialize};

use crate::errors::{EbsError, ErrorInfo};

/// Gaussian beam parameters for one colliding species.
///
/// Transverse widths follow accelerator optics conventions: the physical RMS
/// size is derived from the normalized emittance and the beta function at
/// the interaction point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamParams {
    /// Number of sampled particles in the bunch.
    pub particles: u32,
    /// RMS horizontal emittance in nm.
    pub emittance_x_nm: f64,
    /// Horizontal beta* in cm.
    pub beta_star_x_cm: f64,
    /// RMS vertical emittance in nm.
    pub emittance_y_nm: f64,
    /// Vertical beta* in cm.
    pub beta_star_y_cm: f64,
    /// RMS bunch length in cm.
    pub bunch_length_cm: f64,
    /// Beam energy in GeV (per nucleon for ion species).
    pub energy_gev: f64,
}

/// Binning of a single histogram axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBins {
    /// Number of bins, must be positive.
    pub bins: u32,
    /// Lower edge in mm.
    pub min: f64,
    /// Upper edge in mm, must exceed `min`.
    pub max: f64,
}

impl AxisBins {
    /// Creates a new axis specification.
    pub fn new(bins: u32, min: f64, max: f64) -> Self {
        Self { bins, min, max }
    }

    /// Uniform bin width for this axis.
    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.bins as f64
    }

    /// Checks the bin count and range ordering, naming the axis in the
    /// error context.
    pub fn validate(&self, name: &str) -> Result<(), EbsError> {
        if self.bins == 0 {
            return Err(EbsError::invalid_parameter(
                "bins-empty",
                "bin count must be positive",
                "axis",
                name,
            ));
        }
        if self.min >= self.max {
            return Err(EbsError::InvalidParameter(
                ErrorInfo::new("bins-inverted", "axis range must be ordered")
                    .with_context("axis", name)
                    .with_context("min", self.min.to_string())
                    .with_context("max", self.max.to_string()),
            ));
        }
        Ok(())
    }
}

/// Three-dimensional binning of the overlap grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Horizontal axis binning.
    #[serde(default = "default_bins_x")]
    pub x: AxisBins,
    /// Vertical axis binning.
    #[serde(default = "default_bins_y")]
    pub y: AxisBins,
    /// Longitudinal axis binning.
    #[serde(default = "default_bins_z")]
    pub z: AxisBins,
}

fn default_bins_x() -> AxisBins {
    AxisBins::new(60, -2.0, 2.0)
}

fn default_bins_y() -> AxisBins {
    AxisBins::new(60, -2.0, 2.0)
}

fn default_bins_z() -> AxisBins {
    AxisBins::new(60, -200.0, 200.0)
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            x: default_bins_x(),
            y: default_bins_y(),
            z: default_bins_z(),
        }
    }
}

/// Optional Gaussian fit starting points per axis.
///
/// The longitudinal overlap is strongly peaked away from unit scale, where
/// the solver default start diverges, so runs usually pin `z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitGuesses {
    /// Starting `(mean, sigma)` for the horizontal fit.
    #[serde(default)]
    pub x: Option<(f64, f64)>,
    /// Starting `(mean, sigma)` for the vertical fit.
    #[serde(default)]
    pub y: Option<(f64, f64)>,
    /// Starting `(mean, sigma)` for the longitudinal fit.
    #[serde(default = "default_guess_z")]
    pub z: Option<(f64, f64)>,
}

fn default_guess_z() -> Option<(f64, f64)> {
    Some((0.0, 10.0))
}

impl Default for FitGuesses {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            z: default_guess_z(),
        }
    }
}

/// Complete configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Full crossing angle between the two beams in mrad.
    pub cross_angle_mrad: f64,
    /// Vertical tilt of the hadron beam in urad.
    #[serde(default)]
    pub y_angle_urad: f64,
    /// Electron beam parameters.
    pub electron: BeamParams,
    /// Hadron (proton or nucleus) beam parameters.
    pub hadron: BeamParams,
    /// Nucleus mass number A for the hadron beam.
    #[serde(default = "default_nucleon_one")]
    pub mass_number: u32,
    /// Nucleus charge number Z for the hadron beam.
    #[serde(default = "default_nucleon_one")]
    pub charge_number: u32,
    /// Overlap grid binning.
    #[serde(default)]
    pub binning: GridConfig,
    /// Master seed for particle sampling.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Fit starting points per axis.
    #[serde(default)]
    pub fit: FitGuesses,
}

fn default_nucleon_one() -> u32 {
    1
}

fn default_seed() -> u64 {
    12345
}

fn check_beam(beam: &BeamParams, name: &str) -> Result<(), EbsError> {
    if beam.particles == 0 {
        return Err(EbsError::invalid_parameter(
            "population-empty",
            format!("{name} bunch requires a positive particle count"),
            "beam",
            name,
        ));
    }
    let spreads = [
        ("emittance_x_nm", beam.emittance_x_nm),
        ("beta_star_x_cm", beam.beta_star_x_cm),
        ("emittance_y_nm", beam.emittance_y_nm),
        ("beta_star_y_cm", beam.beta_star_y_cm),
        ("bunch_length_cm", beam.bunch_length_cm),
    ];
    for (field, value) in spreads {
        if value < 0.0 {
            return Err(EbsError::InvalidParameter(
                ErrorInfo::new("spread-negative", format!("{name} bunch has a negative spread"))
                    .with_context("beam", name)
                    .with_context("field", field)
                    .with_context("value", value.to_string()),
            ));
        }
    }
    if beam.energy_gev <= 0.0 {
        return Err(EbsError::invalid_parameter(
            "energy-nonpositive",
            format!("{name} beam energy must be positive"),
            "beam",
            name,
        ));
    }
    Ok(())
}

impl SimConfig {
    /// Validates the configuration, surfacing the first inconsistency found.
    pub fn validate(&self) -> Result<(), EbsError> {
        check_beam(&self.electron, "electron")?;
        check_beam(&self.hadron, "hadron")?;
        if self.mass_number == 0 || self.charge_number == 0 {
            return Err(EbsError::invalid_parameter(
                "nucleus-invalid",
                "mass and charge numbers must be positive",
                "mass_number",
                self.mass_number,
            ));
        }
        self.binning.x.validate("x")?;
        self.binning.y.validate("y")?;
        self.binning.z.validate("z")?;
        Ok(())
    }
}
