#![deny(missing_docs)]
#![doc = "Shared types for the EIC beam-shape simulator: errors, configuration, deterministic RNG and physical constants."]

use serde::{Deserialize, Serialize};

pub mod config;
pub mod constants;
pub mod errors;
pub mod rng;

pub use config::{AxisBins, BeamParams, FitGuesses, GridConfig, SimConfig};
pub use errors::{EbsError, ErrorInfo};
pub use rng::{derive_substream_seed, RngHandle};

/// Spatial axis of the overlap grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal, perpendicular to the nominal beam line.
    X,
    /// Vertical.
    Y,
    /// Longitudinal, along the nominal beam line.
    Z,
}

impl Axis {
    /// All three axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lowercase axis label used in artifact names and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl std::str::FromStr for Axis {
    type Err = EbsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(EbsError::NotFound(
                ErrorInfo::new("axis-unknown", "unknown axis label")
                    .with_context("axis", other.to_string()),
            )),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
