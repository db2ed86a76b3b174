//! Overlap simulation: owned bunches, the time cursor and pairwise overlap
//! densities on the configured grid.

use ebs_core::config::GridConfig;
use ebs_core::errors::{EbsError, ErrorInfo};
use ebs_core::Axis;
use serde::{Deserialize, Serialize};

use crate::bunch::BunchModel;
use crate::hist::{check_grid, Counts3, Hist1D};

/// Identifier for a bunch owned by an [`OverlapSimulation`], assigned in
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BunchId(usize);

impl BunchId {
    /// Returns the raw index of the identifier.
    pub fn as_raw(&self) -> usize {
        self.0
    }
}

/// Raw pairwise-overlap projections for one time step.
#[derive(Debug, Clone)]
struct PairProjections {
    x: Hist1D,
    y: Hist1D,
    z: Hist1D,
}

/// Time-dependent overlap of the owned bunches.
///
/// Bunches are added before the first [`advance`](Self::advance); the grid is
/// set before the first density query. Densities are recomputed lazily per
/// time step and cached until the clock moves.
#[derive(Debug)]
pub struct OverlapSimulation {
    bunches: Vec<BunchModel>,
    grid: Option<GridConfig>,
    time_ns: f64,
    started: bool,
    cache: Option<PairProjections>,
}

impl Default for OverlapSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlapSimulation {
    /// Creates an empty simulation with the clock at zero.
    pub fn new() -> Self {
        Self {
            bunches: Vec::new(),
            grid: None,
            time_ns: 0.0,
            started: false,
            cache: None,
        }
    }

    /// Takes ownership of a bunch. Fails once the clock has moved, keeping
    /// the bunch roster fixed for a run.
    pub fn add_bunch(&mut self, bunch: BunchModel) -> Result<BunchId, EbsError> {
        if self.started {
            return Err(EbsError::InvalidParameter(ErrorInfo::new(
                "bunch-after-move",
                "bunches must be added before the first time step",
            )));
        }
        self.bunches.push(bunch);
        self.cache = None;
        Ok(BunchId(self.bunches.len() - 1))
    }

    /// Sets the overlap grid. Required before any density computation.
    pub fn set_bins(&mut self, grid: GridConfig) -> Result<(), EbsError> {
        check_grid(&grid)?;
        self.grid = Some(grid);
        self.cache = None;
        Ok(())
    }

    /// Advances every owned bunch by `dt` (ns, may be negative) and
    /// invalidates cached densities.
    pub fn advance(&mut self, dt_ns: f64) {
        for bunch in self.bunches.iter_mut() {
            bunch.advance(dt_ns);
        }
        self.time_ns += dt_ns;
        self.started = true;
        self.cache = None;
    }

    /// Current simulation time in ns.
    pub fn time(&self) -> f64 {
        self.time_ns
    }

    /// Number of owned bunches.
    pub fn bunch_count(&self) -> usize {
        self.bunches.len()
    }

    /// Read access to a bunch by identifier.
    pub fn get_bunch(&self, id: BunchId) -> Result<&BunchModel, EbsError> {
        self.bunches.get(id.0).ok_or_else(|| {
            EbsError::NotFound(
                ErrorInfo::new("bunch-unknown", "no bunch with the requested id")
                    .with_context("id", id.0.to_string()),
            )
        })
    }

    fn binned_bunches(&self, grid: &GridConfig) -> Result<Vec<Counts3>, EbsError> {
        self.bunches
            .iter()
            .map(|bunch| {
                let mut counts = Counts3::new(*grid)?;
                for i in 0..bunch.particles() {
                    counts.fill(&bunch.position(i));
                }
                Ok(counts)
            })
            .collect()
    }

    fn compute_projections(&self) -> Result<PairProjections, EbsError> {
        let grid = self.grid.ok_or_else(|| {
            EbsError::InvalidParameter(ErrorInfo::new(
                "bins-unset",
                "grid must be set before density computation",
            ))
        })?;
        if self.bunches.len() < 2 {
            return Err(EbsError::invalid_parameter(
                "bunches-missing",
                "overlap requires at least two bunches",
                "bunches",
                self.bunches.len(),
            ));
        }

        let binned = self.binned_bunches(&grid)?;

        // Per-cell minimum over each distinct pair, summed across pairs.
        let mut pairs = Counts3::new(grid)?;
        for (i, a) in binned.iter().enumerate() {
            for b in binned.iter().skip(i + 1) {
                pairs.accumulate(&a.pair_min(b));
            }
        }

        Ok(PairProjections {
            x: pairs.project(Axis::X),
            y: pairs.project(Axis::Y),
            z: pairs.project(Axis::Z),
        })
    }

    fn projections(&mut self) -> Result<&PairProjections, EbsError> {
        if self.cache.is_none() {
            self.cache = Some(self.compute_projections()?);
        }
        Ok(self.cache.as_ref().expect("cache populated above"))
    }

    /// Raw pairwise-overlap counts projected onto one axis at the current
    /// time, before density normalization.
    pub fn pair_counts(&mut self, axis: Axis) -> Result<Hist1D, EbsError> {
        let projections = self.projections()?;
        Ok(match axis {
            Axis::X => projections.x.clone(),
            Axis::Y => projections.y.clone(),
            Axis::Z => projections.z.clone(),
        })
    }

    /// Pairwise overlap of the bunches along one axis at the current time,
    /// normalized to a probability density.
    pub fn density(&mut self, axis: Axis) -> Result<Hist1D, EbsError> {
        let mut hist = self.pair_counts(axis)?;
        hist.normalize_density().map_err(|err| {
            EbsError::InvalidParameter(
                err.info()
                    .clone()
                    .with_context("axis", axis.label())
                    .with_context("time_ns", self.time_ns.to_string()),
            )
        })?;
        Ok(hist)
    }
}
