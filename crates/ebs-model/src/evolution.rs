//! Time evolution: drives the simulation over a time range and accumulates
//! per-step overlap summaries and time-integrated histograms.

use ebs_core::errors::{EbsError, ErrorInfo};
use ebs_core::Axis;
use serde::{Deserialize, Serialize};

use crate::hist::Hist1D;
use crate::sim::OverlapSimulation;

/// Scalar reduction of a per-step overlap histogram.
///
/// Implementations must be pure so that every step is sampled consistently.
pub trait OverlapSummary {
    /// Reduces one axis histogram of raw pair counts to a scalar.
    fn reduce(&self, hist: &Hist1D) -> f64;
}

/// Total pair count per step, the integrated-overlap (pseudo-luminosity)
/// reduction.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegralSummary;

impl OverlapSummary for IntegralSummary {
    fn reduce(&self, hist: &Hist1D) -> f64 {
        hist.total()
    }
}

/// Largest bin content per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeakSummary;

impl OverlapSummary for PeakSummary {
    fn reduce(&self, hist: &Hist1D) -> f64 {
        hist.maximum()
    }
}

/// One recorded time sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSample {
    /// Simulation time of the sample in ns.
    pub time_ns: f64,
    /// Reduced overlap value at that time.
    pub value: f64,
}

/// Append-only series of `(time, value)` samples for one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionSeries {
    /// Axis the series belongs to.
    pub axis: Axis,
    /// Recorded samples in time order.
    pub samples: Vec<EvolutionSample>,
}

/// Evolution output for one axis: the sampled series and the histogram of
/// pair counts integrated over all recorded steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisEvolution {
    /// Per-step series of reduced overlap values.
    pub series: EvolutionSeries,
    /// Time-integrated pair counts along the axis.
    pub integrated: Hist1D,
}

/// Complete output of one evolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionReport {
    /// Horizontal axis output.
    pub x: AxisEvolution,
    /// Vertical axis output.
    pub y: AxisEvolution,
    /// Longitudinal axis output.
    pub z: AxisEvolution,
}

impl EvolutionReport {
    /// Output for the requested axis.
    pub fn axis(&self, axis: Axis) -> &AxisEvolution {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Drives an [`OverlapSimulation`] across a time range.
#[derive(Debug)]
pub struct EvolutionTracker<S: OverlapSummary> {
    sim: OverlapSimulation,
    summary: S,
}

impl<S: OverlapSummary> EvolutionTracker<S> {
    /// Wraps a configured simulation and a per-step summary.
    pub fn new(sim: OverlapSimulation, summary: S) -> Self {
        Self { sim, summary }
    }

    /// Read access to the driven simulation.
    pub fn sim(&self) -> &OverlapSimulation {
        &self.sim
    }

    /// Releases the simulation, e.g. for snapshot queries after a run.
    pub fn into_inner(self) -> OverlapSimulation {
        self.sim
    }

    /// Steps the simulation in `nsteps` uniform increments over
    /// `[tmin, tmax)`.
    ///
    /// The clock first advances by `tmin - dt` and each of the `nsteps`
    /// iterations advances by `dt` before recording, so the first sample
    /// lands exactly on `tmin` and the last on `tmax - dt`. This pre-roll is
    /// a fixed sampling-alignment contract of the output format; do not
    /// refactor it into a plain `tmin..tmax` sweep.
    pub fn run(&mut self, tmin_ns: f64, tmax_ns: f64, nsteps: u32) -> Result<EvolutionReport, EbsError> {
        if nsteps == 0 {
            return Err(EbsError::invalid_parameter(
                "steps-empty",
                "evolution requires a positive step count",
                "nsteps",
                nsteps,
            ));
        }
        if tmax_ns <= tmin_ns {
            return Err(EbsError::InvalidParameter(
                ErrorInfo::new("time-range-inverted", "time range must be ordered")
                    .with_context("tmin_ns", tmin_ns.to_string())
                    .with_context("tmax_ns", tmax_ns.to_string()),
            ));
        }

        let dt = (tmax_ns - tmin_ns) / nsteps as f64;
        self.sim.advance(tmin_ns - dt);

        let mut output: Option<EvolutionReport> = None;
        for _ in 0..nsteps {
            self.sim.advance(dt);
            let time = self.sim.time();
            let hx = self.sim.pair_counts(Axis::X)?;
            let hy = self.sim.pair_counts(Axis::Y)?;
            let hz = self.sim.pair_counts(Axis::Z)?;
            let report = output.get_or_insert_with(|| EvolutionReport {
                x: empty_axis(Axis::X, &hx),
                y: empty_axis(Axis::Y, &hy),
                z: empty_axis(Axis::Z, &hz),
            });
            for (counts, slot) in [
                (&hx, &mut report.x),
                (&hy, &mut report.y),
                (&hz, &mut report.z),
            ] {
                slot.integrated.accumulate(counts);
                slot.series.samples.push(EvolutionSample {
                    time_ns: time,
                    value: self.summary.reduce(counts),
                });
            }
        }

        Ok(output.expect("nsteps is positive"))
    }
}

fn empty_axis(axis: Axis, template: &Hist1D) -> AxisEvolution {
    AxisEvolution {
        series: EvolutionSeries {
            axis,
            samples: Vec::new(),
        },
        integrated: Hist1D {
            edges: template.edges.clone(),
            content: vec![0.0; template.len()],
        },
    }
}
