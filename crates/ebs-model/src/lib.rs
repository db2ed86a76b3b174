#![deny(missing_docs)]
#![doc = "Bunch models, overlap densities and time evolution for colliding beam bunches crossing at a finite angle."]

pub mod bunch;
pub mod evolution;
pub mod hist;
pub mod setup;
pub mod sim;

pub use bunch::BunchModel;
pub use evolution::{
    AxisEvolution, EvolutionReport, EvolutionSample, EvolutionSeries, EvolutionTracker,
    IntegralSummary, OverlapSummary, PeakSummary,
};
pub use hist::{Counts3, Hist1D};
pub use setup::build_simulation;
pub use sim::{BunchId, OverlapSimulation};
