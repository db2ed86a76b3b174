//! Builds a configured two-beam simulation from a run configuration.

use ebs_core::config::SimConfig;
use ebs_core::constants::{ELECTRON_MASS_GEV, PROTON_MASS_GEV};
use ebs_core::errors::{EbsError, ErrorInfo};
use ebs_core::rng::RngHandle;
use nalgebra::Vector3;

use crate::bunch::{rotate_x, rotate_y, BunchModel};
use crate::sim::OverlapSimulation;

/// RNG substream for the electron bunch cloud.
const ELECTRON_SUBSTREAM: u64 = 0;
/// RNG substream for the hadron bunch cloud.
const HADRON_SUBSTREAM: u64 = 1;

fn sample_species(
    params: &ebs_core::config::BeamParams,
    seed: u64,
    substream: u64,
) -> Result<BunchModel, EbsError> {
    let mut rng = RngHandle::for_substream(seed, substream);
    BunchModel::sample(
        params.particles,
        params.emittance_x_nm,
        params.beta_star_x_cm,
        params.emittance_y_nm,
        params.beta_star_y_cm,
        params.bunch_length_cm,
        &mut rng,
    )
}

/// Builds the electron and hadron bunches, applies the half-angle crossing
/// rotations and the hadron kinematics (including the nucleus A/Z scaling),
/// and configures the overlap grid from the binning section.
pub fn build_simulation(config: &SimConfig) -> Result<OverlapSimulation, EbsError> {
    config.validate()?;

    let half_angle = config.cross_angle_mrad / 2.0;

    // Electron bunch flies along -z.
    let mut electron = sample_species(&config.electron, config.seed, ELECTRON_SUBSTREAM)?;
    electron.rotate_y(-half_angle);
    let e_energy = config.electron.energy_gev;
    let e_momentum_sq = e_energy * e_energy - ELECTRON_MASS_GEV * ELECTRON_MASS_GEV;
    if e_momentum_sq < 0.0 {
        return Err(EbsError::InvalidParameter(
            ErrorInfo::new("energy-below-mass", "electron energy below the rest mass")
                .with_context("energy_gev", e_energy.to_string()),
        ));
    }
    electron.set_kinematics(
        e_energy,
        e_momentum_sq.sqrt(),
        ELECTRON_MASS_GEV,
        Vector3::new(0.0, 0.0, -1.0),
    )?;

    // Hadron bunch flies along +z, rotated by the full crossing angle and
    // the vertical tilt; per-nucleon energy scales with A, momentum with Z.
    let mut hadron = sample_species(&config.hadron, config.seed, HADRON_SUBSTREAM)?;
    hadron.color = Some("red".to_string());
    hadron.rotate_y(-half_angle);
    let p_energy = config.hadron.energy_gev;
    let proton_momentum_sq = p_energy * p_energy - PROTON_MASS_GEV * PROTON_MASS_GEV;
    if proton_momentum_sq < 0.0 {
        return Err(EbsError::InvalidParameter(
            ErrorInfo::new("energy-below-mass", "hadron energy below the rest mass")
                .with_context("energy_gev", p_energy.to_string()),
        ));
    }
    let nucleus_mass = PROTON_MASS_GEV * config.mass_number as f64;
    let nucleus_momentum = proton_momentum_sq.sqrt() * config.charge_number as f64;
    let nucleus_energy = (nucleus_momentum * nucleus_momentum + nucleus_mass * nucleus_mass).sqrt();

    let mut hadron_dir = Vector3::new(0.0, 0.0, 1.0);
    hadron_dir = rotate_y(&hadron_dir, -config.cross_angle_mrad * 1e-3);
    hadron_dir = rotate_x(&hadron_dir, config.y_angle_urad * 1e-6);
    hadron.set_kinematics(nucleus_energy, nucleus_momentum, nucleus_mass, hadron_dir)?;

    let mut sim = OverlapSimulation::new();
    sim.add_bunch(hadron)?;
    sim.add_bunch(electron)?;
    sim.set_bins(config.binning)?;
    Ok(sim)
}
