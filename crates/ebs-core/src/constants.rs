//! Physical constants used by the bunch kinematics.

/// Speed of light in mm/ns, the native units of the simulation clock.
pub const C_LIGHT_MM_PER_NS: f64 = 299.792;

/// Electron rest mass in GeV (PDG).
pub const ELECTRON_MASS_GEV: f64 = 0.000_510_998_95;

/// Proton rest mass in GeV (PDG).
pub const PROTON_MASS_GEV: f64 = 0.938_272_081_3;
