//! Single-bunch representation: sampled particle cloud, static rotations
//! and relativistic drift kinematics.

use ebs_core::constants::C_LIGHT_MM_PER_NS;
use ebs_core::errors::{EbsError, ErrorInfo};
use ebs_core::rng::RngHandle;
use nalgebra::Vector3;
use rand_distr::{Distribution, Normal};

/// Relative tolerance on the mass-shell relation `p^2 = E^2 - m^2`.
const MASS_SHELL_TOLERANCE: f64 = 1e-6;

/// Gaussian sampling is truncated at this many sigma on each axis.
const TRUNCATION_SIGMA: f64 = 4.0;

/// Rotates a vector about the vertical (y) axis.
pub(crate) fn rotate_y(v: &Vector3<f64>, angle_rad: f64) -> Vector3<f64> {
    let (sin, cos) = angle_rad.sin_cos();
    Vector3::new(cos * v.x + sin * v.z, v.y, -sin * v.x + cos * v.z)
}

/// Rotates a vector about the horizontal (x) axis.
pub(crate) fn rotate_x(v: &Vector3<f64>, angle_rad: f64) -> Vector3<f64> {
    let (sin, cos) = angle_rad.sin_cos();
    Vector3::new(v.x, cos * v.y - sin * v.z, sin * v.y + cos * v.z)
}

fn sample_axis(sigma: f64, rng: &mut RngHandle) -> Result<f64, EbsError> {
    if sigma == 0.0 {
        return Ok(0.0);
    }
    let normal = Normal::new(0.0, sigma).map_err(|err| {
        EbsError::InvalidParameter(
            ErrorInfo::new("sigma-invalid", err.to_string())
                .with_context("sigma", sigma.to_string()),
        )
    })?;
    let bound = TRUNCATION_SIGMA * sigma;
    loop {
        let value = normal.sample(rng.inner_mut());
        if value.abs() <= bound {
            return Ok(value);
        }
    }
}

/// One particle bunch.
///
/// The sampled cloud is immutable after construction; time evolution only
/// moves the positional offset, so advancing by `dt` and then `-dt` restores
/// the bunch exactly.
#[derive(Debug, Clone)]
pub struct BunchModel {
    points: Vec<Vector3<f64>>,
    sigma: Vector3<f64>,
    direction: Vector3<f64>,
    velocity_mm_ns: f64,
    offset: Vector3<f64>,
    /// Display color tag, presentation metadata ignored by the physics.
    pub color: Option<String>,
}

impl BunchModel {
    /// Samples a bunch of `particles` positions from per-axis Gaussians.
    ///
    /// Transverse widths come from the optics conversion
    /// `sigma = sqrt(emittance[nm] * 1e-6 * beta*[cm] * 10)` in mm; the
    /// longitudinal width is the bunch length converted from cm to mm.
    /// Sampling is truncated at four sigma per axis.
    pub fn sample(
        particles: u32,
        emittance_x_nm: f64,
        beta_star_x_cm: f64,
        emittance_y_nm: f64,
        beta_star_y_cm: f64,
        bunch_length_cm: f64,
        rng: &mut RngHandle,
    ) -> Result<Self, EbsError> {
        if particles == 0 {
            return Err(EbsError::invalid_parameter(
                "population-empty",
                "bunch requires a positive particle count",
                "particles",
                particles,
            ));
        }
        for (name, value) in [
            ("emittance_x_nm", emittance_x_nm),
            ("beta_star_x_cm", beta_star_x_cm),
            ("emittance_y_nm", emittance_y_nm),
            ("beta_star_y_cm", beta_star_y_cm),
            ("bunch_length_cm", bunch_length_cm),
        ] {
            if value < 0.0 {
                return Err(EbsError::InvalidParameter(
                    ErrorInfo::new("spread-negative", "bunch spread must be non-negative")
                        .with_context("field", name)
                        .with_context("value", value.to_string()),
                ));
            }
        }

        let sigma = Vector3::new(
            (emittance_x_nm * 1e-6 * beta_star_x_cm * 10.0).sqrt(),
            (emittance_y_nm * 1e-6 * beta_star_y_cm * 10.0).sqrt(),
            bunch_length_cm * 10.0,
        );

        let mut points = Vec::with_capacity(particles as usize);
        for _ in 0..particles {
            points.push(Vector3::new(
                sample_axis(sigma.x, rng)?,
                sample_axis(sigma.y, rng)?,
                sample_axis(sigma.z, rng)?,
            ));
        }

        Ok(Self {
            points,
            sigma,
            direction: Vector3::zeros(),
            velocity_mm_ns: 0.0,
            offset: Vector3::zeros(),
            color: None,
        })
    }

    /// Rotates the sampled cloud and the direction frame about the vertical
    /// axis. Applied once at setup, not per time step.
    pub fn rotate_y(&mut self, angle_mrad: f64) {
        let angle = angle_mrad * 1e-3;
        for point in self.points.iter_mut() {
            *point = rotate_y(point, angle);
        }
        if self.direction != Vector3::zeros() {
            self.direction = rotate_y(&self.direction, angle);
        }
    }

    /// Tilts the sampled cloud and the direction frame about the horizontal
    /// axis (vertical crossing component).
    pub fn rotate_x(&mut self, angle_urad: f64) {
        let angle = angle_urad * 1e-6;
        for point in self.points.iter_mut() {
            *point = rotate_x(point, angle);
        }
        if self.direction != Vector3::zeros() {
            self.direction = rotate_x(&self.direction, angle);
        }
    }

    /// Sets the bunch energy, momentum and flight direction.
    ///
    /// The direction is normalized internally. The velocity follows the
    /// relativistic ratio `v = (p / E) * c` in mm/ns. Fails when the energy
    /// sits below the rest mass or the momentum violates the mass-shell
    /// relation beyond a small relative tolerance.
    pub fn set_kinematics(
        &mut self,
        energy_gev: f64,
        momentum_gev: f64,
        rest_mass_gev: f64,
        direction: Vector3<f64>,
    ) -> Result<(), EbsError> {
        if energy_gev < rest_mass_gev {
            return Err(EbsError::InvalidParameter(
                ErrorInfo::new("energy-below-mass", "energy must not be below the rest mass")
                    .with_context("energy_gev", energy_gev.to_string())
                    .with_context("rest_mass_gev", rest_mass_gev.to_string()),
            ));
        }
        let shell = energy_gev * energy_gev - rest_mass_gev * rest_mass_gev;
        let deviation = (momentum_gev * momentum_gev - shell).abs();
        if deviation > MASS_SHELL_TOLERANCE * shell.max(1.0) {
            return Err(EbsError::InvalidParameter(
                ErrorInfo::new(
                    "mass-shell-violation",
                    "momentum is inconsistent with p^2 = E^2 - m^2",
                )
                .with_context("deviation", deviation.to_string()),
            ));
        }
        let norm = direction.norm();
        if norm == 0.0 {
            return Err(EbsError::InvalidParameter(ErrorInfo::new(
                "direction-zero",
                "direction vector must be non-zero",
            )));
        }
        self.direction = direction / norm;
        self.velocity_mm_ns = momentum_gev / energy_gev * C_LIGHT_MM_PER_NS;
        Ok(())
    }

    /// Advances the bunch offset by `direction * velocity * dt`. Negative
    /// `dt` runs time backward.
    pub fn advance(&mut self, dt_ns: f64) {
        self.offset += self.direction * (self.velocity_mm_ns * dt_ns);
    }

    /// Current position of particle `i`, sampled point plus drift offset.
    pub fn position(&self, i: usize) -> Vector3<f64> {
        self.points[i] + self.offset
    }

    /// Number of particles in the bunch.
    pub fn particles(&self) -> usize {
        self.points.len()
    }

    /// Nominal Gaussian widths per axis in mm.
    pub fn sigma(&self) -> Vector3<f64> {
        self.sigma
    }

    /// Stored unit direction, zero until kinematics are set.
    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    /// Drift speed in mm/ns.
    pub fn velocity(&self) -> f64 {
        self.velocity_mm_ns
    }

    /// Accumulated positional offset in mm.
    pub fn offset(&self) -> Vector3<f64> {
        self.offset
    }
}
