use ebs_core::config::{AxisBins, GridConfig};
use ebs_core::constants::{ELECTRON_MASS_GEV, PROTON_MASS_GEV};
use ebs_core::rng::RngHandle;
use ebs_core::{Axis, EbsError};
use ebs_model::{
    BunchModel, EvolutionTracker, IntegralSummary, OverlapSimulation, PeakSummary,
};
use nalgebra::Vector3;

fn build_sim(particles: u32) -> OverlapSimulation {
    let mut sim = OverlapSimulation::new();

    let mut rng = RngHandle::from_seed(31);
    let mut hadron =
        BunchModel::sample(particles, 11.3, 80.0, 1.0, 7.2, 6.0, &mut rng).expect("valid bunch");
    let hp = (275.0_f64.powi(2) - PROTON_MASS_GEV.powi(2)).sqrt();
    hadron
        .set_kinematics(275.0, hp, PROTON_MASS_GEV, Vector3::new(0.0, 0.0, 1.0))
        .expect("consistent kinematics");

    let mut rng = RngHandle::from_seed(32);
    let mut electron =
        BunchModel::sample(particles, 20.0, 59.0, 1.3, 5.7, 0.9, &mut rng).expect("valid bunch");
    let ep = (18.0_f64.powi(2) - ELECTRON_MASS_GEV.powi(2)).sqrt();
    electron
        .set_kinematics(18.0, ep, ELECTRON_MASS_GEV, Vector3::new(0.0, 0.0, -1.0))
        .expect("consistent kinematics");

    sim.add_bunch(hadron).expect("add hadron");
    sim.add_bunch(electron).expect("add electron");
    sim.set_bins(GridConfig {
        x: AxisBins::new(30, -2.0, 2.0),
        y: AxisBins::new(30, -2.0, 2.0),
        z: AxisBins::new(30, -200.0, 200.0),
    })
    .expect("valid grid");
    sim
}

#[test]
fn preroll_aligns_first_and_last_samples() {
    let mut tracker = EvolutionTracker::new(build_sim(2_000), IntegralSummary);
    let report = tracker.run(-1.0, 1.0, 200).expect("evolution runs");

    for axis in Axis::ALL {
        let samples = &report.axis(axis).series.samples;
        assert_eq!(samples.len(), 200, "axis {axis}");
        let dt = 2.0 / 200.0;
        assert!((samples[0].time_ns + 1.0).abs() < 1e-9);
        assert!((samples[199].time_ns - (1.0 - dt)).abs() < 1e-9);
        // Uniform spacing throughout.
        for pair in samples.windows(2) {
            assert!((pair[1].time_ns - pair[0].time_ns - dt).abs() < 1e-9);
        }
    }
}

#[test]
fn integrated_histogram_collects_all_steps() {
    let mut tracker = EvolutionTracker::new(build_sim(2_000), IntegralSummary);
    let report = tracker.run(-0.5, 0.5, 50).expect("evolution runs");

    for axis in Axis::ALL {
        let out = report.axis(axis);
        let series_total: f64 = out.series.samples.iter().map(|s| s.value).sum();
        // The integral reduction is the per-step total, so the series sums to
        // the integrated histogram's total.
        assert!((series_total - out.integrated.total()).abs() < 1e-6, "axis {axis}");
        assert!(out.integrated.total() > 0.0);
    }
}

#[test]
fn peak_summary_is_bounded_by_integral() {
    let mut tracker = EvolutionTracker::new(build_sim(2_000), PeakSummary);
    let report = tracker.run(-0.2, 0.2, 10).expect("evolution runs");
    let mut integral_tracker = EvolutionTracker::new(build_sim(2_000), IntegralSummary);
    let integral_report = integral_tracker.run(-0.2, 0.2, 10).expect("evolution runs");

    for (peak, integral) in report
        .z
        .series
        .samples
        .iter()
        .zip(integral_report.z.series.samples.iter())
    {
        assert!(peak.value <= integral.value + 1e-9);
    }
}

#[test]
fn empty_step_count_is_rejected() {
    let mut tracker = EvolutionTracker::new(build_sim(100), IntegralSummary);
    let err = tracker.run(-1.0, 1.0, 0).expect_err("steps must be positive");
    assert!(matches!(err, EbsError::InvalidParameter(_)));
    assert_eq!(err.info().code, "steps-empty");
}

#[test]
fn inverted_time_range_is_rejected() {
    let mut tracker = EvolutionTracker::new(build_sim(100), IntegralSummary);
    let err = tracker.run(1.0, -1.0, 10).expect_err("range must be ordered");
    assert_eq!(err.info().code, "time-range-inverted");
}

#[test]
fn report_round_trips_through_json() {
    let mut tracker = EvolutionTracker::new(build_sim(500), IntegralSummary);
    let report = tracker.run(-0.1, 0.1, 5).expect("evolution runs");
    let json = serde_json::to_string(&report).expect("serialize");
    let back: ebs_model::EvolutionReport = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(report, back);
}
