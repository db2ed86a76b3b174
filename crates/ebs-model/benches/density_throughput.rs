use criterion::{criterion_group, criterion_main, Criterion};
use ebs_core::config::{AxisBins, GridConfig};
use ebs_core::constants::{ELECTRON_MASS_GEV, PROTON_MASS_GEV};
use ebs_core::rng::RngHandle;
use ebs_core::Axis;
use ebs_model::{BunchModel, OverlapSimulation};
use nalgebra::Vector3;

fn build_sim(particles: u32) -> OverlapSimulation {
    let mut sim = OverlapSimulation::new();

    let mut rng = RngHandle::from_seed(404);
    let mut hadron =
        BunchModel::sample(particles, 11.3, 80.0, 1.0, 7.2, 6.0, &mut rng).expect("valid bunch");
    let hp = (275.0_f64.powi(2) - PROTON_MASS_GEV.powi(2)).sqrt();
    hadron
        .set_kinematics(275.0, hp, PROTON_MASS_GEV, Vector3::new(0.0, 0.0, 1.0))
        .expect("consistent kinematics");

    let mut rng = RngHandle::from_seed(405);
    let mut electron =
        BunchModel::sample(particles, 20.0, 59.0, 1.3, 5.7, 0.9, &mut rng).expect("valid bunch");
    let ep = (18.0_f64.powi(2) - ELECTRON_MASS_GEV.powi(2)).sqrt();
    electron
        .set_kinematics(18.0, ep, ELECTRON_MASS_GEV, Vector3::new(0.0, 0.0, -1.0))
        .expect("consistent kinematics");

    sim.add_bunch(hadron).expect("add hadron");
    sim.add_bunch(electron).expect("add electron");
    sim.set_bins(GridConfig {
        x: AxisBins::new(60, -2.0, 2.0),
        y: AxisBins::new(60, -2.0, 2.0),
        z: AxisBins::new(60, -200.0, 200.0),
    })
    .expect("valid grid");
    sim
}

fn bench_density(c: &mut Criterion) {
    let mut sim = build_sim(20_000);
    c.bench_function("density_throughput", |b| {
        b.iter(|| {
            // Zero-length step invalidates the cache so each iteration pays
            // the full binning and pairing cost.
            sim.advance(0.0);
            let _ = sim.density(Axis::Z).expect("density at origin");
        });
    });
}

criterion_group!(benches, bench_density);
criterion_main!(benches);
