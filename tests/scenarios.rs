//! End-to-end scenarios from the component design, each driving the public
//! API across module boundaries the way an external collaborator would.

use celeritas_transport::field::equation::{MagFieldEquation, UniformZField};
use celeritas_transport::field::integrators::ZHelixIntegrator;
use celeritas_transport::field::types::OdeState;
use celeritas_transport::field::Integrator;
use celeritas_transport::grid::range::{range_from_dedx, InverseRangeCalculator, RangeCalculator};
use celeritas_transport::grid::uniform::{UniformGridRecord, UniformLogGrid};
use celeritas_transport::grid::xs::ScaledXsGrid;
use celeritas_transport::ids::{MaterialId, ParticleId, ParticleModelId, ProcessId};
use celeritas_transport::interfaces::RngEngine;
use celeritas_transport::phys::cutoff::CutoffParams;
use celeritas_transport::phys::{
    apply_interaction, select_discrete_interaction, Interaction, InteractionKind,
    IntegralXsProcess, ModelGroup, ProcessEntry, ProcessGroup, Secondary, SelectionOutcome,
    ValueTable,
};

struct Counter(u64);
impl RngEngine for Counter {
    fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        (self.0 >> 32) as u32
    }
}

// Scenario 1: UniformLogGridCalculator, linear.
#[test]
fn scenario_1_uniform_log_grid_linear() {
    let grid = UniformLogGrid::new(1.0, 1e5, 6).unwrap();
    let record =
        UniformGridRecord::new(grid, vec![1.0, 10.0, 100.0, 1000.0, 10000.0, 100_000.0], None, 1)
            .unwrap();

    assert!((record.interpolate(1.0) - 1.0).abs() < 1e-9);
    assert!((record.interpolate(100.0) - 100.0).abs() < 1e-6);
    assert!((record.interpolate(5.0) - 5.0).abs() < 1e-6);
    assert!((record.interpolate(0.0001) - 1.0).abs() < 1e-9);
    assert!((record.interpolate(1e7) - 100_000.0).abs() < 1e-6);
}

// Scenario 2: XS with 1/E scaling, sigma == 1 everywhere.
#[test]
fn scenario_2_xs_with_inverse_e_scaling() {
    let grid = UniformLogGrid::new(0.1, 10_000.0, 6).unwrap();
    let values = grid.energies();
    let xs = ScaledXsGrid::new(grid, values, 0, None).unwrap();

    assert!((xs.evaluate(0.1) - 1.0).abs() < 1e-9);
    assert!((xs.evaluate(10_000.0) - 1.0).abs() < 1e-6);
    assert!((xs.evaluate(0.0001) - 1000.0).abs() < 1e-6);
    assert!((xs.evaluate(1e5) - 0.1).abs() < 1e-9);
}

// Scenario 3: range & inverse range.
#[test]
fn scenario_3_range_and_inverse_range() {
    let grid = UniformLogGrid::new(10.0, 1e4, 4).unwrap();
    let dedx = UniformGridRecord::new(grid, vec![20.0, 2.0, 0.2, 0.02], None, 1).unwrap();
    let range_values = range_from_dedx(&dedx).unwrap();
    let range = RangeCalculator::new(dedx.grid().clone(), range_values.clone()).unwrap();
    let inverse = InverseRangeCalculator::new(dedx.grid().clone(), range_values, None).unwrap();

    assert!(range.evaluate(10.0) > 0.0);
    assert!((inverse.evaluate(range.evaluate(10.0)).unwrap() - 10.0).abs() < 1e-6);
    assert!((inverse.evaluate(range.evaluate(1e4)).unwrap() - 1e4).abs() < 1e-3);
}

// Scenario 4: helix closure, 10 MeV electron in a 1 T uniform Z field.
#[test]
fn scenario_4_helix_closure() {
    let radius = 3.808_538_6036;
    let momentum_y = 10.961_002_8286;
    let momentum_z = 3.196_959_1583;
    let delta_z = 6.700_331_0629;

    let eq = MagFieldEquation::new(UniformZField::new(1.0), -1.0);
    let integrator = ZHelixIntegrator::new(eq);
    let hstep = 2.0 * std::f64::consts::PI * radius / 100.0;

    let mut y = OdeState {
        pos: [radius, 0.0, 0.0],
        mom: [0.0, momentum_y, momentum_z],
    };
    for rev in 0..10 {
        for _ in 0..100 {
            y = integrator.integrate(hstep, &y).end_state;
        }
        let pos_err = (y.pos[0] - radius).abs();
        if rev == 0 {
            assert!(pos_err < 1e-3, "single-revolution closure error {pos_err}");
        }
        assert!(pos_err < 1e-3, "pos_x error at revolution {rev}: {pos_err}");
        assert!((y.pos[2] - delta_z * f64::from(rev + 1)).abs() < 1e-3);
    }

    let rel_err_sq = ((y.pos[0] - radius).powi(2) + y.pos[1].powi(2)) / radius.powi(2);
    assert!(rel_err_sq < 1e-5, "ten-revolution relative error^2 {rel_err_sq}");
}

// Scenario 5: integral-XS rejection acceptance rates.
#[test]
fn scenario_5_integral_xs_rejection_acceptance() {
    let grid = UniformLogGrid::new(0.1, 10.0, 2).unwrap();
    let xs = ScaledXsGrid::no_scaling(grid, vec![1.2, 0.6]).unwrap();
    let entry = ProcessEntry {
        process: ProcessId::new(0),
        models: ModelGroup::new(vec![(0.0, f64::INFINITY, ParticleModelId::new(0))]).unwrap(),
        macro_xs: ValueTable::new(vec![Some(xs)]),
        integral_xs: Some(IntegralXsProcess::new(vec![Some(0.1)])),
        element_cdf: ValueTable::empty(),
    };
    let group = ProcessGroup::new(vec![entry], None, None).unwrap();
    let material = MaterialId::new(0);
    let mut rng = Counter(7);

    let draws = 100_000;
    let mut accepted = 0u32;
    for _ in 0..draws {
        let outcome = select_discrete_interaction(&group, material, 0.1, false, &[1.2], &mut rng);
        if matches!(outcome, SelectionOutcome::Selected { .. }) {
            accepted += 1;
        }
    }
    assert!((f64::from(accepted) / f64::from(draws) - 1.0).abs() < 0.01);

    let mut accepted = 0u32;
    for _ in 0..draws {
        let outcome = select_discrete_interaction(&group, material, 0.11, false, &[1.2], &mut rng);
        if matches!(outcome, SelectionOutcome::Selected { .. }) {
            accepted += 1;
        }
    }
    let expected = 1979.0 / (1650.0 * 1.2);
    assert!((f64::from(accepted) / f64::from(draws) - expected).abs() < 0.02);
}

// Scenario 6: secondary cutoff folding for a 10 MeV mu- ionization interaction.
#[test]
fn scenario_6_secondary_cutoff_folding() {
    use celeritas_transport::interfaces::{GeometryView, NextStep, ParticleView};

    struct Muon {
        energy: f64,
    }
    impl ParticleView for Muon {
        fn particle_id(&self) -> ParticleId {
            ParticleId::new(0)
        }
        fn energy(&self) -> f64 {
            self.energy
        }
        fn set_energy(&mut self, e: f64) {
            self.energy = e;
        }
        fn mass(&self) -> f64 {
            105.66
        }
        fn charge(&self) -> f64 {
            -1.0
        }
        fn is_antiparticle(&self) -> bool {
            false
        }
        fn is_heavy(&self) -> bool {
            true
        }
    }

    struct Geometry {
        dir: [f64; 3],
    }
    impl GeometryView for Geometry {
        fn pos(&self) -> [f64; 3] {
            [0.0; 3]
        }
        fn dir(&self) -> [f64; 3] {
            self.dir
        }
        fn set_dir(&mut self, d: [f64; 3]) {
            self.dir = d;
        }
        fn find_next_step(&self) -> NextStep {
            NextStep {
                distance: f64::INFINITY,
                boundary: false,
            }
        }
        fn move_internal(&mut self, _pos: [f64; 3]) {}
        fn move_to_boundary(&mut self) {}
        fn is_on_boundary(&self) -> bool {
            false
        }
        fn cross_boundary(&mut self) {}
    }

    let electron = ParticleId::new(1);
    let cutoff_params = CutoffParams::new(vec![vec![0.0, 0.001]]).unwrap();
    let cutoff = cutoff_params.view(MaterialId::new(0));

    let interaction = Interaction {
        kind: InteractionKind::Scattered,
        energy: 9.4995,
        direction: [0.0, 0.0, 1.0],
        energy_deposition: 0.0,
        secondaries: vec![Secondary {
            particle: electron,
            energy: 0.0005,
            direction: [1.0, 0.0, 0.0],
            mass: 0.511,
            is_antiparticle: false,
            weight: 1.0,
        }],
    };

    let mut particle = Muon { energy: 10.0 };
    let mut geometry = Geometry { dir: [0.0, 0.0, 1.0] };
    let outcome = apply_interaction(interaction, 1.0, &mut particle, &mut geometry, &cutoff);

    assert!(outcome.secondaries.is_empty());
    assert!((outcome.deposited_energy - 0.0005).abs() < 1e-12);
    assert!((particle.energy() - 9.4995).abs() < 1e-12);
    assert_eq!(geometry.dir(), [0.0, 0.0, 1.0]);

    let dir_norm: f64 = geometry.dir().iter().map(|d| d * d).sum::<f64>().sqrt();
    assert!((dir_norm - 1.0).abs() < 1e-6);
}
