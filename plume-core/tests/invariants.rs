use plume_core::{Boundary, ModelParams, PollutantModel, VelocityField};
use proptest::prelude::*;

fn params(nx: usize, ny: usize, diffusion: f64, decay: f64, boundary: Boundary) -> ModelParams {
    ModelParams {
        nx,
        ny,
        dx: 1.0,
        dy: 1.0,
        dt: 1.0,
        diffusion,
        decay,
        boundary,
    }
}

fn arb_boundary() -> impl Strategy<Value = Boundary> {
    prop_oneof![
        Just(Boundary::Open),
        Just(Boundary::Periodic),
        Just(Boundary::Reflective),
    ]
}

/// Grid size, per-cell velocities and a handful of initial releases.
fn arb_setup(
    max_speed: f64,
) -> impl Strategy<Value = (usize, usize, Vec<[f64; 2]>, Vec<(usize, usize, f64)>)> {
    (2usize..10, 2usize..10).prop_flat_map(move |(nx, ny)| {
        (
            Just(nx),
            Just(ny),
            prop::collection::vec(
                (-max_speed..max_speed, -max_speed..max_speed).prop_map(|(a, b)| [a, b]),
                nx * ny,
            ),
            prop::collection::vec((0..nx, 0..ny, 0.0f64..50.0), 1..6),
        )
    })
}

fn seed(model: &mut PollutantModel, releases: &[(usize, usize, f64)]) {
    for &(i, j, amount) in releases {
        model.add_source_point(i as isize, j as isize, amount);
    }
}

proptest! {
    #[test]
    fn periodic_mass_is_conserved(
        (nx, ny, vel, releases) in arb_setup(0.5),
        diffusion in 0.0f64..0.2,
        steps in 1usize..25,
    ) {
        // |fx| + |fy| <= 1 and D*dt/(dx*dy) <= 1/4 keep every stage non-negative
        let p = params(nx, ny, diffusion, 0.0, Boundary::Periodic);
        let v = VelocityField::from_vec(nx, ny, vel).unwrap();
        let mut m = PollutantModel::with_velocity(p, v).unwrap();
        seed(&mut m, &releases);
        let m0 = m.total_mass();
        for _ in 0..steps {
            m.step();
        }
        prop_assert!((m.total_mass() - m0).abs() <= 1e-9 * m0.max(1.0));
    }

    #[test]
    fn still_field_decays_exponentially(
        (nx, ny, _vel, releases) in arb_setup(1.0),
        boundary in arb_boundary(),
        decay in 0.0f64..0.5,
        steps in 1usize..20,
    ) {
        let p = params(nx, ny, 0.0, decay, boundary);
        let mut m = PollutantModel::with_velocity_fn(p, |_, _| (0.0, 0.0)).unwrap();
        seed(&mut m, &releases);
        if boundary == Boundary::Reflective {
            // the first step mirrors edges; decay is uniform from there on
            m.step();
        }
        let c0 = m.field().to_vec();
        for _ in 0..steps {
            m.step();
        }
        let factor = (-decay * steps as f64).exp();
        for (c, c0) in m.field().iter().zip(&c0) {
            prop_assert!((c - c0 * factor).abs() <= 1e-9 * c0.max(1.0));
        }
    }

    #[test]
    fn concentration_never_negative(
        (nx, ny, vel, releases) in arb_setup(3.0),
        boundary in arb_boundary(),
        diffusion in 0.0f64..0.5,
        decay in 0.0f64..0.1,
        steps in 1usize..15,
    ) {
        let mut p = params(nx, ny, diffusion, decay, boundary);
        p.dt = 0.7;
        let v = VelocityField::from_vec(nx, ny, vel).unwrap();
        let mut m = PollutantModel::with_velocity(p, v).unwrap();
        seed(&mut m, &releases);
        for step in 0..steps {
            let field = m.step_with(|| vec![(0, 0, -1.0), (1, 1, 0.5)]);
            prop_assert!(
                field.iter().all(|&c| c >= 0.0),
                "negative concentration after step {}", step
            );
        }
    }

    #[test]
    fn reflective_edges_match_interior_neighbours(
        (nx, ny, vel, releases) in arb_setup(1.0),
        diffusion in 0.0f64..0.25,
        steps in 1usize..10,
    ) {
        let p = params(nx, ny, diffusion, 0.01, Boundary::Reflective);
        let v = VelocityField::from_vec(nx, ny, vel).unwrap();
        let mut m = PollutantModel::with_velocity(p, v).unwrap();
        seed(&mut m, &releases);
        for _ in 0..steps {
            m.step();
            let f = m.field();
            for j in 0..ny {
                prop_assert_eq!(f[j], f[ny + j]);
                prop_assert_eq!(f[(nx - 1) * ny + j], f[(nx - 2) * ny + j]);
            }
            for i in 0..nx {
                prop_assert_eq!(f[i * ny], f[i * ny + 1]);
                prop_assert_eq!(f[i * ny + ny - 1], f[i * ny + ny - 2]);
            }
        }
    }
}

#[test]
fn open_boundary_loses_mass_at_the_outflow_edge() {
    let (nx, ny) = (8, 5);
    let p = params(nx, ny, 0.0, 0.0, Boundary::Open);
    let mut m = PollutantModel::with_velocity_fn(p, |_, _| (0.4, 0.0)).unwrap();
    for j in 0..ny {
        m.add_source_point((nx - 1) as isize, j as isize, 10.0);
    }
    let mut prev = m.total_mass();
    for _ in 0..10 {
        m.step();
        let mass = m.total_mass();
        assert!(mass < prev, "mass {mass} did not drop below {prev}");
        prev = mass;
    }
}

#[test]
fn open_boundary_keeps_mass_until_plume_reaches_edge() {
    let p = params(10, 3, 0.0, 0.0, Boundary::Open);
    let mut m = PollutantModel::with_velocity_fn(p, |_, _| (1.0, 0.0)).unwrap();
    m.add_source_point(0, 1, 4.0);
    for _ in 0..9 {
        m.step();
        assert_eq!(m.total_mass(), 4.0);
    }
    m.step();
    assert_eq!(m.total_mass(), 0.0);
}

#[test]
fn reflective_does_not_recapture_outflow() {
    let p = params(4, 3, 0.0, 0.0, Boundary::Reflective);
    let mut m = PollutantModel::with_velocity_fn(p, |_, _| (1.0, 0.0)).unwrap();
    m.add_source_point(3, 1, 5.0);
    m.step();
    assert_eq!(m.total_mass(), 0.0);
}
