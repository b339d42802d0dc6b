use pibsim::core::{Distribution, InitialState, Parameters, Side, Simulator};
use pibsim::error::Result;

fn params() -> Parameters {
    Parameters {
        box_width: 100.0,
        box_height: 100.0,
        delta_v_top: 0.5,
        delta_v_bottom: 0.3,
        delta_v_side: 0.3,
        barrier_x: 40.0,
        barrier_width: 3.0,
        hole_y: 30.0,
        hole_height: 10.0,
        v_loss: 0.21,
        particle_r: 0.2,
        g: 9.8,
    }
}

fn new_simulation(seed: u64) -> Result<Simulator> {
    let d = Distribution::new(100, 150, 3.0).with_seed(seed);
    Simulator::new(params(), InitialState::Distribution(d))
}

/// Every generated particle starts with exactly the requested speed.
#[test]
fn initial_distribution_v_init() -> Result<()> {
    let sim = new_simulation(2024)?;
    for p in sim.particles() {
        assert!(
            (p.speed() - 3.0).abs() < 1e-9,
            "speed {} differs from v_init",
            p.speed()
        );
    }
    Ok(())
}

/// Id parity matches the side each particle was created on.
#[test]
fn particle_count_by_side() -> Result<()> {
    let sim = new_simulation(31)?;
    let (left, right) = sim.provenance_counts();
    assert_eq!(sim.num_particles(), 250);
    assert_eq!(left, 100);
    assert_eq!(right, 150);
    assert_eq!(left + right, sim.num_particles());

    let barrier_x = sim.parameters().barrier_x;
    for p in sim.particles() {
        match p.side() {
            Side::Left => assert!(p.id % 2 == 0 && p.pos_x < barrier_x),
            Side::Right => assert!(p.id % 2 == 1 && p.pos_x > barrier_x),
        }
    }
    Ok(())
}

#[test]
fn particles_not_touching() -> Result<()> {
    let sim = new_simulation(77)?;
    let r = sim.parameters().particle_r;
    let ps = sim.particles();
    for (i, a) in ps.iter().enumerate() {
        for b in &ps[i + 1..] {
            assert!(!a.overlaps(b, r), "{a:?} overlaps {b:?}");
        }
    }
    Ok(())
}

#[test]
fn ids_are_unique_and_sequential() -> Result<()> {
    let sim = new_simulation(5)?;
    let mut indices: Vec<u32> = sim.particles().iter().map(|p| p.index()).collect();
    indices.sort_unstable();
    let expected: Vec<u32> = (0..250).collect();
    assert_eq!(indices, expected);
    Ok(())
}

/// No particle may travel more than a radius (in fact r/8) in one step.
#[test]
fn time_step_limits_travel() -> Result<()> {
    let sim = new_simulation(8)?;
    let dt = sim.calculate_time_step()?;
    let r = sim.parameters().particle_r;
    for p in sim.particles() {
        assert!(p.speed() * dt <= r / 8.0 + 1e-15);
        assert!(p.speed() * dt <= r);
    }
    Ok(())
}

#[test]
fn resting_gas_uses_gravity_fallback() -> Result<()> {
    let d = Distribution::new(3, 3, 0.0).with_seed(1);
    let sim = Simulator::new(params(), InitialState::Distribution(d))?;
    let dt = sim.calculate_time_step()?;
    assert_eq!(dt, (0.2_f64 / (4.0 * 9.8)).sqrt());
    Ok(())
}

#[test]
fn inconsistent_geometry_rejected() {
    let bad = Parameters {
        hole_height: 250.0,
        ..params()
    };
    let d = Distribution::new(1, 1, 1.0);
    let err = Simulator::new(bad, InitialState::Distribution(d)).unwrap_err();
    assert!(err.to_string().contains("hole"));
}
