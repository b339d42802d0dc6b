use pibsim::core::{Distribution, InitialState, Parameters, Particle, Simulator};
use pibsim::error::{Error, Result};
use pibsim::io::{snapshot_size, Playback, HEADER_SIZE};
use std::fs;
use std::path::PathBuf;

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

/// Temporary run file removed on drop.
struct TempRun(PathBuf);

impl TempRun {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "pibsim-{}-{}.bin",
            name,
            std::process::id()
        ));
        Self(path)
    }
}

impl Drop for TempRun {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

/// One particle, one second, one frame per second: the initial state and t = 1.
#[test]
fn single_particle_run_plays_back() -> Result<()> {
    let file = TempRun::new("single");
    let d = Distribution::new(1, 0, 2.0).with_seed(10);
    let mut sim = Simulator::new(params(), InitialState::Distribution(d))?;
    let initial: Vec<Particle> = sim.particles().to_vec();

    let frames = sim.write_run(&file.0, 1.0, 1, true)?;
    assert_eq!(frames, 2);

    let len = fs::metadata(&file.0)?.len() as usize;
    assert_eq!(len, HEADER_SIZE + 2 * snapshot_size(1));

    let mut playback = Playback::open(&file.0)?;
    assert_eq!(playback.snapshot_count(), 2);
    assert_eq!(playback.simulator().parameters(), &params());

    let first = playback.seek(0)?;
    assert_eq!(first.time_elapsed, 0.0);
    assert!((first.particles[0].pos_x - initial[0].pos_x).abs() < 1e-12);
    assert!((first.particles[0].pos_y - initial[0].pos_y).abs() < 1e-12);

    let last = playback.seek(1)?;
    assert!(last.time_elapsed >= 1.0);
    assert_eq!(last.particles, sim.particles());
    Ok(())
}

#[test]
fn seek_bounds_and_idempotence() -> Result<()> {
    let file = TempRun::new("bounds");
    let d = Distribution::new(6, 6, 3.0).with_seed(4);
    let mut sim = Simulator::new(params(), InitialState::Distribution(d))?;
    sim.write_run(&file.0, 1.0, 5, true)?;

    let mut playback = Playback::open(&file.0)?;
    let count = playback.snapshot_count();
    assert_eq!(count, 6);

    let a = playback.seek(2)?;
    let b = playback.seek(2)?;
    assert_eq!(a, b);

    assert!(playback.seek(count - 1).is_ok());
    match playback.seek(count) {
        Err(Error::OutOfRange { index, count: c }) => {
            assert_eq!(index, count);
            assert_eq!(c, count);
        }
        other => panic!("expected out-of-range, got {:?}", other.map(|s| s.time_elapsed)),
    }
    Ok(())
}

/// Frames store the working order, which playback restores verbatim.
#[test]
fn playback_restores_working_order() -> Result<()> {
    let file = TempRun::new("order");
    let d = Distribution::new(20, 20, 3.0).with_seed(66);
    let mut sim = Simulator::new(params(), InitialState::Distribution(d))?;
    sim.write_run(&file.0, 0.5, 10, true)?;

    let mut playback = Playback::open(&file.0)?;
    let last = playback.seek(playback.snapshot_count() - 1)?;
    let ids: Vec<u32> = sim.particles().iter().map(|p| p.id & 0xFF).collect();
    let replayed: Vec<u32> = last.particles.iter().map(|p| p.id).collect();
    assert_eq!(ids, replayed);
    Ok(())
}

#[test]
fn append_continues_from_last_frame() -> Result<()> {
    let file = TempRun::new("append");
    let d = Distribution::new(3, 3, 1.0).with_seed(2);
    let mut sim = Simulator::new(params(), InitialState::Distribution(d))?;
    sim.write_run(&file.0, 1.0, 2, true)?;

    let mut playback = Playback::open(&file.0)?;
    assert_eq!(playback.snapshot_count(), 3);
    playback.set_state(2)?;
    let mut resumed = playback.into_simulator();
    let t_resume = resumed.time_elapsed();

    let appended = resumed.write_run(&file.0, 1.0, 2, false)?;
    assert_eq!(appended, 2);

    let mut playback = Playback::open(&file.0)?;
    assert_eq!(playback.snapshot_count(), 5);
    assert_eq!(playback.seek(2)?.time_elapsed, t_resume);
    assert!(playback.seek(4)?.time_elapsed >= t_resume + 1.0);
    Ok(())
}

#[test]
fn append_rejects_other_parameters() -> Result<()> {
    let file = TempRun::new("mismatch");
    let d = Distribution::new(2, 2, 1.0).with_seed(2);
    let mut sim = Simulator::new(params(), InitialState::Distribution(d))?;
    sim.write_run(&file.0, 0.5, 2, true)?;

    let other = Parameters {
        v_loss: 0.5,
        ..params()
    };
    let d = Distribution::new(2, 2, 1.0).with_seed(2);
    let mut sim = Simulator::new(other, InitialState::Distribution(d))?;
    let err = sim.write_run(&file.0, 0.5, 2, false).unwrap_err();
    assert!(err.to_string().contains("different parameters"));
    Ok(())
}

#[test]
fn truncated_header_is_reported() -> Result<()> {
    let file = TempRun::new("truncated");
    fs::write(&file.0, [0u8; 30])?;
    match Playback::open(&file.0) {
        Err(Error::Truncated { what, actual, .. }) => {
            assert_eq!(what, "header");
            assert_eq!(actual, 30);
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected a truncated header error"),
    }
    Ok(())
}

#[test]
fn missing_file_is_io_error() {
    let file = TempRun::new("missing");
    assert!(matches!(Playback::open(&file.0), Err(Error::Io(_))));
}
