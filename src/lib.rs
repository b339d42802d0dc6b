//! Particles in a box: a granular gas split by a barrier with a hole.
//!
//! The engine steps a fixed population of equal disks under gravity with
//! inelastic pair collisions and energy-injecting walls, and records runs in
//! a seekable little-endian binary format for later playback.
//!
//! ```no_run
//! use pibsim::core::{Distribution, InitialState, Parameters, Simulator};
//! use pibsim::io::Playback;
//!
//! # fn main() -> pibsim::error::Result<()> {
//! let params = Parameters {
//!     box_width: 100.0,
//!     box_height: 100.0,
//!     delta_v_top: 0.5,
//!     delta_v_bottom: 0.3,
//!     delta_v_side: 0.3,
//!     barrier_x: 40.0,
//!     barrier_width: 3.0,
//!     hole_y: 30.0,
//!     hole_height: 10.0,
//!     v_loss: 0.21,
//!     particle_r: 0.2,
//!     g: 9.8,
//! };
//! let init = InitialState::Distribution(Distribution::new(100, 150, 3.0));
//! let mut sim = Simulator::new(params, init)?;
//! sim.write_run("run.bin", 2.0, 30, true)?;
//!
//! let mut playback = Playback::open("run.bin")?;
//! let frame = playback.seek(playback.snapshot_count() - 1)?;
//! println!("t = {}", frame.time_elapsed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod io;

#[cfg(feature = "python")]
mod python;

pub use crate::core::{Distribution, InitialState, Parameters, Particle, Simulator, Snapshot};
pub use crate::error::{Error, Result};
pub use crate::io::{Playback, RunWriter};
