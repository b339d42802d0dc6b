//! Simulation engine: particles, cached geometry, initial placement and the
//! adaptive time-stepping integrator.

pub mod diagnostics;
pub mod distribution;
pub mod geometry;
pub mod params;
pub mod particle;
pub mod sim;

pub use distribution::Distribution;
pub use geometry::Geometry;
pub use params::Parameters;
pub use particle::{Particle, Side};
pub use sim::{InitialState, Simulate, Simulator, Snapshot};
