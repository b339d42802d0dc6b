//! Distribution diagnostics over the current particle set.
//!
//! The speed histogram approaches a 2D Maxwell distribution once the gas has
//! mixed; the height histogram shows the barometric (Boltzmann) profile.

use crate::core::particle::{Particle, Side};
use crate::core::sim::Simulator;
use crate::error::{Error, Result};

/// Equal-width histogram over `values` spanning their min..max.
///
/// Returns `(edges, counts)` with `edges.len() == bins + 1`. The maximum value
/// is counted in the last bin. A degenerate range is widened by 0.5 each side.
pub fn histogram(values: &[f64], bins: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if bins == 0 {
        return Err(Error::InvalidParam("bins must be > 0".into()));
    }
    if values.is_empty() {
        return Err(Error::InvalidParam("histogram needs at least one value".into()));
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(Error::MathError("histogram values must be finite".into()));
    }
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|k| lo + width * k as f64).collect();
    let mut counts = vec![0.0_f64; bins];
    for &v in values {
        let k = (((v - lo) / width) as usize).min(bins - 1);
        counts[k] += 1.0;
    }
    Ok((edges, counts))
}

impl Simulator {
    /// Histogram of particle speeds.
    pub fn speed_histogram(&self, bins: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let speeds: Vec<f64> = self.particles().iter().map(Particle::speed).collect();
        histogram(&speeds, bins)
    }

    /// Histogram of particle heights.
    pub fn height_histogram(&self, bins: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let heights: Vec<f64> = self.particles().iter().map(|p| p.pos_y).collect();
        histogram(&heights, bins)
    }

    /// Total kinetic energy with unit particle mass.
    pub fn kinetic_energy(&self) -> f64 {
        self.particles()
            .iter()
            .map(|p| 0.5 * (p.velocity_x * p.velocity_x + p.velocity_y * p.velocity_y))
            .sum()
    }

    /// Particles currently left and right of the barrier center.
    pub fn chamber_counts(&self) -> (usize, usize) {
        let barrier_x = self.parameters().barrier_x;
        let left = self
            .particles()
            .iter()
            .filter(|p| p.pos_x < barrier_x)
            .count();
        (left, self.num_particles() - left)
    }

    /// Particles by the chamber they were created in.
    pub fn provenance_counts(&self) -> (usize, usize) {
        let left = self
            .particles()
            .iter()
            .filter(|p| p.side() == Side::Left)
            .count();
        (left, self.num_particles() - left)
    }
}
