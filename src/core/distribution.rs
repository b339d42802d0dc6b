use crate::core::geometry::Geometry;
use crate::core::particle::{Particle, Side};
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::TAU;

/// Request for a fresh initial state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
    /// Particles placed left of the barrier.
    pub n_left: u32,
    /// Particles placed right of the barrier.
    pub n_right: u32,
    /// Initial speed of every particle (>= 0).
    pub v_init: f64,
    /// RNG seed for reproducibility; `None` for nondeterministic.
    pub seed: Option<u64>,
}

impl Distribution {
    /// Unseeded request; every call to `generate` draws a new layout.
    pub fn new(n_left: u32, n_right: u32, v_init: f64) -> Self {
        Self {
            n_left,
            n_right,
            v_init,
            seed: None,
        }
    }

    /// Fix the RNG seed so `generate` is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Place `n_left + n_right` non-overlapping particles, left chamber first.
    ///
    /// Positions are uniform within each chamber and directions uniform on the
    /// circle. A candidate is only checked against particles already accepted
    /// in the same chamber; the barrier keeps the chambers apart. There is no
    /// retry cap, so requests denser than the chamber can hold do not return.
    pub fn generate(&self, geometry: &Geometry, radius: f64) -> Result<Vec<Particle>> {
        if !self.v_init.is_finite() || self.v_init < 0.0 {
            return Err(Error::InvalidParam("v_init must be finite and >= 0".into()));
        }
        self.n_left
            .checked_add(self.n_right)
            .filter(|&n| n <= u32::MAX >> 1)
            .ok_or_else(|| Error::InvalidParam("n_left + n_right does not fit a particle id".into()))?;

        let mut rng: StdRng = match self.seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let total = (self.n_left + self.n_right) as usize;
        let mut particles: Vec<Particle> = Vec::with_capacity(total);

        let chambers = [
            (Side::Left, self.n_left, geometry.left_chamber()),
            (Side::Right, self.n_right, geometry.right_chamber()),
        ];
        let mut index = 0u32;
        for (side, count, (x_lo, x_hi)) in chambers {
            if count > 0 && x_lo > x_hi {
                return Err(Error::InvalidParam(format!(
                    "{side:?} chamber has no room for a particle of radius {radius}"
                )));
            }
            let start = particles.len();
            for _ in 0..count {
                let (pos_x, pos_y) = loop {
                    let x = rng.random_range(x_lo..=x_hi);
                    let y = rng.random_range(geometry.y_min..=geometry.y_max);
                    if !overlaps_existing(&particles[start..], x, y, radius) {
                        break (x, y);
                    }
                };
                let angle = rng.random_range(0.0..TAU);
                particles.push(Particle {
                    id: Particle::make_id(index, side),
                    pos_x,
                    pos_y,
                    velocity_x: self.v_init * angle.cos(),
                    velocity_y: self.v_init * angle.sin(),
                });
                index += 1;
            }
        }

        log::debug!(
            "placed {} particles ({} left, {} right)",
            particles.len(),
            self.n_left,
            self.n_right
        );
        Ok(particles)
    }
}

fn overlaps_existing(existing: &[Particle], x: f64, y: f64, radius: f64) -> bool {
    let min_sq = (2.0 * radius) * (2.0 * radius);
    existing.iter().any(|p| {
        let dx = p.pos_x - x;
        let dy = p.pos_y - y;
        dx * dx + dy * dy < min_sq
    })
}
