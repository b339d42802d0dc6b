use crate::core::distribution::Distribution;
use crate::core::geometry::Geometry;
use crate::core::params::Parameters;
use crate::core::particle::Particle;
use crate::error::{Error, Result};
use ordered_float::OrderedFloat;

/// How the simulator obtains its particles.
#[derive(Debug, Clone)]
pub enum InitialState {
    /// Generate a fresh distribution.
    Distribution(Distribution),
    /// Continue from an existing particle set (e.g. loaded from a run file).
    Particles(Vec<Particle>),
}

/// Elapsed time plus a copy of every particle, in working order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub time_elapsed: f64,
    pub particles: Vec<Particle>,
}

/// Granular gas in a box split by a barrier with a hole.
///
/// Particles fall under gravity, reflect off walls and barrier faces with a
/// per-wall speed offset, and lose a fixed fraction of their speed whenever
/// two of them collide. Stepping is single-threaded and fully deterministic.
///
/// Particle order is not stable across steps: the collision pass sorts the
/// working buffer by `pos_y`. Snapshots carry whatever order the buffer had.
#[derive(Debug, Clone)]
pub struct Simulator {
    params: Parameters,
    geometry: Geometry,
    time_elapsed: f64,
    particles: Vec<Particle>,
}

impl Simulator {
    /// Create a simulator after validating `params`.
    ///
    /// Errors: `Error::InvalidParam` for inconsistent geometry or an
    /// unsatisfiable distribution request.
    pub fn new(params: Parameters, init: InitialState) -> Result<Self> {
        Self::resume(params, init, 0.0)
    }

    /// Like [`Simulator::new`] with the clock starting at `time_elapsed`.
    pub fn resume(params: Parameters, init: InitialState, time_elapsed: f64) -> Result<Self> {
        params.validate()?;
        if !time_elapsed.is_finite() || time_elapsed < 0.0 {
            return Err(Error::InvalidParam(
                "time_elapsed must be finite and >= 0".into(),
            ));
        }
        let geometry = Geometry::new(&params);
        let particles = match init {
            InitialState::Distribution(d) => d.generate(&geometry, params.particle_r)?,
            InitialState::Particles(p) => p,
        };
        log::debug!(
            "simulator ready: {} particles, box {}x{}, t = {}",
            particles.len(),
            params.box_width,
            params.box_height,
            time_elapsed
        );
        Ok(Self {
            params,
            geometry,
            time_elapsed,
            particles,
        })
    }

    /// Parameters the simulator was built with.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Cached bounds, e.g. for drawing the barrier.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Replace the parameters and recompute the cached geometry.
    pub fn set_parameters(&mut self, params: Parameters) -> Result<()> {
        params.validate()?;
        self.params = params;
        self.geometry = Geometry::new(&params);
        Ok(())
    }

    /// Current simulation time.
    pub fn time_elapsed(&self) -> f64 {
        self.time_elapsed
    }

    /// Particles in working order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time_elapsed: self.time_elapsed,
            particles: self.particles.clone(),
        }
    }

    /// Replace time and particles with a recorded state.
    pub(crate) fn restore(&mut self, time_elapsed: f64, particles: Vec<Particle>) {
        self.time_elapsed = time_elapsed;
        self.particles = particles;
    }

    /// Time step that keeps the fastest particle within `particle_r / 8`.
    ///
    /// When everything is at rest, falls back to `sqrt(particle_r / (4 g))`.
    ///
    /// Errors: `Error::EmptySystem` without particles; `Error::MathError` if
    /// the fallback is not finite (at rest with `g <= 0`).
    pub fn calculate_time_step(&self) -> Result<f64> {
        if self.particles.is_empty() {
            return Err(Error::EmptySystem);
        }
        let r = self.params.particle_r;
        let max_speed = self
            .particles
            .iter()
            .map(Particle::speed)
            .fold(0.0_f64, f64::max);
        if max_speed > 0.0 {
            return Ok((r / 8.0) / max_speed);
        }
        let dt = (r / (4.0 * self.params.g)).sqrt();
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::MathError(format!(
                "all particles at rest and g = {} gives no finite time step",
                self.params.g
            )));
        }
        Ok(dt)
    }

    /// Advance one step and return its length without touching the clock.
    ///
    /// Order: free flight under gravity, pairwise collisions on the y-sorted
    /// buffer, then wall and barrier reflections per particle.
    pub fn next_state(&mut self) -> Result<f64> {
        let dt = self.calculate_time_step()?;
        let g = self.params.g;
        let gravity_pull = g * dt * dt / 2.0;

        // Position uses the velocity from before this step.
        for p in &mut self.particles {
            p.pos_x += p.velocity_x * dt;
            p.pos_y += p.velocity_y * dt - gravity_pull;
            p.velocity_y -= g * dt;
        }

        self.particles.sort_by_key(|p| OrderedFloat(p.pos_y));
        resolve_pairs(
            &mut self.particles,
            self.params.particle_r,
            self.params.v_loss,
        );

        for p in &mut self.particles {
            reflect(p, &self.geometry, &self.params);
        }

        Ok(dt)
    }

    /// Advance one step and the clock; returns the elapsed delta.
    pub fn step(&mut self) -> Result<f64> {
        let dt = self.next_state()?;
        self.time_elapsed += dt;
        Ok(dt)
    }

    /// Run for `num_seconds`, yielding a snapshot every `1 / num_snapshots`
    /// seconds starting with the current state.
    ///
    /// The iterator yields `floor(num_seconds * num_snapshots) + 1` items and
    /// advances this simulator as it goes; dropping it early leaves the
    /// simulator at the last reached state.
    pub fn simulate(&mut self, num_seconds: f64, num_snapshots: u32) -> Result<Simulate<'_>> {
        if !num_seconds.is_finite() || num_seconds < 0.0 {
            return Err(Error::InvalidParam(
                "num_seconds must be finite and >= 0".into(),
            ));
        }
        if num_snapshots == 0 {
            return Err(Error::InvalidParam("num_snapshots must be > 0".into()));
        }
        let fps = f64::from(num_snapshots);
        let frames = (num_seconds * fps).floor();
        if frames >= usize::MAX as f64 {
            return Err(Error::InvalidParam(format!(
                "{num_seconds} s at {num_snapshots} snapshots per second is too many snapshots"
            )));
        }
        let total = frames as usize + 1;
        Ok(Simulate {
            start: self.time_elapsed,
            fps,
            emitted: 0,
            total,
            sim: self,
        })
    }
}

/// Iterator returned by [`Simulator::simulate`].
pub struct Simulate<'a> {
    sim: &'a mut Simulator,
    start: f64,
    fps: f64,
    emitted: usize,
    total: usize,
}

impl Simulate<'_> {
    /// Snapshots this run yields in total.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for Simulate<'_> {
    type Item = Result<Snapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.total {
            return None;
        }
        let target = self.start + self.emitted as f64 / self.fps;
        while self.sim.time_elapsed < target {
            if let Err(e) = self.sim.step() {
                self.emitted = self.total;
                return Some(Err(e));
            }
        }
        self.emitted += 1;
        Some(Ok(self.sim.snapshot()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.emitted;
        (left, Some(left))
    }
}

/// Inelastic pass over a buffer sorted by `pos_y`.
///
/// For each overlapping, approaching pair both velocities shrink by
/// `1 - v_loss` and the full overlap is removed by moving a single particle
/// along the center line: the upper one when the pair is vertically ordered,
/// otherwise the one earlier in the buffer.
fn resolve_pairs(particles: &mut [Particle], radius: f64, v_loss: f64) {
    let reach = 2.0 * radius;
    let keep = 1.0 - v_loss;
    for i in 0..particles.len() {
        let (head, tail) = particles.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if b.pos_y - a.pos_y >= reach {
                break;
            }
            if a.overlaps(b, radius) && a.approaches(b) {
                collide(a, b, radius, keep);
            }
        }
    }
}

fn collide(a: &mut Particle, b: &mut Particle, radius: f64, keep: f64) {
    a.scale_velocity(keep);
    b.scale_velocity(keep);

    let dx = b.pos_x - a.pos_x;
    let dy = b.pos_y - a.pos_y;
    let dist = dx.hypot(dy);
    let overlap = 2.0 * radius - dist;
    let (nx, ny) = if dist > 0.0 {
        (dx / dist, dy / dist)
    } else {
        (0.0, 1.0)
    };
    if dy > 0.0 {
        b.pos_x += nx * overlap;
        b.pos_y += ny * overlap;
    } else {
        a.pos_x -= nx * overlap;
        a.pos_y -= ny * overlap;
    }
}

/// Clamp to walls and barrier, flipping the hit component and adding the wall's delta.
///
/// Outer walls and the barrier are tested independently; a particle clamped
/// by a wall this step can still hit the barrier. A center pushed into the
/// solid barrier goes back out through the nearer face, never along it.
fn reflect(p: &mut Particle, geo: &Geometry, params: &Parameters) {
    if p.pos_y > geo.y_max {
        p.pos_y = geo.y_max;
        p.velocity_y = -p.velocity_y - params.delta_v_top;
    }
    if p.pos_y < geo.y_min {
        p.pos_y = geo.y_min;
        p.velocity_y = -p.velocity_y + params.delta_v_bottom;
    }
    if p.pos_x < geo.x_min {
        p.pos_x = geo.x_min;
        p.velocity_x = -p.velocity_x + params.delta_v_side;
    }
    if p.pos_x > geo.x_max {
        p.pos_x = geo.x_max;
        p.velocity_x = -p.velocity_x - params.delta_v_side;
    }

    if !geo.in_barrier_band(p.pos_x) {
        return;
    }
    if geo.in_hole_band(p.pos_x) && geo.in_hole_opening(p.pos_y) {
        // Inside the hole: only its upper and lower edges can be hit.
        if p.pos_y > geo.hole_y_max {
            p.pos_y = geo.hole_y_max;
            p.velocity_y = -p.velocity_y - params.delta_v_top;
        } else if p.pos_y < geo.hole_y_min {
            p.pos_y = geo.hole_y_min;
            p.velocity_y = -p.velocity_y + params.delta_v_bottom;
        }
    } else if !geo.clears_hole(p.pos_y) {
        if p.pos_x < params.barrier_x {
            p.pos_x = geo.barrier_x_min;
            p.velocity_x = -p.velocity_x - params.delta_v_side;
        } else {
            p.pos_x = geo.barrier_x_max;
            p.velocity_x = -p.velocity_x + params.delta_v_side;
        }
    }
}
