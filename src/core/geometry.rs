use crate::core::params::Parameters;

/// Bounds derived from [`Parameters`], cached by the simulator.
///
/// Limits named `*_min`/`*_max` are travel limits for particle centers and
/// include the radius clearance. `barrier_x_left/right` and
/// `hole_y_top/bottom` are the true geometric edges used for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Barrier collision band (faces padded by the radius).
    pub barrier_x_min: f64,
    pub barrier_x_max: f64,
    /// Physical barrier faces.
    pub barrier_x_left: f64,
    pub barrier_x_right: f64,
    /// Center travel limits while inside the hole.
    pub hole_y_min: f64,
    pub hole_y_max: f64,
    /// Physical hole edges.
    pub hole_y_top: f64,
    pub hole_y_bottom: f64,
}

impl Geometry {
    /// Derive every bound from `p`.
    pub fn new(p: &Parameters) -> Self {
        let r = p.particle_r;
        let half_barrier = p.barrier_width / 2.0;
        let half_hole = p.hole_height / 2.0;

        let barrier_x_left = p.barrier_x - half_barrier;
        let barrier_x_right = p.barrier_x + half_barrier;
        let hole_y_top = p.hole_y + half_hole;
        let hole_y_bottom = p.hole_y - half_hole;

        Self {
            x_min: r,
            x_max: p.box_width - r,
            y_min: r,
            y_max: p.box_height - r,
            barrier_x_min: barrier_x_left - r,
            barrier_x_max: barrier_x_right + r,
            barrier_x_left,
            barrier_x_right,
            hole_y_min: hole_y_bottom + r,
            hole_y_max: hole_y_top - r,
            hole_y_top,
            hole_y_bottom,
        }
    }

    /// Center x is inside the padded barrier band.
    #[inline]
    pub fn in_barrier_band(&self, x: f64) -> bool {
        self.barrier_x_min < x && x < self.barrier_x_max
    }

    /// Center x is between the physical faces, i.e. the particle is in the hole.
    #[inline]
    pub fn in_hole_band(&self, x: f64) -> bool {
        self.barrier_x_left <= x && x <= self.barrier_x_right
    }

    /// Center y lets the disk pass the hole without touching its edges.
    #[inline]
    pub fn clears_hole(&self, y: f64) -> bool {
        self.hole_y_min <= y && y <= self.hole_y_max
    }

    /// Center y lies between the physical hole edges.
    #[inline]
    pub fn in_hole_opening(&self, y: f64) -> bool {
        self.hole_y_bottom <= y && y <= self.hole_y_top
    }

    /// Center is in the padded barrier band but cannot pass the hole.
    pub fn blocked_by_barrier(&self, x: f64, y: f64) -> bool {
        self.in_barrier_band(x) && !self.clears_hole(y)
    }

    /// Sampling x-range of the left chamber for initial placement.
    pub fn left_chamber(&self) -> (f64, f64) {
        (self.x_min, self.barrier_x_min)
    }

    /// Sampling x-range of the right chamber for initial placement.
    pub fn right_chamber(&self) -> (f64, f64) {
        (self.barrier_x_max, self.x_max)
    }
}
