use crate::error::{Error, Result};

/// Which chamber a particle was created in, encoded in the low bit of its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// A disk-shaped particle in the 2D box.
///
/// Fields:
/// - `id`: creation index shifted left by one, low bit = [`Side`]
/// - `pos_x`, `pos_y`: center position (meters)
/// - `velocity_x`, `velocity_y`: velocity (meters/second)
///
/// The radius is shared by every particle and lives on the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Provenance-tagged identifier; never changed after creation.
    pub id: u32,
    /// Center x.
    pub pos_x: f64,
    /// Center y.
    pub pos_y: f64,
    /// Velocity x.
    pub velocity_x: f64,
    /// Velocity y.
    pub velocity_y: f64,
}

impl Particle {
    /// Create a new particle after validating that all components are finite.
    pub fn new(id: u32, pos_x: f64, pos_y: f64, velocity_x: f64, velocity_y: f64) -> Result<Self> {
        if !(pos_x.is_finite() && pos_y.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !(velocity_x.is_finite() && velocity_y.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            id,
            pos_x,
            pos_y,
            velocity_x,
            velocity_y,
        })
    }

    /// Compose an id from a creation index and the chamber it was placed in.
    #[inline]
    pub fn make_id(index: u32, side: Side) -> u32 {
        match side {
            Side::Left => index << 1,
            Side::Right => 1 | (index << 1),
        }
    }

    /// Chamber the particle was originally placed in.
    #[inline]
    pub fn side(&self) -> Side {
        if self.id & 1 == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Creation index (id without the provenance bit).
    #[inline]
    pub fn index(&self) -> u32 {
        self.id >> 1
    }

    /// Magnitude of the velocity vector.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity_x.hypot(self.velocity_y)
    }

    /// Euclidean distance between the two centers.
    #[inline]
    pub fn distance(&self, other: &Particle) -> f64 {
        (other.pos_x - self.pos_x).hypot(other.pos_y - self.pos_y)
    }

    /// True if the two disks of radius `radius` intersect.
    #[inline]
    pub fn overlaps(&self, other: &Particle, radius: f64) -> bool {
        self.distance(other) < 2.0 * radius
    }

    /// True if the pair is closing on at least one axis.
    ///
    /// Per axis the separation `other - self` is multiplied by the relative
    /// velocity `self - other`; a positive product means the gap shrinks.
    #[inline]
    pub fn approaches(&self, other: &Particle) -> bool {
        let closing_x = (other.pos_x - self.pos_x) * (self.velocity_x - other.velocity_x);
        let closing_y = (other.pos_y - self.pos_y) * (self.velocity_y - other.velocity_y);
        closing_x > 0.0 || closing_y > 0.0
    }

    /// Multiply the velocity vector by `factor`.
    #[inline]
    pub fn scale_velocity(&mut self, factor: f64) {
        self.velocity_x *= factor;
        self.velocity_y *= factor;
    }
}
