use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

fn default_g() -> f64 {
    9.8
}

/// Physical and geometric parameters of a run.
///
/// The field order matches the run file header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Box width (meters).
    pub box_width: f64,
    /// Box height (meters).
    pub box_height: f64,
    /// Speed added on reflection from the top wall.
    pub delta_v_top: f64,
    /// Speed added on reflection from the bottom wall.
    pub delta_v_bottom: f64,
    /// Speed added on reflection from side walls and barrier faces.
    pub delta_v_side: f64,
    /// x coordinate of the barrier center.
    pub barrier_x: f64,
    /// Barrier thickness.
    pub barrier_width: f64,
    /// y coordinate of the hole center.
    pub hole_y: f64,
    /// Hole height.
    pub hole_height: f64,
    /// Fraction of speed both particles lose in a collision, in [0, 1].
    pub v_loss: f64,
    /// Radius shared by all particles.
    pub particle_r: f64,
    /// Gravitational acceleration (meters per square second).
    #[serde(default = "default_g")]
    pub g: f64,
}

impl Parameters {
    /// The scalars in header order.
    pub fn to_array(&self) -> [f64; 12] {
        [
            self.box_width,
            self.box_height,
            self.delta_v_top,
            self.delta_v_bottom,
            self.delta_v_side,
            self.barrier_x,
            self.barrier_width,
            self.hole_y,
            self.hole_height,
            self.v_loss,
            self.particle_r,
            self.g,
        ]
    }

    /// Inverse of [`Parameters::to_array`].
    pub fn from_array(v: [f64; 12]) -> Self {
        Self {
            box_width: v[0],
            box_height: v[1],
            delta_v_top: v[2],
            delta_v_bottom: v[3],
            delta_v_side: v[4],
            barrier_x: v[5],
            barrier_width: v[6],
            hole_y: v[7],
            hole_height: v[8],
            v_loss: v[9],
            particle_r: v[10],
            g: v[11],
        }
    }

    /// Check the configuration for values no run can be built from.
    ///
    /// Errors: `Error::InvalidParam` naming the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        const NAMES: [&str; 12] = [
            "box_width",
            "box_height",
            "delta_v_top",
            "delta_v_bottom",
            "delta_v_side",
            "barrier_x",
            "barrier_width",
            "hole_y",
            "hole_height",
            "v_loss",
            "particle_r",
            "g",
        ];
        for (name, value) in NAMES.iter().zip(self.to_array()) {
            if !value.is_finite() {
                return Err(Error::InvalidParam(format!("{name} must be finite")));
            }
        }
        if self.box_width <= 0.0 {
            return Err(Error::InvalidParam("box_width must be > 0".into()));
        }
        if self.box_height <= 0.0 {
            return Err(Error::InvalidParam("box_height must be > 0".into()));
        }
        if self.particle_r <= 0.0 {
            return Err(Error::InvalidParam("particle_r must be > 0".into()));
        }
        if 2.0 * self.particle_r > self.box_width.min(self.box_height) {
            return Err(Error::InvalidParam(
                "particle_r must fit the box: 2 * particle_r <= min(box_width, box_height)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.v_loss) {
            return Err(Error::InvalidParam("v_loss must lie in [0, 1]".into()));
        }
        if self.barrier_width < 0.0 {
            return Err(Error::InvalidParam("barrier_width must be >= 0".into()));
        }
        let half_barrier = self.barrier_width / 2.0;
        if self.barrier_x - half_barrier <= 0.0 || self.barrier_x + half_barrier >= self.box_width
        {
            return Err(Error::InvalidParam(format!(
                "barrier_x = {} with barrier_width = {} does not fit strictly inside the box width {}",
                self.barrier_x, self.barrier_width, self.box_width
            )));
        }
        if self.hole_height < 0.0 {
            return Err(Error::InvalidParam("hole_height must be >= 0".into()));
        }
        let half_hole = self.hole_height / 2.0;
        if self.hole_y - half_hole < 0.0 || self.hole_y + half_hole > self.box_height {
            return Err(Error::InvalidParam(format!(
                "hole_y = {} with hole_height = {} extends outside the box height {}",
                self.hole_y, self.hole_height, self.box_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample() -> Parameters {
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
