use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::{PyIOError, PyIndexError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::{Distribution, InitialState, Parameters, Particle, Simulator};
use crate::error::Error;
use crate::io::Playback;

fn py_err(e: Error) -> PyErr {
    match e {
        Error::OutOfRange { .. } => PyIndexError::new_err(e.to_string()),
        Error::Io(_) => PyIOError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

/// Particles as an (N, 5) array of [pos_x, pos_y, velocity_x, velocity_y, id].
fn particle_array<'py>(py: Python<'py>, particles: &[Particle]) -> Py<PyArray2<f64>> {
    let mut arr = Array2::<f64>::zeros((particles.len(), 5));
    for (i, p) in particles.iter().enumerate() {
        arr[[i, 0]] = p.pos_x;
        arr[[i, 1]] = p.pos_y;
        arr[[i, 2]] = p.velocity_x;
        arr[[i, 3]] = p.velocity_y;
        arr[[i, 4]] = f64::from(p.id);
    }
    arr.into_pyarray(py).to_owned().into()
}

fn geometry_dict<'py>(py: Python<'py>, sim: &Simulator) -> PyResult<Py<PyDict>> {
    let g = sim.geometry();
    let out = PyDict::new(py);
    out.set_item("x_min", g.x_min)?;
    out.set_item("x_max", g.x_max)?;
    out.set_item("y_min", g.y_min)?;
    out.set_item("y_max", g.y_max)?;
    out.set_item("barrier_x_left", g.barrier_x_left)?;
    out.set_item("barrier_x_right", g.barrier_x_right)?;
    out.set_item("hole_y_top", g.hole_y_top)?;
    out.set_item("hole_y_bottom", g.hole_y_bottom)?;
    Ok(out.into())
}

/// Python-facing wrapper around [`Simulator`].
#[pyclass(name = "Simulator")]
pub struct PySimulator {
    sim: Simulator,
}

#[pymethods]
impl PySimulator {
    /// Build a simulator with a fresh distribution of `n_left + n_right` particles.
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[allow(clippy::too_many_arguments)]
    #[pyo3(signature = (
        box_width, box_height, delta_v_top, delta_v_bottom, delta_v_side,
        barrier_x, barrier_width, hole_y, hole_height, v_loss, particle_r,
        g=9.8, n_left=500, n_right=500, v_init=0.0, seed=None
    ))]
    fn new(
        box_width: f64,
        box_height: f64,
        delta_v_top: f64,
        delta_v_bottom: f64,
        delta_v_side: f64,
        barrier_x: f64,
        barrier_width: f64,
        hole_y: f64,
        hole_height: f64,
        v_loss: f64,
        particle_r: f64,
        g: f64,
        n_left: u32,
        n_right: u32,
        v_init: f64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let params = Parameters {
            box_width,
            box_height,
            delta_v_top,
            delta_v_bottom,
            delta_v_side,
            barrier_x,
            barrier_width,
            hole_y,
            hole_height,
            v_loss,
            particle_r,
            g,
        };
        let init = InitialState::Distribution(Distribution {
            n_left,
            n_right,
            v_init,
            seed,
        });
        let sim = Simulator::new(params, init).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Advance one step; returns the elapsed delta.
    fn step(&mut self) -> PyResult<f64> {
        self.sim.step().map_err(py_err)
    }

    #[getter]
    fn time_elapsed(&self) -> f64 {
        self.sim.time_elapsed()
    }

    fn __len__(&self) -> usize {
        self.sim.num_particles()
    }

    /// Current particles as an (N, 5) float64 array.
    fn get_particles<'py>(&self, py: Python<'py>) -> Py<PyArray2<f64>> {
        particle_array(py, self.sim.particles())
    }

    /// Wall, barrier and hole edges for drawing.
    fn get_geometry<'py>(&self, py: Python<'py>) -> PyResult<Py<PyDict>> {
        geometry_dict(py, &self.sim)
    }

    /// Record `seconds` at `fps` into `path` (releases the GIL during computation).
    #[pyo3(signature = (path, seconds, fps, write_head=true))]
    fn write_run(
        &mut self,
        py: Python<'_>,
        path: String,
        seconds: f64,
        fps: u32,
        write_head: bool,
    ) -> PyResult<usize> {
        py.detach(|| self.sim.write_run(&path, seconds, fps, write_head))
            .map_err(py_err)
    }
}

/// Python-facing wrapper around [`Playback`].
#[pyclass(name = "Playback")]
pub struct PyPlayback {
    playback: Playback,
}

#[pymethods]
impl PyPlayback {
    #[new]
    fn new(path: String) -> PyResult<Self> {
        let playback = Playback::open(path).map_err(py_err)?;
        Ok(Self { playback })
    }

    fn __len__(&self) -> usize {
        self.playback.snapshot_count()
    }

    /// Load snapshot `index`; returns (time_elapsed, particles).
    ///
    /// Errors: raises IndexError past the last snapshot.
    fn seek<'py>(&mut self, py: Python<'py>, index: usize) -> PyResult<(f64, Py<PyArray2<f64>>)> {
        let frame = self.playback.seek(index).map_err(py_err)?;
        Ok((frame.time_elapsed, particle_array(py, &frame.particles)))
    }

    #[getter]
    fn particle_r(&self) -> f64 {
        self.playback.simulator().parameters().particle_r
    }

    fn get_geometry<'py>(&self, py: Python<'py>) -> PyResult<Py<PyDict>> {
        geometry_dict(py, self.playback.simulator())
    }
}

/// The pibsim Python module entry point.
#[pymodule]
fn pibsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulator>()?;
    m.add_class::<PyPlayback>()?;
    Ok(())
}
