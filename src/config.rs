//! Scenario files for the generator.
//!
//! A scenario bundles the physical parameters, the initial distribution, the
//! run length and the output path:
//!
//! ```yaml
//! parameters:
//!   box_width: 100.0
//!   box_height: 100.0
//!   delta_v_top: 0.5
//!   delta_v_bottom: 0.3
//!   delta_v_side: 0.3
//!   barrier_x: 40.0
//!   barrier_width: 3.0
//!   hole_y: 30.0
//!   hole_height: 10.0
//!   v_loss: 0.21
//!   particle_r: 0.2
//!   g: 9.8              # optional, defaults to 9.8
//!
//! distribution:
//!   n_left: 500
//!   n_right: 500
//!   v_init: 3.0
//!   seed: 42            # optional
//!
//! run:
//!   seconds: 60.0
//!   snapshots_per_second: 30
//!
//! output: particles_in_box.bin
//! ```

use crate::core::{Distribution, InitialState, Parameters, Simulator};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Initial placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub n_left: u32,
    pub n_right: u32,
    #[serde(default)]
    pub v_init: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Length and frame rate of the recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub seconds: f64,
    pub snapshots_per_second: u32,
}

/// Top-level scenario loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub parameters: Parameters,
    pub distribution: DistributionConfig,
    pub run: RunConfig,
    pub output: PathBuf,
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a scenario from any YAML reader.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        serde_yaml::from_reader(reader).map_err(|e| Error::InvalidParam(format!("scenario: {e}")))
    }

    /// Distribution request described by the scenario.
    pub fn distribution(&self) -> Distribution {
        Distribution {
            n_left: self.distribution.n_left,
            n_right: self.distribution.n_right,
            v_init: self.distribution.v_init,
            seed: self.distribution.seed,
        }
    }

    /// Build a fresh simulator for this scenario.
    pub fn build(&self) -> Result<Simulator> {
        Simulator::new(
            self.parameters,
            InitialState::Distribution(self.distribution()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = "
parameters:
  box_width: 20.0
  box_height: 10.0
  delta_v_top: 0.0
  delta_v_bottom: 0.0
  delta_v_side: 0.0
  barrier_x: 10.0
  barrier_width: 1.0
  hole_y: 5.0
  hole_height: 2.0
  v_loss: 0.1
  particle_r: 0.1
distribution:
  n_left: 3
  n_right: 4
  v_init: 1.0
  seed: 9
run:
  seconds: 0.5
  snapshots_per_second: 10
output: out.bin
";

    #[test]
    fn parses_and_builds() -> Result<()> {
        let cfg = ScenarioConfig::from_reader(YAML.as_bytes())?;
        assert_eq!(cfg.parameters.g, 9.8);
        assert_eq!(cfg.run.snapshots_per_second, 10);
        assert_eq!(cfg.output, PathBuf::from("out.bin"));
        let sim = cfg.build()?;
        assert_eq!(sim.num_particles(), 7);
        assert_eq!(sim.provenance_counts(), (3, 4));
        Ok(())
    }

    #[test]
    fn missing_field_is_reported() {
        let err = ScenarioConfig::from_reader("parameters: {}".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("scenario"));
    }
}
