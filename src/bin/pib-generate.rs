use anyhow::{bail, Context, Result};
use clap::Parser;
use pibsim::config::{DistributionConfig, RunConfig, ScenarioConfig};
use pibsim::core::Parameters;
use pibsim::io::Playback;
use std::path::PathBuf;

const POSITIONAL: [&str; 18] = [
    "n_left",
    "n_right",
    "particle_r",
    "v_init",
    "v_loss",
    "box_width",
    "box_height",
    "barrier_x",
    "barrier_width",
    "hole_y",
    "hole_height",
    "delta_v_top",
    "delta_v_bottom",
    "delta_v_side",
    "g",
    "minutes",
    "fps",
    "output_file",
];

/// Simulate particles in a box and record the run to a binary file.
///
/// Prints the elapsed simulated time in whole seconds after every written
/// frame, one per line.
#[derive(Parser, Debug)]
#[command(name = "pib-generate")]
struct Args {
    /// YAML scenario file; replaces the positional arguments.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// RNG seed for the initial distribution (overrides the scenario's).
    #[arg(long)]
    seed: Option<u64>,

    /// Continue the run already in the output file from its last snapshot.
    #[arg(long)]
    append: bool,

    /// Do not print per-frame progress.
    #[arg(short, long)]
    quiet: bool,

    /// n_left n_right particle_r v_init v_loss box_width box_height barrier_x
    /// barrier_width hole_y hole_height delta_v_top delta_v_bottom delta_v_side
    /// g minutes fps output_file
    #[arg(value_name = "ARGS")]
    positional: Vec<String>,
}

fn parse<T: std::str::FromStr>(values: &[String], name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let idx = POSITIONAL
        .iter()
        .position(|n| *n == name)
        .with_context(|| format!("unknown argument {name}"))?;
    values[idx]
        .parse()
        .with_context(|| format!("invalid value for {name}: {:?}", values[idx]))
}

fn scenario_from_positional(values: &[String]) -> Result<ScenarioConfig> {
    if values.len() != POSITIONAL.len() {
        bail!(
            "expected {} positional arguments ({}), got {}",
            POSITIONAL.len(),
            POSITIONAL.join(" "),
            values.len()
        );
    }
    let parameters = Parameters {
        box_width: parse(values, "box_width")?,
        box_height: parse(values, "box_height")?,
        delta_v_top: parse(values, "delta_v_top")?,
        delta_v_bottom: parse(values, "delta_v_bottom")?,
        delta_v_side: parse(values, "delta_v_side")?,
        barrier_x: parse(values, "barrier_x")?,
        barrier_width: parse(values, "barrier_width")?,
        hole_y: parse(values, "hole_y")?,
        hole_height: parse(values, "hole_height")?,
        v_loss: parse(values, "v_loss")?,
        particle_r: parse(values, "particle_r")?,
        g: parse(values, "g")?,
    };
    Ok(ScenarioConfig {
        parameters,
        distribution: DistributionConfig {
            n_left: parse(values, "n_left")?,
            n_right: parse(values, "n_right")?,
            v_init: parse(values, "v_init")?,
            seed: None,
        },
        run: RunConfig {
            seconds: parse::<f64>(values, "minutes")? * 60.0,
            snapshots_per_second: parse(values, "fps")?,
        },
        output: parse(values, "output_file")?,
    })
}

/// Progress value for one frame: elapsed whole seconds.
fn progress_line(time_elapsed: f64) -> String {
    format!("{}", time_elapsed.max(0.0).floor() as u64)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut scenario = match &args.scenario {
        Some(path) => ScenarioConfig::from_path(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => scenario_from_positional(&args.positional)?,
    };
    if args.seed.is_some() {
        scenario.distribution.seed = args.seed;
    }

    let mut sim = if args.append {
        let mut playback = Playback::open(&scenario.output)
            .with_context(|| format!("failed to open {}", scenario.output.display()))?;
        if playback.is_empty() {
            bail!("{} holds no snapshot to continue from", scenario.output.display());
        }
        playback.set_state(playback.snapshot_count() - 1)?;
        playback.into_simulator()
    } else {
        scenario.build().context("failed to build simulator")?
    };

    let quiet = args.quiet;
    let frames = sim
        .write_run_with(
            &scenario.output,
            scenario.run.seconds,
            scenario.run.snapshots_per_second,
            !args.append,
            |t| {
                if !quiet {
                    println!("{}", progress_line(t));
                }
            },
        )
        .with_context(|| format!("failed to record into {}", scenario.output.display()))?;

    log::info!("done: {frames} frames, t = {}", sim.time_elapsed());
    Ok(())
}
