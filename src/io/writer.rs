use crate::core::{Particle, Simulate, Simulator};
use crate::error::{Error, Result};
use crate::io::codec::{self, HEADER_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Append-only writer of run frames.
///
/// The writer owns its sink exclusively for the duration of a run; nothing
/// guards against a second writer on the same file.
#[derive(Debug)]
pub struct RunWriter<W: Write> {
    out: W,
    particle_count: usize,
    frames: usize,
}

impl<W: Write> RunWriter<W> {
    /// Start a new run: writes the header for `sim` immediately.
    pub fn create(mut out: W, sim: &Simulator) -> Result<Self> {
        out.write_all(&codec::encode_header(sim)?)?;
        Ok(Self {
            out,
            particle_count: sim.num_particles(),
            frames: 0,
        })
    }

    /// Continue a run whose header is already in `out`.
    pub fn append(out: W, particle_count: usize) -> Self {
        Self {
            out,
            particle_count,
            frames: 0,
        }
    }

    /// Write one frame; the particle count must match the header.
    pub fn write_snapshot(&mut self, time_elapsed: f64, particles: &[Particle]) -> Result<()> {
        if particles.len() != self.particle_count {
            return Err(Error::InvalidParam(format!(
                "frame has {} particles but the run header declares {}",
                particles.len(),
                self.particle_count
            )));
        }
        self.out
            .write_all(&codec::encode_snapshot(time_elapsed, particles))?;
        self.frames += 1;
        Ok(())
    }

    /// Frames written through this writer (not counting pre-existing ones).
    pub fn frames_written(&self) -> usize {
        self.frames
    }

    /// Flush buffered frames to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Iterator that writes one frame per `next()` and yields its elapsed time.
///
/// Stop pulling to cancel; every frame already yielded is fully written.
pub struct Recording<'a, W: Write> {
    frames: Simulate<'a>,
    writer: &'a mut RunWriter<W>,
    skip_initial: bool,
}

impl<W: Write> Recording<'_, W> {
    /// Frames this recording writes in total.
    pub fn total(&self) -> usize {
        self.frames.total() - usize::from(self.skip_initial)
    }
}

impl<W: Write> Iterator for Recording<'_, W> {
    type Item = Result<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.skip_initial {
            self.skip_initial = false;
            if let Err(e) = self.frames.next()? {
                return Some(Err(e));
            }
        }
        let snapshot = self.frames.next()?;
        Some(snapshot.and_then(|s| {
            self.writer.write_snapshot(s.time_elapsed, &s.particles)?;
            Ok(s.time_elapsed)
        }))
    }
}

impl Simulator {
    /// Simulate `seconds` at `fps` frames per second, writing each frame.
    ///
    /// With `include_initial` the current state is written first; leave it
    /// off when continuing a file whose last frame already holds that state.
    pub fn record<'a, W: Write>(
        &'a mut self,
        writer: &'a mut RunWriter<W>,
        seconds: f64,
        fps: u32,
        include_initial: bool,
    ) -> Result<Recording<'a, W>> {
        Ok(Recording {
            frames: self.simulate(seconds, fps)?,
            writer,
            skip_initial: !include_initial,
        })
    }

    /// Write a complete run to `path` and return the number of frames written.
    ///
    /// `write_head = true` creates (or truncates) the file and writes the
    /// header and the initial state. `write_head = false` appends to an
    /// existing run recorded with the same parameters and particle count.
    pub fn write_run(
        &mut self,
        path: impl AsRef<Path>,
        seconds: f64,
        fps: u32,
        write_head: bool,
    ) -> Result<usize> {
        self.write_run_with(path, seconds, fps, write_head, |_| {})
    }

    /// [`Simulator::write_run`] with a callback after each written frame.
    pub fn write_run_with(
        &mut self,
        path: impl AsRef<Path>,
        seconds: f64,
        fps: u32,
        write_head: bool,
        mut on_frame: impl FnMut(f64),
    ) -> Result<usize> {
        let path = path.as_ref();
        let mut writer = self.open_run(path, write_head)?;
        log::info!(
            "recording {seconds} s at {fps} fps into {} (t0 = {})",
            path.display(),
            self.time_elapsed()
        );
        for frame in self.record(&mut writer, seconds, fps, write_head)? {
            on_frame(frame?);
        }
        let frames = writer.frames_written();
        writer.into_inner()?;
        log::info!("wrote {frames} frames to {}", path.display());
        Ok(frames)
    }

    /// Open `path` for writing this simulator's frames.
    pub fn open_run(&self, path: &Path, write_head: bool) -> Result<RunWriter<BufWriter<File>>> {
        if write_head {
            let file = File::create(path)?;
            return RunWriter::create(BufWriter::new(file), self);
        }

        let mut file = File::open(path)?;
        let len = file.metadata()?.len() as usize;
        let mut header = [0u8; HEADER_SIZE];
        file.read_exact(&mut header).map_err(|_| Error::Truncated {
            what: "header",
            expected: HEADER_SIZE,
            actual: len,
        })?;
        let (params, count) = codec::decode_header(&header)?;
        if params != *self.parameters() || count != self.num_particles() {
            return Err(Error::InvalidParam(format!(
                "{} was recorded with different parameters or particle count",
                path.display()
            )));
        }
        if (len - HEADER_SIZE) % codec::snapshot_size(count) != 0 {
            return Err(Error::Header(format!(
                "{} ends in a partial snapshot; refusing to append",
                path.display()
            )));
        }
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(RunWriter::append(BufWriter::new(file), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::sample;
    use crate::core::{Distribution, InitialState};

    #[test]
    fn header_then_frames_in_memory() -> Result<()> {
        let d = Distribution::new(3, 2, 1.0).with_seed(3);
        let mut sim = Simulator::new(sample(), InitialState::Distribution(d))?;
        let mut writer = RunWriter::create(Vec::new(), &sim)?;
        let times: Vec<f64> = sim
            .record(&mut writer, 0.5, 4, true)?
            .collect::<Result<_>>()?;
        assert_eq!(times.len(), 3);
        assert_eq!(times[0], 0.0);
        let bytes = writer.into_inner()?;
        assert_eq!(bytes.len(), HEADER_SIZE + 3 * codec::snapshot_size(5));
        Ok(())
    }

    #[test]
    fn continuation_skips_initial_frame() -> Result<()> {
        let d = Distribution::new(1, 1, 1.0).with_seed(8);
        let mut sim = Simulator::new(sample(), InitialState::Distribution(d))?;
        let mut writer = RunWriter::append(Vec::new(), 2);
        let rec = sim.record(&mut writer, 1.0, 2, false)?;
        assert_eq!(rec.total(), 2);
        let times: Vec<f64> = rec.collect::<Result<_>>()?;
        assert_eq!(times.len(), 2);
        assert!(times[0] >= 0.5);
        Ok(())
    }

    #[test]
    fn frame_size_mismatch_rejected() -> Result<()> {
        let mut writer = RunWriter::append(Vec::new(), 2);
        let err = writer.write_snapshot(0.0, &[]).unwrap_err();
        assert!(err.to_string().contains("declares 2"));
        Ok(())
    }
}
