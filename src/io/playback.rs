use crate::core::{InitialState, Simulator, Snapshot};
use crate::error::{Error, Result};
use crate::io::codec::{self, HEADER_SIZE};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Random-access reader over a recorded run.
///
/// Holds its own [`Simulator`] whose parameters come from the header and whose
/// particles and clock are replaced on every [`Playback::set_state`]. Frames
/// are located by offset, so seeking never replays intermediate frames.
pub struct Playback<R = BufReader<File>> {
    reader: R,
    simulator: Simulator,
    particle_count: usize,
    snapshot_count: usize,
    current: Option<usize>,
}

impl Playback<BufReader<File>> {
    /// Open a run file and load its first snapshot, if any.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let playback = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "opened {}: {} particles, {} snapshots",
            path.display(),
            playback.particle_count,
            playback.snapshot_count
        );
        Ok(playback)
    }
}

impl<R: Read + Seek> Playback<R> {
    /// Read the header from `reader` and load snapshot 0 when present.
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let len = reader.seek(SeekFrom::End(0))? as usize;
        reader.seek(SeekFrom::Start(0))?;

        let mut header = vec![0u8; HEADER_SIZE.min(len)];
        reader.read_exact(&mut header)?;
        let (params, particle_count) = codec::decode_header(&header)?;

        let frame = codec::snapshot_size(particle_count);
        let body = len - HEADER_SIZE;
        let snapshot_count = body / frame;
        if body % frame != 0 {
            log::warn!(
                "run ends in a partial snapshot ({} trailing bytes ignored)",
                body % frame
            );
        }

        let simulator = Simulator::new(params, InitialState::Particles(Vec::new()))
            .map_err(|e| Error::Header(e.to_string()))?;
        let mut playback = Self {
            reader,
            simulator,
            particle_count,
            snapshot_count,
            current: None,
        };
        if snapshot_count > 0 {
            playback.set_state(0)?;
        }
        Ok(playback)
    }

    /// Number of complete snapshots in the run.
    pub fn snapshot_count(&self) -> usize {
        self.snapshot_count
    }

    /// Same as [`Playback::snapshot_count`].
    pub fn len(&self) -> usize {
        self.snapshot_count
    }

    /// True when the file holds a header but no snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshot_count == 0
    }

    /// Particles per snapshot, as declared by the header.
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Index of the loaded snapshot.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Simulator holding the loaded snapshot, for drawing and diagnostics.
    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Load snapshot `index`, replacing the current particles and clock.
    ///
    /// Errors: `Error::OutOfRange` past the last snapshot (the loaded state is
    /// kept); `Error::Snapshot` if the frame cannot be read or decoded.
    pub fn set_state(&mut self, index: usize) -> Result<()> {
        if index >= self.snapshot_count {
            return Err(Error::OutOfRange {
                index,
                count: self.snapshot_count,
            });
        }
        let frame = codec::snapshot_size(self.particle_count);
        let offset = HEADER_SIZE + index * frame;
        self.reader
            .seek(SeekFrom::Start(offset as u64))
            .map_err(|e| Error::from(e).in_snapshot(index))?;
        let mut buf = vec![0u8; frame];
        self.reader
            .read_exact(&mut buf)
            .map_err(|e| Error::from(e).in_snapshot(index))?;
        let (time_elapsed, particles) = codec::decode_snapshot(&buf, self.particle_count)
            .map_err(|e| e.in_snapshot(index))?;
        self.simulator.restore(time_elapsed, particles);
        self.current = Some(index);
        Ok(())
    }

    /// Load snapshot `index` and return a copy of it.
    pub fn seek(&mut self, index: usize) -> Result<Snapshot> {
        self.set_state(index)?;
        Ok(self.simulator.snapshot())
    }

    /// Continue simulating from the loaded snapshot.
    pub fn into_simulator(self) -> Simulator {
        self.simulator
    }
}
