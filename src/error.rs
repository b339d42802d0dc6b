use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation engine and the run file codec.
///
/// Each variant carries enough context for the caller to decide whether to
/// abort (bad configuration, corrupt file) or recover (seek past the end).
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid construction parameter; the message names the parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical issue, e.g. no finite time step can be derived.
    #[error("numerical error: {0}")]
    MathError(String),

    /// Stepping requires at least one particle.
    #[error("cannot step a simulator without particles")]
    EmptySystem,

    /// A header or snapshot buffer is shorter than its fixed layout.
    #[error("truncated {what}: expected {expected} bytes, found {actual}")]
    Truncated {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Header bytes are present but describe an impossible run.
    #[error("malformed header: {0}")]
    Header(String),

    /// Decoding a specific snapshot failed.
    #[error("failed to decode snapshot {index}")]
    Snapshot {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Seek beyond the last recorded snapshot.
    #[error("snapshot index {index} out of range (run holds {count} snapshots)")]
    OutOfRange { index: usize, count: usize },

    /// Propagated I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a decode failure with the index of the snapshot it belongs to.
    pub(crate) fn in_snapshot(self, index: usize) -> Self {
        Error::Snapshot {
            index,
            source: Box::new(self),
        }
    }
}
