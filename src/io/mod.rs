//! Binary run files: codec, append-only writer and random-access playback.

pub mod codec;
pub mod playback;
pub mod writer;

pub use codec::{
    decode_header, decode_snapshot, encode_header, encode_snapshot, snapshot_size, HEADER_SIZE,
    PARTICLE_RECORD_SIZE,
};
pub use playback::Playback;
pub use writer::{Recording, RunWriter};
