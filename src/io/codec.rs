//! Run file layout. All multi-byte fields are little-endian.
//!
//! ```text
//! header   : 12 x f64 parameters (Parameters::to_array order), i32 particle_count
//! snapshot : f64 time_elapsed, particle_count x record
//! record   : f64 pos_x, f64 pos_y, f64 velocity_x, f64 velocity_y, u8 id
//! ```
//!
//! The file is the header followed by `k` snapshots; the first one is the
//! initial state. The on-disk id keeps only the low byte of the in-memory id,
//! so the provenance bit always survives while large creation indices wrap.

use crate::core::{Parameters, Particle, Simulator};
use crate::error::{Error, Result};

/// 12 doubles plus the i32 particle count.
pub const HEADER_SIZE: usize = 12 * 8 + 4;
/// 4 doubles plus the one-byte id.
pub const PARTICLE_RECORD_SIZE: usize = 4 * 8 + 1;

/// Bytes of one snapshot frame for `particle_count` particles.
#[inline]
pub fn snapshot_size(particle_count: usize) -> usize {
    8 + particle_count * PARTICLE_RECORD_SIZE
}

/// Serialize the simulator's parameters and particle count.
pub fn encode_header(sim: &Simulator) -> Result<Vec<u8>> {
    encode_header_parts(sim.parameters(), sim.num_particles())
}

pub(crate) fn encode_header_parts(params: &Parameters, particle_count: usize) -> Result<Vec<u8>> {
    let count = i32::try_from(particle_count).map_err(|_| {
        Error::InvalidParam(format!(
            "particle count {particle_count} does not fit the header's i32 field"
        ))
    })?;
    if particle_count > 128 {
        log::warn!(
            "{particle_count} particles: ids above 255 are stored modulo 256 in the one-byte id field"
        );
    }
    let mut buf = Vec::with_capacity(HEADER_SIZE);
    for v in params.to_array() {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf.extend_from_slice(&count.to_le_bytes());
    Ok(buf)
}

/// Serialize one time-stamped frame in the given particle order.
pub fn encode_snapshot(time_elapsed: f64, particles: &[Particle]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(snapshot_size(particles.len()));
    buf.extend_from_slice(&time_elapsed.to_le_bytes());
    for p in particles {
        buf.extend_from_slice(&p.pos_x.to_le_bytes());
        buf.extend_from_slice(&p.pos_y.to_le_bytes());
        buf.extend_from_slice(&p.velocity_x.to_le_bytes());
        buf.extend_from_slice(&p.velocity_y.to_le_bytes());
        buf.push((p.id & 0xFF) as u8);
    }
    buf
}

/// Inverse of [`encode_header`]: parameters and particle count.
///
/// Errors: `Error::Truncated` for short input, `Error::Header` for a negative
/// count or non-finite parameters.
pub fn decode_header(bytes: &[u8]) -> Result<(Parameters, usize)> {
    if bytes.len() < HEADER_SIZE {
        return Err(Error::Truncated {
            what: "header",
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    let mut reader = Cursor::new(bytes);
    let mut values = [0.0_f64; 12];
    for v in &mut values {
        *v = reader.f64();
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::Header("non-finite parameter".into()));
    }
    let count = reader.i32();
    let count = usize::try_from(count)
        .map_err(|_| Error::Header(format!("negative particle count {count}")))?;
    Ok((Parameters::from_array(values), count))
}

/// Inverse of [`encode_snapshot`].
///
/// Errors: `Error::Truncated` if `bytes` is shorter than one frame.
pub fn decode_snapshot(bytes: &[u8], particle_count: usize) -> Result<(f64, Vec<Particle>)> {
    let expected = snapshot_size(particle_count);
    if bytes.len() < expected {
        return Err(Error::Truncated {
            what: "snapshot",
            expected,
            actual: bytes.len(),
        });
    }
    let mut reader = Cursor::new(bytes);
    let time_elapsed = reader.f64();
    let mut particles = Vec::with_capacity(particle_count);
    for _ in 0..particle_count {
        let pos_x = reader.f64();
        let pos_y = reader.f64();
        let velocity_x = reader.f64();
        let velocity_y = reader.f64();
        let id = u32::from(reader.u8());
        particles.push(Particle {
            id,
            pos_x,
            pos_y,
            velocity_x,
            velocity_y,
        });
    }
    Ok((time_elapsed, particles))
}

/// Forward reader over a buffer whose length was checked up front.
struct Cursor<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, at: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.at..self.at + N]);
        self.at += N;
        out
    }

    fn f64(&mut self) -> f64 {
        f64::from_le_bytes(self.take())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::sample;
    use crate::core::InitialState;

    fn particles() -> Vec<Particle> {
        vec![
            Particle {
                id: 3,
                pos_x: 13.4,
                pos_y: 12.3,
                velocity_x: 3.0,
                velocity_y: -3.4,
            },
            Particle {
                id: 0,
                pos_x: 1.0e-3,
                pos_y: 99.5,
                velocity_x: -0.0,
                velocity_y: 7.25,
            },
        ]
    }

    #[test]
    fn sizes() {
        assert_eq!(HEADER_SIZE, 100);
        assert_eq!(PARTICLE_RECORD_SIZE, 33);
        assert_eq!(snapshot_size(2), 74);
    }

    #[test]
    fn header_round_trip() -> Result<()> {
        let sim = Simulator::new(sample(), InitialState::Particles(particles()))?;
        let bytes = encode_header(&sim)?;
        assert_eq!(bytes.len(), HEADER_SIZE);
        let (params, count) = decode_header(&bytes)?;
        assert_eq!(params, sample());
        assert_eq!(count, 2);
        Ok(())
    }

    #[test]
    fn header_is_little_endian() -> Result<()> {
        let bytes = encode_header_parts(&sample(), 7)?;
        assert_eq!(&bytes[..8], &100.0_f64.to_le_bytes());
        assert_eq!(&bytes[96..], &[7, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn snapshot_round_trip_keeps_order() -> Result<()> {
        let ps = particles();
        let bytes = encode_snapshot(1.5, &ps);
        assert_eq!(bytes.len(), snapshot_size(ps.len()));
        let (t, decoded) = decode_snapshot(&bytes, ps.len())?;
        assert_eq!(t, 1.5);
        assert_eq!(decoded, ps);
        Ok(())
    }

    #[test]
    fn id_keeps_low_byte() -> Result<()> {
        let p = Particle {
            id: 0x1F3,
            pos_x: 1.0,
            pos_y: 1.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
        };
        let (_, decoded) = decode_snapshot(&encode_snapshot(0.0, &[p]), 1)?;
        assert_eq!(decoded[0].id, 0xF3);
        assert_eq!(decoded[0].side(), p.side());
        Ok(())
    }

    #[test]
    fn truncated_header_reported() {
        let err = decode_header(&[0u8; 40]).unwrap_err();
        assert!(matches!(
            err,
            Error::Truncated {
                what: "header",
                expected: 100,
                actual: 40
            }
        ));
    }

    #[test]
    fn negative_count_rejected() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[96..].copy_from_slice(&(-1_i32).to_le_bytes());
        assert!(matches!(decode_header(&bytes), Err(Error::Header(_))));
    }

    #[test]
    fn truncated_snapshot_reported() {
        let bytes = encode_snapshot(0.0, &particles());
        let err = decode_snapshot(&bytes[..50], 2).unwrap_err();
        assert!(err.to_string().contains("truncated snapshot"));
    }
}
