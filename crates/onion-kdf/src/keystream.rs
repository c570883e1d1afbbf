//! Passphrase-to-keystream pipeline with production parameters.

use blake2::Blake2b512;
use rand_core::{CryptoRng, RngCore};
use std::convert::TryInto;

use crate::balloon::balloon_m;
use crate::xof::Xof;
use crate::{Error, Result};

/// Domain salt for the memory-hard stage.
const SALT_BALLOON: [u8; 16] = [
    0x8e, 0x8a, 0x1b, 0x33, 0x47, 0xda, 0x26, 0x72, 0xfa, 0x40, 0x4e, 0xaa, 0x72, 0x76, 0xde, 0xe3,
];
/// Domain salt for the expansion stage.
const SALT_XOF: [u8; 16] = [
    0x31, 0x3e, 0x86, 0xe7, 0x26, 0x58, 0xf5, 0xc7, 0xc3, 0xad, 0x6e, 0x1c, 0x3d, 0x39, 0x70, 0x62,
];

/// Memory cost: 8 MiB expressed in 64-byte BLAKE2b blocks.
const SPACE_COST: u64 = (1 << 23) / 64;
/// Number of mixing rounds.
const TIME_COST: u64 = 2;
/// Number of concurrent Balloon instances.
const N_INSTANCES: u64 = 4;

/// Derive a deterministic keystream from `passphrase`, separated by
/// the caller's `person` string (at least 16 bytes; only the first 16
/// are used).
///
/// The passphrase first goes through the memory-hard stage with fixed
/// production costs, so a single call is intentionally slow and
/// allocates 8 MiB per instance.  The resulting secret seeds the XOF,
/// which then streams as much key material as the caller needs.
/// Identical inputs always produce byte-identical streams.
pub fn keystream_reader(passphrase: &[u8], person: &[u8]) -> Result<Xof> {
    let person: [u8; 16] = match person.get(..16) {
        Some(p) => p.try_into().expect("slice is 16 bytes"),
        None => return Err(Error::ShortPersonalization),
    };
    let secret = balloon_m::<Blake2b512>(
        passphrase,
        &SALT_BALLOON,
        SPACE_COST,
        TIME_COST,
        N_INSTANCES,
    );
    Ok(Xof::new(&secret, &SALT_XOF, &person))
}

/// Adapter that exposes a keystream as a random number generator, so
/// key-generation APIs can be driven deterministically from a
/// passphrase.
pub struct KeystreamRng {
    /// The underlying keystream.
    xof: Xof,
}

impl KeystreamRng {
    /// Wrap a keystream.
    pub fn new(xof: Xof) -> Self {
        KeystreamRng { xof }
    }
}

impl RngCore for KeystreamRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0_u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_be_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0_u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_be_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.try_fill_bytes(dest)
            .expect("keystream output exhausted");
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
        self.xof.read(dest).map(|_| ()).map_err(rand_core::Error::new)
    }
}

impl CryptoRng for KeystreamRng {}
