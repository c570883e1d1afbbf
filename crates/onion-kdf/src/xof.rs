//! Extendable-output keystream expansion in the style of BLAKE2X.
//!
//! A fixed-size seed is absorbed into a 64-byte root hash; output is
//! then produced in independent 64-byte blocks, each a keyed BLAKE2b
//! invocation parameterized by its block index.  Because blocks
//! depend only on the root hash and their index, the stream is
//! deterministic and could in principle be generated out of order,
//! though the reader only exposes sequential consumption.

use blake2::digest::Mac;
use blake2::{Blake2b512, Blake2bMac512};
use digest::Digest;
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Size in bytes of one output block (and of the root hash).
const BLOCK_LEN: usize = 64;

/// Total output an instance may produce, matching the 32-bit length
/// field of the BLAKE2X parameter block.
const MAX_OUTPUT: u64 = u32::MAX as u64;

/// A deterministic, sequential, consumable-once keystream.
pub struct Xof {
    /// Root hash every output block is keyed with.
    root: Zeroizing<[u8; BLOCK_LEN]>,
    /// Personalization string mixed into every output block.
    person: [u8; 16],
    /// Index of the next block to derive.
    next_block: u64,
    /// The current output block.
    block: [u8; BLOCK_LEN],
    /// Read offset within `block`; `BLOCK_LEN` means empty.
    block_off: usize,
    /// Total bytes handed out so far.
    emitted: u64,
}

impl Xof {
    /// Create a keystream from `seed`, domain-separated by `salt` and
    /// `person`.
    pub fn new(seed: &[u8], salt: &[u8; 16], person: &[u8; 16]) -> Self {
        let root: [u8; BLOCK_LEN] = Blake2b512::new()
            .chain_update(salt)
            .chain_update(seed)
            .finalize()
            .into();
        Xof {
            root: Zeroizing::new(root),
            person: *person,
            next_block: 0,
            block: [0_u8; BLOCK_LEN],
            block_off: BLOCK_LEN,
            emitted: 0,
        }
    }

    /// Derive the next output block and reset the read offset.
    fn refill(&mut self) {
        let mac = Blake2bMac512::new_with_salt_and_personal(
            &self.root[..],
            &self.next_block.to_be_bytes(),
            &self.person,
        )
        .expect("key, salt, and personalization lengths are fixed");
        self.block = mac.finalize().into_bytes().into();
        self.next_block += 1;
        self.block_off = 0;
    }

    /// Fill `out` with the next `out.len()` keystream bytes.
    ///
    /// Returns [`Error::ExceededOutputLength`] without emitting
    /// anything if the request would push total output past the
    /// maximum; otherwise the whole buffer is always filled.
    pub fn read(&mut self, out: &mut [u8]) -> Result<usize> {
        if out.len() as u64 > MAX_OUTPUT - self.emitted {
            return Err(Error::ExceededOutputLength);
        }
        for byte in out.iter_mut() {
            if self.block_off == BLOCK_LEN {
                self.refill();
            }
            *byte = self.block[self.block_off];
            self.block_off += 1;
        }
        self.emitted += out.len() as u64;
        Ok(out.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Salt and personalization used by the tests below.
    const SALT: &[u8; 16] = b"0123456789abcdef";
    /// See [`SALT`].
    const PERSON: &[u8; 16] = b"xof-test-person!";

    #[test]
    fn deterministic_and_chunking_independent() {
        let mut a = Xof::new(b"seed", SALT, PERSON);
        let mut whole = [0_u8; 150];
        a.read(&mut whole).unwrap();

        let mut b = Xof::new(b"seed", SALT, PERSON);
        let mut pieces = [0_u8; 150];
        for chunk in pieces.chunks_mut(7) {
            b.read(chunk).unwrap();
        }
        assert_eq!(whole[..], pieces[..]);
    }

    #[test]
    fn seed_salt_and_person_all_matter() {
        let mut base = [0_u8; 32];
        Xof::new(b"seed", SALT, PERSON).read(&mut base).unwrap();

        let mut other = [0_u8; 32];
        Xof::new(b"another", SALT, PERSON).read(&mut other).unwrap();
        assert_ne!(base, other);

        Xof::new(b"seed", b"fedcba9876543210", PERSON)
            .read(&mut other)
            .unwrap();
        assert_ne!(base, other);

        Xof::new(b"seed", SALT, b"!nosrep-tset-fox")
            .read(&mut other)
            .unwrap();
        assert_ne!(base, other);
    }

    #[test]
    fn output_is_capped() {
        let mut xof = Xof::new(b"seed", SALT, PERSON);
        xof.emitted = MAX_OUTPUT - 4;

        let mut small = [0_u8; 4];
        assert!(xof.read(&mut small).is_ok());

        let mut one = [0_u8; 1];
        assert_eq!(xof.read(&mut one), Err(Error::ExceededOutputLength));
    }
}
