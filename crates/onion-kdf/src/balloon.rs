//! Balloon memory-hard hashing.
//!
//! Balloon fills a caller-sized buffer of digest blocks from the
//! passphrase and salt, then repeatedly rewrites it with
//! data-independent pseudo-random mixing.  An attacker who wants to
//! evaluate the function with less memory pays a steep recomputation
//! penalty, which is the property that makes it suitable for
//! passphrase hashing.

use digest::Digest;
use zeroize::{Zeroize, Zeroizing};

/// Number of pseudo-random neighbor blocks folded into every block on
/// each mixing step.
const DELTA: u64 = 3;

/// Working state for a single Balloon computation.
struct Instance {
    /// The memory buffer, `space_cost` digest-sized blocks.
    buf: Vec<u8>,
    /// The most recently computed block.
    last: Vec<u8>,
    /// Running hash-invocation counter, fed big-endian into every
    /// digest so no two invocations see the same prefix.
    cnt: u64,
}

impl Instance {
    /// Fill the buffer: block 0 is hash(cnt, passphrase, salt), and
    /// every later block is hash(cnt, previous block).
    fn expand<D: Digest>(&mut self, passphrase: &[u8], salt: &[u8], space_cost: u64) {
        let block_len = <D as Digest>::output_size();

        let mut h = D::new();
        h.update(self.cnt.to_be_bytes());
        self.cnt += 1;
        h.update(passphrase);
        h.update(salt);
        self.last = h.finalize().to_vec();
        self.buf[..block_len].copy_from_slice(&self.last);

        for _ in 1..space_cost {
            let mut h = D::new();
            h.update(self.cnt.to_be_bytes());
            h.update(&self.last);
            self.last = h.finalize().to_vec();
            let off = self.cnt as usize * block_len;
            self.buf[off..off + block_len].copy_from_slice(&self.last);
            self.cnt += 1;
        }
    }

    /// Run `time_cost` rounds of mixing over the whole buffer.
    ///
    /// Each block is first chained with the previous output, then
    /// folded with [`DELTA`] pseudo-random neighbors whose indices
    /// depend only on salt and loop position, not on the buffer
    /// contents.
    fn mix<D: Digest>(&mut self, salt: &[u8], space_cost: u64, time_cost: u64) {
        let block_len = <D as Digest>::output_size();
        for t in 0..time_cost {
            for m in 0..space_cost {
                let off = m as usize * block_len;

                let mut h = D::new();
                h.update(self.cnt.to_be_bytes());
                self.cnt += 1;
                h.update(&self.last);
                h.update(&self.buf[off..off + block_len]);
                self.last = h.finalize().to_vec();
                self.buf[off..off + block_len].copy_from_slice(&self.last);

                for i in 0..DELTA {
                    let mut h = D::new();
                    h.update(self.cnt.to_be_bytes());
                    self.cnt += 1;
                    h.update(salt);
                    h.update(t.to_be_bytes());
                    h.update(m.to_be_bytes());
                    h.update(i.to_be_bytes());
                    let other = index_mod(&h.finalize(), space_cost) as usize * block_len;

                    let mut h = D::new();
                    h.update(self.cnt.to_be_bytes());
                    self.cnt += 1;
                    h.update(&self.last);
                    h.update(&self.buf[other..other + block_len]);
                    self.last = h.finalize().to_vec();
                    self.buf[off..off + block_len].copy_from_slice(&self.last);
                }
            }
        }
    }
}

/// Reduce a big-endian digest modulo `space_cost`.
///
/// The digest is longer than 64 bits, so we fold it in one byte at a
/// time, reducing as we go.  The intermediate product fits in a u128
/// because `space_cost` fits in a u64.
fn index_mod(digest: &[u8], space_cost: u64) -> u64 {
    let mut acc: u64 = 0;
    for &b in digest.iter() {
        acc = (((u128::from(acc) << 8) | u128::from(b)) % u128::from(space_cost)) as u64;
    }
    acc
}

/// Compute the Balloon hash of `passphrase` with `salt` using the
/// digest `D`.
///
/// `space_cost` is the buffer size in digest-sized blocks;
/// `time_cost` is the number of mixing rounds.  Returns the last
/// block computed, wrapped so it is cleared on drop.
///
/// # Panics
///
/// Panics if `space_cost` is zero.
pub fn balloon<D: Digest>(
    passphrase: &[u8],
    salt: &[u8],
    space_cost: u64,
    time_cost: u64,
) -> Zeroizing<Vec<u8>> {
    assert!(space_cost > 0, "balloon requires at least one block");
    let block_len = <D as Digest>::output_size();
    let mut state = Instance {
        buf: vec![0_u8; space_cost as usize * block_len],
        last: Vec::new(),
        cnt: 0,
    };
    state.expand::<D>(passphrase, salt, space_cost);
    state.mix::<D>(salt, space_cost, time_cost);

    let out = Zeroizing::new(state.last.clone());
    state.buf.zeroize();
    state.last.zeroize();
    out
}

/// Run `n_instances` independent Balloon computations concurrently
/// and combine them.
///
/// Instance `i` (numbered from 1) computes [`balloon`] over the salt
/// extended with its big-endian instance number.  The outputs are
/// XORed together, which makes the combination independent of thread
/// completion order, and the result is hashed once more with the
/// passphrase and the unextended salt to restore collision
/// resistance.
pub fn balloon_m<D: Digest>(
    passphrase: &[u8],
    salt: &[u8],
    space_cost: u64,
    time_cost: u64,
    n_instances: u64,
) -> Zeroizing<Vec<u8>> {
    let mut combined = Zeroizing::new(vec![0_u8; <D as Digest>::output_size()]);
    std::thread::scope(|scope| {
        let workers: Vec<_> = (1..=n_instances)
            .map(|instance| {
                scope.spawn(move || {
                    let mut instance_salt = salt.to_vec();
                    instance_salt.extend_from_slice(&instance.to_be_bytes());
                    balloon::<D>(passphrase, &instance_salt, space_cost, time_cost)
                })
            })
            .collect();
        for worker in workers {
            let output = worker.join().expect("balloon worker panicked");
            for (acc, byte) in combined.iter_mut().zip(output.iter()) {
                *acc ^= byte;
            }
        }
    });

    let mut h = D::new();
    h.update(passphrase);
    h.update(salt);
    h.update(&combined[..]);
    Zeroizing::new(h.finalize().to_vec())
}

#[cfg(test)]
mod test {
    use super::*;
    use sha2::Sha256;

    #[test]
    fn deterministic() {
        let a = balloon::<Sha256>(b"hunter2", b"pepper", 8, 2);
        let b = balloon::<Sha256>(b"hunter2", b"pepper", 8, 2);
        assert_eq!(&a[..], &b[..]);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn inputs_and_costs_diverge() {
        let base = balloon::<Sha256>(b"hunter2", b"pepper", 8, 2);
        assert_ne!(&base[..], &balloon::<Sha256>(b"hunter3", b"pepper", 8, 2)[..]);
        assert_ne!(&base[..], &balloon::<Sha256>(b"hunter2", b"paprika", 8, 2)[..]);
        assert_ne!(&base[..], &balloon::<Sha256>(b"hunter2", b"pepper", 16, 2)[..]);
        assert_ne!(&base[..], &balloon::<Sha256>(b"hunter2", b"pepper", 8, 3)[..]);
    }

    #[test]
    fn parallel_variant_matches_serial_combination() {
        let (pass, salt) = (&b"hunter2"[..], &b"pepper"[..]);
        let n = 4_u64;

        let mut xor = vec![0_u8; 32];
        for instance in 1..=n {
            let mut instance_salt = salt.to_vec();
            instance_salt.extend_from_slice(&instance.to_be_bytes());
            let out = balloon::<Sha256>(pass, &instance_salt, 8, 2);
            for (acc, byte) in xor.iter_mut().zip(out.iter()) {
                *acc ^= byte;
            }
        }
        let mut h = Sha256::new();
        h.update(pass);
        h.update(salt);
        h.update(&xor);
        let expected = h.finalize();

        let got = balloon_m::<Sha256>(pass, salt, 8, 2, n);
        assert_eq!(&got[..], &expected[..]);
    }

    #[test]
    fn index_reduction_matches_u64_arithmetic() {
        let digest = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let wide = u64::from_be_bytes(digest);
        for &m in &[1_u64, 2, 7, 1000, 131072] {
            assert_eq!(index_mod(&digest, m), wide % m);
        }
        // Longer than 64 bits still reduces correctly for powers of two,
        // where only the trailing bytes matter.
        let long = [0xff_u8; 32];
        assert_eq!(index_mod(&long, 256), 0xff);
        assert_eq!(index_mod(&long, 2), 1);
    }
}
