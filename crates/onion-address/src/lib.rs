//! Onion service identity keys and the addresses derived from them.
//!
//! A version 2 onion service is identified by an RSA-1024 key; its
//! address is the base32 encoding of the first ten bytes of the SHA-1
//! digest of the key's PKCS#1 DER encoding.  A version 3 service is
//! identified by an Ed25519 key; its address encodes the whole public
//! key followed by a two-byte checksum and a version byte of 3.
//!
//! Key generation takes any `CryptoRngCore`, so identities can come
//! from the operating system or be derived deterministically from a
//! passphrase-driven keystream.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod err;

pub use err::Error;

use onion_llcrypto::d::{Digest, Sha3_256};
use onion_llcrypto::pk::ed25519::{SigningKey, VerifyingKey};
use onion_llcrypto::pk::rsa;
use onion_llcrypto::util::{b32_decode, b32_encode};
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;

use std::convert::TryInto;

/// A Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Decoded length of a v2 onion address: a truncated SHA-1 digest.
const V2_ADDRESS_LEN: usize = 10;
/// Decoded length of a v3 onion address: key, checksum, version byte.
const V3_ADDRESS_LEN: usize = 32 + V3_CHECKSUM_LEN + 1;
/// Length of the embedded v3 checksum.
const V3_CHECKSUM_LEN: usize = 2;
/// Version byte at the end of every v3 address.
const V3_VERSION_BYTE: u8 = 0x03;
/// Domain prefix hashed into the v3 checksum.
const V3_CHECKSUM_PREFIX: &[u8] = b".onion checksum";

/// A private identity key for an onion service.
#[allow(clippy::large_enum_variant)]
pub enum OnionKey {
    /// A version 2 (RSA-1024) identity.
    Rsa1024(rsa::PrivateKey),
    /// A version 3 (Ed25519) identity.
    Ed25519(SigningKey),
}

/// The public half of an onion service identity.
pub enum PublicOnionKey {
    /// A version 2 (RSA-1024) identity.
    Rsa1024(rsa::PublicKey),
    /// A version 3 (Ed25519) identity.
    Ed25519(VerifyingKey),
}

impl OnionKey {
    /// Return the public half of this key.
    pub fn public(&self) -> PublicOnionKey {
        match self {
            OnionKey::Rsa1024(sk) => PublicOnionKey::Rsa1024(sk.to_public_key()),
            OnionKey::Ed25519(sk) => PublicOnionKey::Ed25519(sk.verifying_key()),
        }
    }

    /// Return the onion address for this key.
    pub fn onion_address(&self) -> String {
        onion_address(&self.public())
    }
}

/// Generate a new onion service identity key, taking entropy from
/// `rng`.
///
/// Recognized version strings are "2", "3", "current", and "best";
/// "current" selects a v2 key and "best" a v3 key.
pub fn generate_onion_key<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    version: &str,
) -> Result<OnionKey> {
    match version {
        "2" | "current" => {
            let sk = rsa::PrivateKey::generate(rng, 1024).map_err(|_| Error::KeyGeneration)?;
            Ok(OnionKey::Rsa1024(sk))
        }
        "3" | "best" => Ok(OnionKey::Ed25519(SigningKey::generate(rng))),
        _ => Err(Error::UnsupportedVersion),
    }
}

/// Return the onion address corresponding to a public key.
pub fn onion_address(pk: &PublicOnionKey) -> String {
    match pk {
        PublicOnionKey::Rsa1024(pk) => {
            b32_encode(pk.to_rsa_identity().permanent_id())
        }
        PublicOnionKey::Ed25519(pk) => {
            let mut body = Vec::with_capacity(V3_ADDRESS_LEN);
            body.extend_from_slice(pk.as_bytes());
            body.extend_from_slice(&v3_checksum(pk.as_bytes()));
            body.push(V3_VERSION_BYTE);
            b32_encode(&body)
        }
    }
}

/// Return true iff `addr` is a well-formed onion address of either
/// version.
pub fn onion_address_is_valid(addr: &str) -> bool {
    v2_address_is_valid(addr) || v3_public_key(addr).is_ok()
}

/// Return true iff `addr` is a well-formed v2 onion address.
///
/// A v2 address carries a truncated hash, so this can only check the
/// encoding, not the existence of a matching key.
pub fn v2_address_is_valid(addr: &str) -> bool {
    match b32_decode(addr) {
        Some(decoded) => decoded.len() == V2_ADDRESS_LEN,
        None => false,
    }
}

/// Extract the Ed25519 public key from a v3 onion address, checking
/// the embedded checksum and version byte.
pub fn v3_public_key(addr: &str) -> Result<VerifyingKey> {
    let decoded = b32_decode(addr).ok_or(Error::BadBase32)?;
    if decoded.len() != V3_ADDRESS_LEN {
        return Err(Error::BadLength);
    }
    let (pk, rest) = decoded.split_at(32);
    let (chksum, ver) = rest.split_at(V3_CHECKSUM_LEN);
    if ver[0] != V3_VERSION_BYTE {
        return Err(Error::BadVersionByte);
    }
    if chksum.ct_eq(&v3_checksum(pk)).unwrap_u8() != 1 {
        return Err(Error::ChecksumMismatch);
    }
    let pk: &[u8; 32] = pk.try_into().map_err(|_| Error::BadLength)?;
    VerifyingKey::from_bytes(pk).map_err(|_| Error::BadPublicKey)
}

/// Compute the two-byte checksum embedded in a v3 address.
fn v3_checksum(pk: &[u8]) -> [u8; V3_CHECKSUM_LEN] {
    let mut h = Sha3_256::new();
    h.update(V3_CHECKSUM_PREFIX);
    h.update(pk);
    h.update([V3_VERSION_BYTE]);
    let digest = h.finalize();
    [digest[0], digest[1]]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn v3_roundtrip() {
        let mut rng = rand::thread_rng();
        let key = generate_onion_key(&mut rng, "3").unwrap();
        let addr = key.onion_address();
        assert_eq!(addr.len(), 56);
        assert!(onion_address_is_valid(&addr));

        let pk = v3_public_key(&addr).unwrap();
        match key.public() {
            PublicOnionKey::Ed25519(expected) => assert_eq!(pk, expected),
            _ => panic!("generated the wrong kind of key"),
        }
    }

    #[test]
    fn v3_corruption_is_detected() {
        let mut rng = rand::thread_rng();
        let addr = generate_onion_key(&mut rng, "best").unwrap().onion_address();

        for i in 0..addr.len() {
            let mut corrupted: Vec<char> = addr.chars().collect();
            corrupted[i] = if corrupted[i] == 'a' { 'b' } else { 'a' };
            let corrupted: String = corrupted.into_iter().collect();
            if corrupted == addr {
                continue;
            }
            assert!(v3_public_key(&corrupted).is_err(), "index {}", i);
        }
    }

    #[test]
    fn v3_error_cases_are_distinct() {
        assert_eq!(v3_public_key("not base32!").err(), Some(Error::BadBase32));
        assert_eq!(v3_public_key("mfrggzdf").err(), Some(Error::BadLength));

        // Right length, wrong trailing version byte.
        let mut body = vec![0_u8; V3_ADDRESS_LEN];
        body[34] = 0x04;
        assert_eq!(
            v3_public_key(&b32_encode(&body)).err(),
            Some(Error::BadVersionByte)
        );

        // Right version byte, bogus checksum.
        let mut body = vec![0_u8; V3_ADDRESS_LEN];
        body[34] = V3_VERSION_BYTE;
        assert_eq!(
            v3_public_key(&b32_encode(&body)).err(),
            Some(Error::ChecksumMismatch)
        );
    }

    #[test]
    fn v2_address_shape() {
        let addr = "expyuzz4wqqyqhjn";
        assert!(v2_address_is_valid(addr));
        assert!(onion_address_is_valid(addr));
        assert!(!v2_address_is_valid("tooshort"));
    }

    #[test]
    fn version_aliases() {
        let mut rng = rand::thread_rng();
        assert!(matches!(
            generate_onion_key(&mut rng, "current"),
            Ok(OnionKey::Rsa1024(_))
        ));
        assert!(matches!(
            generate_onion_key(&mut rng, "3"),
            Ok(OnionKey::Ed25519(_))
        ));
        assert_eq!(
            generate_onion_key(&mut rng, "4").err(),
            Some(Error::UnsupportedVersion)
        );
    }
}
