//! Wrappers for the RSA implementation used in the directory protocol.
//!
//! This module handles the legacy RSA-1024 keys that v2 onion
//! services and relay descriptors use: PKCS#1 DER encoding and
//! decoding, key generation, and the hash-OID-free PKCSv1 signatures
//! that Tor produces and checks.

use rand_core::CryptoRngCore;
use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey};
use rsa::Pkcs1v15Sign;
use std::fmt;
use subtle::ConstantTimeEq;

/// How many bytes are in an "RSA ID"?  (This is a legacy concept, and
/// refers to identifying a key by a SHA1 digest of its DER encoding.)
pub const RSA_ID_LEN: usize = 20;

/// An identifier for an RSA key, as used throughout the directory
/// protocol: the SHA1 digest of the key's PKCS#1 DER encoding.
///
/// The first ten bytes of this identifier are also the "permanent id"
/// that a v2 onion address encodes.
#[derive(Clone)]
pub struct RsaIdentity {
    /// SHA1 digest of a DER-encoded public key.
    id: [u8; RSA_ID_LEN],
}

impl PartialEq<RsaIdentity> for RsaIdentity {
    fn eq(&self, rhs: &RsaIdentity) -> bool {
        self.id.ct_eq(&rhs.id).unwrap_u8() == 1
    }
}

impl Eq for RsaIdentity {}

impl fmt::Display for RsaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", hex::encode(&self.id[..]))
    }
}

impl fmt::Debug for RsaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RsaIdentity {{ ${} }}", hex::encode(&self.id[..]))
    }
}

impl RsaIdentity {
    /// Expose an RsaIdentity as a slice of bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.id[..]
    }
    /// Construct an RsaIdentity from a slice of bytes.
    ///
    /// Returns None if the input is not of the correct length.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        use std::convert::TryInto;
        let id: [u8; RSA_ID_LEN] = bytes.try_into().ok()?;
        Some(RsaIdentity { id })
    }
    /// Return the "permanent id" for this key: the first ten bytes of
    /// the identity, as encoded in a v2 onion address.
    pub fn permanent_id(&self) -> &[u8] {
        &self.id[..10]
    }
}

/// An RSA public key.
///
/// This implementation is a simple wrapper so that we can define new
/// methods and traits on the type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(rsa::RsaPublicKey);

/// An RSA private key.
#[derive(Clone)]
pub struct PrivateKey(rsa::RsaPrivateKey);

impl PrivateKey {
    /// Generate a new RSA private key with modulus size `bits`,
    /// taking entropy from `rng`.
    pub fn generate<R: CryptoRngCore + ?Sized>(
        rng: &mut R,
        bits: usize,
    ) -> Result<Self, rsa::Error> {
        Ok(PrivateKey(rsa::RsaPrivateKey::new(rng, bits)?))
    }
    /// Return the public component of this key.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }
    /// Sign `hashed` (a digest, already computed by the caller) with
    /// this key, using PKCSv1 padding with the hash algorithm OID
    /// omitted, as Tor does.
    pub fn sign(&self, hashed: &[u8]) -> Result<Vec<u8>, rsa::Error> {
        self.0.sign(Pkcs1v15Sign::new_unprefixed(), hashed)
    }
}

impl PublicKey {
    /// Return the number of bits in the modulus for this key.
    pub fn bits(&self) -> usize {
        use rsa::traits::PublicKeyParts;
        self.0.n().bits()
    }
    /// Try to check a signature.  The signed data (or its digest)
    /// should be in 'hashed', and the alleged signature in 'sig'.
    ///
    /// Tor uses RSA-PKCSv1 signatures, with hash algorithm OIDs
    /// omitted.
    pub fn verify(&self, hashed: &[u8], sig: &[u8]) -> Result<(), rsa::Error> {
        self.0.verify(Pkcs1v15Sign::new_unprefixed(), hashed, sig)
    }
    /// Decode an alleged DER byte string into a PublicKey.
    ///
    /// Returns None if the DER string does not have a valid PublicKey.
    ///
    /// (This function expects an RSAPublicKey, as used in descriptors.
    /// It does not expect or accept a PublicKeyInfo.)
    pub fn from_der(der: &[u8]) -> Option<Self> {
        Some(PublicKey(rsa::RsaPublicKey::from_pkcs1_der(der).ok()?))
    }
    /// Encode this public key into the DER format that descriptors use.
    ///
    /// The result is an RSAPublicKey, not a PublicKeyInfo.
    pub fn to_der(&self) -> Vec<u8> {
        // Can't fail, since we already have a valid key.
        self.0
            .to_pkcs1_der()
            .expect("RSA key could not be DER-encoded")
            .as_bytes()
            .to_vec()
    }
    /// Compute the RsaIdentity for this public key: the SHA1 digest
    /// of its DER encoding.
    pub fn to_rsa_identity(&self) -> RsaIdentity {
        use crate::d::{Digest, Sha1};
        let id: [u8; RSA_ID_LEN] = Sha1::digest(self.to_der()).into();
        RsaIdentity { id }
    }
}
