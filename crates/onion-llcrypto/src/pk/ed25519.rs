//! Re-exporting Ed25519 implementations, and related utilities.
//!
//! Here we re-export types from [`ed25519_dalek`] that implement the
//! Ed25519 signature algorithm.
//!
//! We additionally provide an `Ed25519Identity` type to represent the
//! unvalidated Ed25519 keys that certificates and descriptors carry
//! as raw 32-byte strings.

use std::convert::{TryFrom, TryInto};
use std::fmt::{self, Debug, Display, Formatter};
use subtle::ConstantTimeEq;

pub use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// An Ed25519 key, as an unchecked, unvalidated 32-byte string.
///
/// This type is distinct from an Ed25519 [`VerifyingKey`] for several
/// reasons:
///  * We're storing it in a compact format, whereas the public key
///    implementation might want an expanded form for more efficient
///    key validation.
///  * This type hasn't checked whether the bytes here actually _are_ a
///    valid Ed25519 public key.
#[derive(Clone, Copy)]
pub struct Ed25519Identity {
    /// A raw unchecked Ed25519 public key.
    id: [u8; 32],
}

impl Ed25519Identity {
    /// Construct a new Ed25519 identity from a 32-byte sequence.
    ///
    /// This might or might not actually be a valid Ed25519 public key.
    ///
    /// ```
    /// use onion_llcrypto::pk::ed25519::{Ed25519Identity, VerifyingKey};
    /// use std::convert::TryInto;
    ///
    /// let bytes = b"klsadjfkladsfjklsdafkljasdfsdsd!";
    /// let id = Ed25519Identity::new(*bytes);
    /// let pk: Result<VerifyingKey, _> = (&id).try_into();
    /// assert!(pk.is_ok());
    /// ```
    pub fn new(id: [u8; 32]) -> Self {
        Ed25519Identity { id }
    }
    /// If `id` is of the correct length, wrap it in an Ed25519Identity.
    pub fn from_slice(id: &[u8]) -> Option<Self> {
        let id: [u8; 32] = id.try_into().ok()?;
        Some(Ed25519Identity::new(id))
    }
    /// Return a reference to the bytes in this key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.id[..]
    }
}

impl From<[u8; 32]> for Ed25519Identity {
    fn from(id: [u8; 32]) -> Self {
        Ed25519Identity::new(id)
    }
}

impl From<VerifyingKey> for Ed25519Identity {
    fn from(pk: VerifyingKey) -> Self {
        (&pk).into()
    }
}

impl From<&VerifyingKey> for Ed25519Identity {
    fn from(pk: &VerifyingKey) -> Self {
        Ed25519Identity::new(pk.to_bytes())
    }
}

impl TryFrom<&Ed25519Identity> for VerifyingKey {
    type Error = ed25519_dalek::SignatureError;
    fn try_from(id: &Ed25519Identity) -> Result<VerifyingKey, Self::Error> {
        VerifyingKey::from_bytes(&id.id)
    }
}

impl TryFrom<Ed25519Identity> for VerifyingKey {
    type Error = ed25519_dalek::SignatureError;
    fn try_from(id: Ed25519Identity) -> Result<VerifyingKey, Self::Error> {
        (&id).try_into()
    }
}

impl PartialEq<Ed25519Identity> for Ed25519Identity {
    fn eq(&self, rhs: &Ed25519Identity) -> bool {
        self.id.ct_eq(&rhs.id).unwrap_u8() == 1
    }
}

impl Eq for Ed25519Identity {}

impl Display for Ed25519Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use base64::engine::general_purpose::STANDARD_NO_PAD;
        use base64::Engine;
        write!(f, "{}", STANDARD_NO_PAD.encode(self.id))
    }
}

impl Debug for Ed25519Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Identity {{ {} }}", self)
    }
}
