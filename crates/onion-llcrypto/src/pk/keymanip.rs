//! Key manipulation functions for use with public keys.
//!
//! Tor does some interesting and not-really-standard things with its
//! curve25519 and ed25519 keys.  In order to prove ownership of a
//! curve25519 private key, a relay converts it into an ed25519 key
//! and then uses that ed25519 key to sign its identity key; the
//! "ntor-onion-key-crosscert" entry in a relay descriptor declares
//! the sign bit needed to reverse the conversion.

use crate::pk;

/// Convert a curve25519 public key (with sign bit) to an ed25519
/// public key, for use in ntor key cross-certification.
///
/// Note that this formula is not terribly standardized; don't use
/// it for anything besides cross-certification.
pub fn convert_curve25519_to_ed25519_public(
    pubkey: &pk::curve25519::PublicKey,
    signbit: u8,
) -> Option<pk::ed25519::VerifyingKey> {
    use curve25519_dalek::montgomery::MontgomeryPoint;

    let point = MontgomeryPoint(*pubkey.as_bytes());
    let edpoint = point.to_edwards(signbit)?;

    let compressed_y = edpoint.compress();
    pk::ed25519::VerifyingKey::from_bytes(compressed_y.as_bytes()).ok()
}
