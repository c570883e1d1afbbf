//! Public-key cryptography for onion identities.
//!
//! In old places, the directory protocol uses RSA; newer public-key
//! cryptography is based on curve25519 and ed25519.

pub mod ed25519;
pub mod keymanip;
pub mod rsa;

/// Re-exporting Curve25519 implementations.
///
/// Eventually there should probably be a key-agreement trait or two
/// that this implements, but for now we just re-use the API from
/// x25519-dalek.
pub mod curve25519 {
    pub use x25519_dalek::{PublicKey, SharedSecret, StaticSecret};
}
