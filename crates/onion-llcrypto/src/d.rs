//! Digests used to derive and validate onion identities.
//!
//! In various places, for legacy reasons, the directory protocol uses
//! SHA1, SHA2, and SHA3.  We re-export them all here, implementing
//! the Digest trait.

pub use sha1::Sha1;
pub use sha2::{Sha256, Sha512};
pub use sha3::Sha3_256;

// Re-exported so callers don't have to name the digest crate to get
// the trait the types above implement.
pub use digest::Digest;
