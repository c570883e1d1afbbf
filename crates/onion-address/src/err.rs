//! Error type for onion address handling.

use thiserror::Error;

/// An error from generating an onion service key or handling an onion
/// address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The requested onion service version string is not one we
    /// recognize.
    #[error("unrecognized version string for onion address")]
    UnsupportedVersion,
    /// The underlying key generation failed.
    #[error("onion service key generation failed")]
    KeyGeneration,
    /// The address is not valid base32.
    #[error("onion address is not valid base32")]
    BadBase32,
    /// The decoded address has the wrong length.
    #[error("onion address has the wrong length")]
    BadLength,
    /// The trailing version byte of a v3 address is wrong.
    #[error("onion address has an unknown version byte")]
    BadVersionByte,
    /// The embedded checksum does not match the embedded key.
    #[error("onion address checksum mismatch")]
    ChecksumMismatch,
    /// The embedded key bytes do not form a valid Ed25519 public key.
    #[error("onion address embeds an invalid public key")]
    BadPublicKey,
}
