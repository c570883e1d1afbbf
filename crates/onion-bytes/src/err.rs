//! Internal: error type for onion-bytes.

use thiserror::Error;

/// Error type for decoding objects from bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The object was truncated, or not fully present in the input.
    #[error("object truncated (or not fully present)")]
    Truncated,
    /// The input had extra bytes after the end of the object.
    #[error("extra bytes at end of object")]
    ExtraneousBytes,
    /// The object was structurally invalid for the stated reason.
    #[error("bad object: {0}")]
    BadMessage(&'static str),
}
