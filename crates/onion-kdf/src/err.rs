//! Error type for key derivation.

use thiserror::Error;

/// An error produced while deriving keys or reading a keystream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for more keystream than the extendable-output
    /// construction can ever produce.
    #[error("requested more output than the XOF can produce")]
    ExceededOutputLength,
    /// The personalization string was shorter than the 16 bytes the
    /// XOF requires.
    #[error("personalization string shorter than 16 bytes")]
    ShortPersonalization,
}
