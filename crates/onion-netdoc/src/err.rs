//! Error type for document parsing and validation.

use thiserror::Error;

/// An error that occurred while validating a parsed document.
///
/// Tokenization itself never produces an error: the tokenizer stops
/// at the first byte sequence it cannot consume and returns the
/// remainder.  Errors arise when a semantic layer checks field
/// multiplicity, argument syntax, embedded objects, or signatures.
/// Batch parsers treat any of these as grounds to drop the current
/// document and continue with the next.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The document is not of the type this parser handles.
    #[error("document is not a {0}")]
    WrongDocumentType(&'static str),
    /// A required field did not appear.
    #[error("didn't find required entry {0}")]
    MissingField(&'static str),
    /// A field that may appear at most once appeared again.
    #[error("duplicate entry for {0}")]
    DuplicateField(&'static str),
    /// A field had fewer arguments than it needs.
    #[error("too few arguments for {0}")]
    TooFewArguments(&'static str),
    /// A field carried an unexpected argument.
    #[error("unexpected argument for {0}")]
    UnexpectedArgument(&'static str),
    /// An argument failed to parse.
    #[error("bad argument for {0}: {1}")]
    BadArgument(&'static str, String),
    /// An embedded object (key, certificate) failed to decode.
    #[error("bad object for {0}: {1}")]
    BadObject(&'static str, #[source] onion_bytes::Error),
    /// A signature or cross-certificate did not verify.
    #[error("couldn't validate signature for {0}")]
    BadSignature(&'static str),
}
