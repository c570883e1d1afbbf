//! Parse and generate the line-oriented documents that Tor
//! directories exchange.
//!
//! A document is a sequence of records.  Each record is a keyword
//! line with space-separated arguments, optionally followed by a PEM
//! object whose decoded bytes become one more trailing argument.  A
//! byte stream may concatenate many documents; a new document starts
//! whenever the keyword of the very first record repeats.
//!
//! The [`doc`] module holds the purely syntactic layer
//! ([`doc::TorDocument`]) and the two semantic models built on it:
//! onion service descriptors ([`doc::hsdesc`]) and relay server
//! descriptors ([`doc::routerdesc`]).  Batch parsers skip documents
//! that fail validation, log the reason, and keep going; the
//! unconsumed tail of the input is always handed back to the caller.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod doc;
mod err;
mod tokenize;

pub use err::Error;

/// A Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
