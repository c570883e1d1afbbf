//! Passphrase-based key derivation used for deterministic onion
//! identities.
//!
//! This crate has two stages.  The first is a memory-hard hash
//! ([`balloon::balloon`] and its parallel variant
//! [`balloon::balloon_m`]) that turns a passphrase and salt into a
//! single digest-sized secret; its cost parameters make brute-force
//! guessing expensive in both space and time.  The second is an
//! extendable-output construction ([`xof::Xof`]) that expands such a
//! secret into an arbitrary-length keystream.
//!
//! [`keystream_reader`] ties the two together with fixed domain salts
//! and production cost parameters, and [`KeystreamRng`] lets the
//! resulting stream drive key generation APIs that expect a random
//! number generator.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod balloon;
mod err;
mod keystream;
pub mod xof;

pub use err::Error;
pub use keystream::{keystream_reader, KeystreamRng};

/// A Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
