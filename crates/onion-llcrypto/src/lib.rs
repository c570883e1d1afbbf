//! Low-level crypto implementations for onion identities.
//!
//! This crate doesn't have much of interest: for the most part it
//! just wraps other crates that implement lower-level cryptographic
//! functionality.  In some cases the functionality is just
//! re-exported; in others, it is wrapped to present a consistent
//! interface.
//!
//! Digests are in `d`, public key cryptography (signatures and key
//! identities) is in `pk`, and the base32 alphabet that onion
//! addresses use is in `util`.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod d;
pub mod pk;
pub mod util;
