//! `onion-bytes`: Utilities to decode/encode things into bytes.
//!
//! Binary objects in this workspace (certificates, key blobs) are
//! parsed through the [`Reader`] type here, so that a truncated or
//! corrupt input turns into a reported [`Error`] instead of an
//! out-of-range panic.
//!
//! This crate is for byte-oriented formats that are not regular
//! enough for serde and not complex enough to need a full
//! meta-language.  It only handles data that is already in memory;
//! for anything that can fail with an IO problem, use std::io
//! instead.
//!
//! # Contents and concepts
//!
//! This crate is structured around four key types:
//!
//! * [`Reader`]: A view of a byte slice, from which data can be decoded.
//! * [`Writer`]: Trait to represent a growable buffer of bytes.
//!   (`Vec<u8>` implements this.)
//! * [`Writeable`]: Trait for an object that can be encoded onto a [`Writer`]
//! * [`Readable`]: Trait for an object that can be decoded from a [`Reader`].

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

mod err;
mod impls;
mod reader;
mod writer;

pub use err::Error;
pub use reader::Reader;
pub use writer::Writer;

/// Result type returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for an object that can be encoded onto a Writer by reference.
///
/// Implement this trait in order to make an object writeable.
///
/// Most code won't need to call this directly, but will instead use
/// it implicitly via the Writer::write() method.
///
/// # Example
///
/// ```
/// use onion_bytes::{Writeable, Writer};
/// #[derive(Debug, Eq, PartialEq)]
/// struct Extension {
///   ext_type: u8,
///   body: Vec<u8>,
/// }
///
/// impl Writeable for Extension {
///     fn write_onto<B: Writer + ?Sized>(&self, b: &mut B) {
///         b.write_u16(self.body.len() as u16);
///         b.write_u8(self.ext_type);
///         b.write_all(&self.body[..]);
///     }
/// }
///
/// let ext = Extension { ext_type: 4, body: vec![9] };
/// let mut writer: Vec<u8> = Vec::new();
/// writer.write(&ext);
/// assert_eq!(writer, &[0x00, 0x01, 0x04, 0x09]);
/// ```
pub trait Writeable {
    /// Encode this object into the writer `b`.
    fn write_onto<B: Writer + ?Sized>(&self, b: &mut B);
}

/// Trait for an object that can be extracted from a Reader.
///
/// Implement this trait in order to make an object that can (maybe)
/// be decoded from a reader.
///
/// Most code won't need to call this directly, but will instead use
/// it implicitly via the Reader::extract() method.
///
/// # Example
///
/// ```
/// use onion_bytes::{Readable, Reader, Result};
/// #[derive(Debug, Eq, PartialEq)]
/// struct Header {
///   version: u8,
///   cert_type: u8,
/// }
///
/// impl Readable for Header {
///     fn take_from(r: &mut Reader<'_>) -> Result<Self> {
///         let version = r.take_u8()?;
///         let cert_type = r.take_u8()?;
///         Ok(Header { version, cert_type })
///     }
/// }
///
/// let encoded = [0x01, 0x04];
/// let mut reader = Reader::from_slice(&encoded);
/// let h: Header = reader.extract()?;
/// assert_eq!(h, Header { version: 1, cert_type: 4 });
/// reader.should_be_exhausted()?;
/// # Result::Ok(())
/// ```
pub trait Readable: Sized {
    /// Try to extract an object of this type from a Reader.
    ///
    /// Implementations should generally try to be efficient: this is
    /// not the right place to check signatures or perform expensive
    /// operations.
    fn take_from(b: &mut Reader<'_>) -> Result<Self>;
}
