//! Implementations of Writeable and Readable for the types that the
//! rest of the workspace encodes and decodes.

use super::*;
use std::convert::TryInto;

/// Vec<u8> is the main type that implements Writer.
impl Writer for Vec<u8> {
    fn write_all(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
    fn write_u8(&mut self, byte: u8) {
        // specialize for performance
        self.push(byte);
    }
    fn write_zeros(&mut self, n: usize) {
        // specialize for performance
        let new_len = self.len() + n;
        self.resize(new_len, 0);
    }
}

impl Writeable for [u8] {
    fn write_onto<B: Writer + ?Sized>(&self, b: &mut B) {
        b.write_all(self)
    }
}

impl Writeable for Vec<u8> {
    fn write_onto<B: Writer + ?Sized>(&self, b: &mut B) {
        b.write_all(&self[..])
    }
}

impl<const N: usize> Writeable for [u8; N] {
    fn write_onto<B: Writer + ?Sized>(&self, b: &mut B) {
        b.write_all(&self[..])
    }
}

impl<const N: usize> Readable for [u8; N] {
    fn take_from(b: &mut Reader<'_>) -> Result<Self> {
        let bytes = b.take(N)?;
        // take() returned exactly N bytes, so this conversion can't fail.
        bytes.try_into().map_err(|_| Error::Truncated)
    }
}

impl Readable for u8 {
    fn take_from(b: &mut Reader<'_>) -> Result<Self> {
        b.take_u8()
    }
}

impl Readable for u16 {
    fn take_from(b: &mut Reader<'_>) -> Result<Self> {
        b.take_u16()
    }
}

impl Readable for u32 {
    fn take_from(b: &mut Reader<'_>) -> Result<Self> {
        b.take_u32()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Reader, Writer};

    #[test]
    fn vec_writeable() {
        let mut w: Vec<u8> = Vec::new();
        let body: Vec<u8> = vec![1, 2, 3];
        w.write(&body);
        w.write(&[9_u8; 2]);
        assert_eq!(&w[..], &[1, 2, 3, 9, 9]);
    }

    #[test]
    fn array_readable() {
        let mut r = Reader::from_slice(&[0, 7, 9][..]);
        let v: u16 = r.extract().unwrap();
        assert_eq!(v, 7);
        let a: [u8; 1] = r.extract().unwrap();
        assert_eq!(a, [9]);
        r.should_be_exhausted().unwrap();
    }
}
