//! Utilities for cryptographic purposes
//!
//! For now, this is the base32 alphabet that onion addresses and
//! descriptor identifiers are written in: RFC 4648, unpadded, and
//! always rendered lowercase.

use base32::Alphabet;

/// The alphabet used for onion addresses and descriptor ids.
const B32: Alphabet = Alphabet::Rfc4648 { padding: false };

/// Encode `bin` as unpadded lowercase base32.
pub fn b32_encode(bin: &[u8]) -> String {
    base32::encode(B32, bin).to_ascii_lowercase()
}

/// Decode unpadded base32 `s`, accepting either case.
///
/// Returns None if `s` is not valid base32.
pub fn b32_decode(s: &str) -> Option<Vec<u8>> {
    base32::decode(B32, &s.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4648_vector() {
        // RFC 4648 test vector, lowercased and unpadded.
        assert_eq!(b32_encode(b"foobar"), "mzxw6ytboi");
        assert_eq!(b32_decode("mzxw6ytboi").unwrap(), b"foobar");
        // decoding is case-insensitive
        assert_eq!(b32_decode("MZXW6YTBOI").unwrap(), b"foobar");
    }

    #[test]
    fn roundtrip() {
        let perm_id = b"\x00\x01\x02\x03\x04\x05\x06\x07\x08\x09";
        let addr = b32_encode(&perm_id[..]);
        assert_eq!(addr.len(), 16);
        assert_eq!(b32_decode(&addr).unwrap(), &perm_id[..]);
    }

    #[test]
    fn bad_input() {
        assert!(b32_decode("not base32 at all!").is_none());
    }
}
