//! Break a byte stream into keyword lines and PEM objects.
//!
//! This layer is deliberately forgiving: it never reports an error.
//! When it cannot consume another record it stops, and the caller
//! receives whatever bytes were left over.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

/// Marker that introduces a PEM object.
const PEM_BEGIN: &[u8] = b"-----BEGIN ";
/// Marker that introduces a PEM end line.
const PEM_END: &[u8] = b"-----END ";
/// Trailing dashes of a PEM tag line.
const PEM_DASHES: &[u8] = b"-----";

/// Width of the base64 body lines we emit.
const PEM_COLUMNS: usize = 64;

/// Take one record off the front of `data`.
///
/// A record is a newline-terminated keyword line; its space-separated
/// arguments keep empty tokens, matching a split on every single
/// space.  If the next line opens a PEM object, the object's decoded
/// bytes are appended as one extra argument and the object is
/// consumed too.
///
/// Returns `None`, consuming nothing, when no full record can be
/// taken: no newline, a keyword that is not UTF-8, or a malformed PEM
/// object.
pub(crate) fn parse_out_next_field(data: &[u8]) -> Option<(String, Vec<Vec<u8>>, &[u8])> {
    let nl = data.iter().position(|b| *b == b'\n')?;
    let line = &data[..nl];
    let mut rest = &data[nl + 1..];

    let mut tokens = line.split(|b| *b == b' ');
    let keyword = String::from_utf8(tokens.next().unwrap_or(b"").to_vec()).ok()?;
    let mut args: Vec<Vec<u8>> = tokens.map(|t| t.to_vec()).collect();

    if rest.starts_with(PEM_BEGIN) {
        let (obj, pem_rest) = decode_object(rest)?;
        args.push(obj);
        rest = pem_rest;
    }
    Some((keyword, args, rest))
}

/// Decode one PEM object from the front of `data`.
///
/// Returns the decoded bytes and the input that follows the END line,
/// or `None` if the object is malformed.
pub(crate) fn decode_object(data: &[u8]) -> Option<(Vec<u8>, &[u8])> {
    let mut lines = LineCursor { data };

    let begin = lines.next_line()?;
    let tag = begin
        .strip_prefix(PEM_BEGIN)?
        .strip_suffix(PEM_DASHES)?;

    let mut body = Vec::new();
    loop {
        let line = lines.next_line()?;
        if let Some(end_tag) = line.strip_prefix(PEM_END) {
            if end_tag.strip_suffix(PEM_DASHES)? != tag {
                return None;
            }
            break;
        }
        body.extend_from_slice(line);
    }

    let decoded = B64.decode(&body).ok()?;
    Some((decoded, lines.data))
}

/// Encode `data` as a PEM object with the given tag, base64 body
/// wrapped at 64 columns.
pub(crate) fn encode_object(tag: &str, data: &[u8]) -> String {
    let mut out = format!("-----BEGIN {}-----\n", tag);
    let body = B64.encode(data);
    for chunk in body.as_bytes().chunks(PEM_COLUMNS) {
        // The body is ASCII, so chunking cannot split a character.
        out.push_str(std::str::from_utf8(chunk).unwrap_or(""));
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", tag));
    out
}

/// Cursor that hands out newline-terminated lines.
struct LineCursor<'a> {
    /// Unconsumed input.
    data: &'a [u8],
}

impl<'a> LineCursor<'a> {
    /// Take the next line, without its newline.  The final line of
    /// the input may omit the newline.
    fn next_line(&mut self) -> Option<&'a [u8]> {
        if self.data.is_empty() {
            return None;
        }
        match self.data.iter().position(|b| *b == b'\n') {
            Some(nl) => {
                let line = &self.data[..nl];
                self.data = &self.data[nl + 1..];
                Some(line)
            }
            None => {
                let line = self.data;
                self.data = &self.data[self.data.len()..];
                Some(line)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keyword_and_args() {
        let (kw, args, rest) = parse_out_next_field(b"router moria1 128.31.0.34 9101\nnext\n").unwrap();
        assert_eq!(kw, "router");
        assert_eq!(args, vec![b"moria1".to_vec(), b"128.31.0.34".to_vec(), b"9101".to_vec()]);
        assert_eq!(rest, b"next\n");
    }

    #[test]
    fn missing_newline_stops() {
        assert!(parse_out_next_field(b"router moria1").is_none());
    }

    #[test]
    fn pem_object_becomes_trailing_arg() {
        let input = b"onion-key\n-----BEGIN RSA PUBLIC KEY-----\nAAEC\n-----END RSA PUBLIC KEY-----\ntail\n";
        let (kw, args, rest) = parse_out_next_field(input).unwrap();
        assert_eq!(kw, "onion-key");
        assert_eq!(args, vec![vec![0x00, 0x01, 0x02]]);
        assert_eq!(rest, b"tail\n");
    }

    #[test]
    fn mismatched_pem_tags_stop() {
        let input = b"onion-key\n-----BEGIN A-----\nAAEC\n-----END B-----\n";
        assert!(parse_out_next_field(input).is_none());
    }

    #[test]
    fn object_roundtrip() {
        let data: Vec<u8> = (0_u8..=255).collect();
        let pem = encode_object("MESSAGE", &data);
        // 256 bytes of base64 wraps past one line.
        assert!(pem.lines().count() > 3);
        let (decoded, rest) = decode_object(pem.as_bytes()).unwrap();
        assert_eq!(decoded, data);
        assert!(rest.is_empty());
    }
}
