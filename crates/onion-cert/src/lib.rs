//! Binary codec for the Ed25519 certificates that onion service
//! descriptors and relay descriptors carry.
//!
//! The wire layout is version (1 byte), certificate type (1),
//! expiration in hours since the epoch (4, big-endian), certified key
//! type (1), certified key (32), extension count (1), the extensions,
//! and a 64-byte Ed25519 signature over everything that precedes it.
//! Each extension is a big-endian length (2), a type byte, a flags
//! byte, and `length` bytes of data.
//!
//! Decoding does not verify the signature; a caller that knows which
//! key should have signed the certificate checks it afterwards with
//! [`Certificate::verify_signature`].

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use onion_bytes::{Error, Readable, Reader, Result, Writeable, Writer};
use onion_llcrypto::pk::ed25519::{Ed25519Identity, Signature, Signer, SigningKey, Verifier, VerifyingKey};

use std::convert::TryFrom;
use std::time::{Duration, SystemTime};

/// Recognized values for the certificate type field.
pub mod certtype {
    // 00 through 03 are reserved.

    /// Identity key certifying a signing key.
    pub const IDENTITY_V_SIGNING: u8 = 0x04;
    /// Signing key certifying a TLS certificate by digest.
    pub const SIGNING_V_TLS_CERT: u8 = 0x05;
    /// Signing key certifying a link authentication key.
    pub const SIGNING_V_LINK_AUTH: u8 = 0x06;

    // 07 reserved for RSA cross-certification.

    /// Ntor onion key cross-certifying the identity key.
    pub const NTOR_CC_IDENTITY: u8 = 0x0A;
}

/// Extension identifiers for extensions in certificates.
pub mod exttype {
    /// Extension carrying the Ed25519 key that signed this
    /// certificate.
    ///
    /// Certificates do not always contain the key that signed them.
    pub const SIGNED_WITH_ED25519_KEY: u8 = 0x04;
}

/// Identifiers for the type of the key getting certified.
pub mod keytype {
    /// An Ed25519 key.
    pub const ED25519_KEY: u8 = 0x01;
    /// The SHA256 of a DER-encoded RSA key.
    pub const SHA256_OF_RSA: u8 = 0x02;
    /// The SHA256 of an X.509 certificate.
    pub const SHA256_OF_X509: u8 = 0x03;
}

/// The certificate version this codec understands.
const CERT_VERSION: u8 = 1;

/// An extension in a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// The type of the extension.
    ext_type: u8,
    /// Flags byte; bit 1 means the extension affects validation.
    flags: u8,
    /// The body of the extension.
    data: Vec<u8>,
}

impl Extension {
    /// Create a new extension.
    ///
    /// # Panics
    ///
    /// Panics if `data` is longer than a u16 can describe.
    pub fn new(ext_type: u8, flags: u8, data: Vec<u8>) -> Self {
        assert!(data.len() <= u16::MAX as usize);
        Extension {
            ext_type,
            flags,
            data,
        }
    }

    /// Return the type byte of this extension.
    pub fn ext_type(&self) -> u8 {
        self.ext_type
    }

    /// Return the body of this extension.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Readable for Extension {
    fn take_from(b: &mut Reader<'_>) -> Result<Self> {
        let len = b.take_u16()?;
        let ext_type = b.take_u8()?;
        let flags = b.take_u8()?;
        let data = b.take(len as usize)?.into();
        Ok(Extension {
            ext_type,
            flags,
            data,
        })
    }
}

impl Writeable for Extension {
    fn write_onto<B: Writer + ?Sized>(&self, w: &mut B) {
        w.write_u16(self.data.len() as u16);
        w.write_u8(self.ext_type);
        w.write_u8(self.flags);
        w.write_all(&self.data[..]);
    }
}

/// An Ed25519-signed certificate.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// Type of the certificate; recognized values are in `certtype`.
    cert_type: u8,
    /// Hours after the epoch when this certificate expires.
    exp_hours: u32,
    /// Type of the certified key; recognized values are in `keytype`.
    cert_key_type: u8,
    /// The key being certified.
    certified_key: Ed25519Identity,
    /// Extensions, in the order they appear on the wire.
    extensions: Vec<Extension>,
    /// Signature over the encoded certificate body.
    signature: [u8; 64],
    /// Whether the signing key certified here is itself used to sign
    /// the enclosing document.  Declared by the document that carries
    /// the certificate, not by the certificate bytes.
    pubkey_sign: bool,
}

impl Certificate {
    /// Create a new unsigned certificate.  The expiration is rounded
    /// down to a whole hour.
    pub fn new(
        cert_type: u8,
        cert_key_type: u8,
        certified_key: Ed25519Identity,
        expiration: SystemTime,
    ) -> Self {
        let exp_hours = expiration
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| (d.as_secs() / 3600) as u32)
            .unwrap_or(0);
        Certificate {
            cert_type,
            exp_hours,
            cert_key_type,
            certified_key,
            extensions: Vec::new(),
            signature: [0_u8; 64],
            pubkey_sign: false,
        }
    }

    /// Add an extension, replacing any earlier extension of the same
    /// type in place.
    ///
    /// # Panics
    ///
    /// Panics if the certificate already holds 255 extensions.
    pub fn push_extension(&mut self, ext: Extension) {
        match self
            .extensions
            .iter_mut()
            .find(|e| e.ext_type == ext.ext_type)
        {
            Some(slot) => *slot = ext,
            None => {
                assert!(self.extensions.len() < u8::MAX as usize);
                self.extensions.push(ext);
            }
        }
    }

    /// Try to decode a certificate from a byte slice.
    ///
    /// Returns an error if the slice is truncated anywhere, including
    /// inside a declared extension length, or if it is not completely
    /// exhausted.  The signature is recorded, not checked.
    pub fn decode(cert: &[u8]) -> Result<Self> {
        let mut r = Reader::from_slice(cert);
        let v = r.take_u8()?;
        if v != CERT_VERSION {
            return Err(Error::BadMessage("unrecognized certificate version"));
        }
        let cert_type = r.take_u8()?;
        let exp_hours = r.take_u32()?;
        let cert_key_type = r.take_u8()?;
        let certified_key: [u8; 32] = r.extract()?;
        let n_exts = r.take_u8()?;
        let mut cert = Certificate {
            cert_type,
            exp_hours,
            cert_key_type,
            certified_key: certified_key.into(),
            extensions: Vec::new(),
            signature: [0_u8; 64],
            pubkey_sign: false,
        };
        for _ in 0..n_exts {
            let e: Extension = r.extract()?;
            // A repeated extension type keeps its position but takes
            // the later value.
            cert.push_extension(e);
        }
        cert.signature = r.extract()?;
        r.should_be_exhausted()?;
        Ok(cert)
    }

    /// Encode this certificate, including its current signature.
    ///
    /// The round trip through [`Certificate::decode`] is
    /// byte-identical whenever the input had no repeated extension
    /// types.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = self.sign_payload();
        w.write_all(&self.signature[..]);
        w
    }

    /// Encode everything the signature covers: the whole certificate
    /// up to but not including the signature itself.
    pub fn sign_payload(&self) -> Vec<u8> {
        let mut w = Vec::new();
        w.write_u8(CERT_VERSION);
        w.write_u8(self.cert_type);
        w.write_u32(self.exp_hours);
        w.write_u8(self.cert_key_type);
        w.write_all(self.certified_key.as_bytes());
        w.write_u8(self.extensions.len() as u8);
        for e in self.extensions.iter() {
            w.write(e);
        }
        w
    }

    /// Sign the certificate with `skey`, replacing any existing
    /// signature.
    pub fn sign(&mut self, skey: &SigningKey) {
        self.signature = skey.sign(&self.sign_payload()).to_bytes();
    }

    /// Check the signature against `pkey`.
    pub fn verify_signature(&self, pkey: &VerifyingKey) -> Result<()> {
        let sig = Signature::from_bytes(&self.signature);
        pkey.verify(&self.sign_payload(), &sig)
            .map_err(|_| Error::BadMessage("invalid certificate signature"))
    }

    /// If the certificate carries a SIGNED_WITH_ED25519_KEY extension,
    /// return the key it names.
    pub fn signed_with(&self) -> Option<Ed25519Identity> {
        let ext = self
            .extensions
            .iter()
            .find(|e| e.ext_type == exttype::SIGNED_WITH_ED25519_KEY)?;
        Ed25519Identity::from_slice(&ext.data)
    }

    /// Return the expiration time, at hour granularity.
    pub fn expiration(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(u64::from(self.exp_hours) * 3600)
    }

    /// Return true iff this certificate will be expired at `when`.
    pub fn is_expired_at(&self, when: SystemTime) -> bool {
        when >= self.expiration()
    }

    /// Return the type of this certificate.
    pub fn cert_type(&self) -> u8 {
        self.cert_type
    }

    /// Return the type of the certified key.
    pub fn cert_key_type(&self) -> u8 {
        self.cert_key_type
    }

    /// Return the certified key.
    pub fn certified_key(&self) -> &Ed25519Identity {
        &self.certified_key
    }

    /// If the certified key is a well-formed Ed25519 public key,
    /// return it.
    pub fn certified_ed25519_key(&self) -> Option<VerifyingKey> {
        VerifyingKey::try_from(&self.certified_key).ok()
    }

    /// Return the extensions, in wire order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Return the signature bytes.
    pub fn signature(&self) -> &[u8; 64] {
        &self.signature
    }

    /// Return whether the enclosing document declared the certified
    /// key as its own signing key.
    pub fn pubkey_sign(&self) -> bool {
        self.pubkey_sign
    }

    /// Record the enclosing document's pubkey-sign declaration.
    pub fn set_pubkey_sign(&mut self, pubkey_sign: bool) {
        self.pubkey_sign = pubkey_sign;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicate_extension_keeps_position_takes_last_value() {
        let mut cert = Certificate::new(
            certtype::IDENTITY_V_SIGNING,
            keytype::ED25519_KEY,
            [7_u8; 32].into(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(3600 * 100),
        );
        cert.push_extension(Extension::new(0x04, 0, vec![1; 32]));
        cert.push_extension(Extension::new(0xf0, 0, vec![2]));
        cert.push_extension(Extension::new(0x04, 0, vec![3; 32]));

        assert_eq!(cert.extensions().len(), 2);
        assert_eq!(cert.extensions()[0].ext_type(), 0x04);
        assert_eq!(cert.extensions()[0].data(), &[3_u8; 32][..]);
        assert_eq!(cert.extensions()[1].ext_type(), 0xf0);
        assert_eq!(cert.signed_with(), Some([3_u8; 32].into()));
    }

    #[test]
    fn expiration_is_hour_granular() {
        let cert = Certificate::new(
            certtype::SIGNING_V_TLS_CERT,
            keytype::SHA256_OF_X509,
            [0_u8; 32].into(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(3600 * 5 + 1799),
        );
        assert_eq!(
            cert.expiration(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(3600 * 5)
        );
        assert!(cert.is_expired_at(cert.expiration()));
        assert!(!cert.is_expired_at(cert.expiration() - Duration::from_secs(1)));
    }
}
