//! Version 2 onion service descriptors ("rendezvous service
//! descriptors").
//!
//! A service publishes one of these per replica to the hidden service
//! directories.  The descriptor identifier rotates with a time period
//! derived from the service's permanent identity, so clients and
//! directories can agree on where a descriptor lives without talking
//! to each other.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use onion_llcrypto::d::{Digest, Sha1};
use onion_llcrypto::pk::rsa;
use onion_llcrypto::util::{b32_decode, b32_encode};

use crate::doc::{parse_tor_document, TorDocument};
use crate::tokenize::encode_object;
use crate::{Error, Result};

/// Descriptor format version we produce.
const DESC_VERSION: u32 = 2;
/// Protocol versions we advertise by default.
const PROTOCOL_VERSIONS: &[u32] = &[2, 3];
/// Length of the truncated identity underlying a v2 onion address.
const PERM_ID_LEN: usize = 10;
/// Time format used by the publication-time field.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A v2 onion service descriptor.
#[derive(Clone)]
pub struct RendezvousDescriptor {
    /// Rotating identifier this descriptor is stored under (SHA-1
    /// sized).  Computed by [`RendezvousDescriptor::finalize`].
    pub desc_id: Vec<u8>,
    /// Descriptor format version.
    pub version: u32,
    /// The service's permanent RSA identity key.
    pub permanent_key: rsa::PublicKey,
    /// Secret part of the identifier derivation (SHA-1 sized).
    pub secret_id_part: Vec<u8>,
    /// Publication time, kept at whole-hour granularity.
    pub publication_time: DateTime<Utc>,
    /// Advertised protocol versions.
    pub protocol_versions: Vec<u32>,
    /// Opaque introduction-points block, serialized as a MESSAGE
    /// object when nonempty.
    pub intro_points_block: Vec<u8>,
    /// RSA signature over the serialized descriptor; empty until
    /// signed.
    pub signature: Vec<u8>,
    /// Which replica this descriptor is for.  Feeds the identifier
    /// derivation but is not itself serialized.
    pub replica: u8,
}

impl RendezvousDescriptor {
    /// Create a descriptor for `permanent_key` and `replica` with
    /// default version and protocol fields.  The identifier fields
    /// stay empty until [`RendezvousDescriptor::finalize`] runs.
    pub fn new(permanent_key: rsa::PublicKey, replica: u8) -> Self {
        RendezvousDescriptor {
            desc_id: Vec::new(),
            version: DESC_VERSION,
            permanent_key,
            secret_id_part: Vec::new(),
            publication_time: DateTime::UNIX_EPOCH,
            protocol_versions: PROTOCOL_VERSIONS.to_vec(),
            intro_points_block: Vec::new(),
            signature: Vec::new(),
            replica,
        }
    }

    /// Fill in the time-dependent fields: publication time (floored
    /// to the hour), secret identifier part, and descriptor
    /// identifier.
    pub fn finalize(&mut self, now: DateTime<Utc>) {
        let unix = now.timestamp();
        self.publication_time = Utc
            .timestamp_opt(unix - unix.rem_euclid(3600), 0)
            .single()
            .unwrap_or(now);
        let perm_id = permanent_id(&self.permanent_key);
        self.secret_id_part = calc_secret_id(&perm_id, now, self.replica);
        self.desc_id = calc_descriptor_id(&perm_id, &self.secret_id_part);
    }

    /// Serialize the descriptor, signature included when present.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&format!(
            "rendezvous-service-descriptor {}\n",
            b32_encode(&self.desc_id)
        ));
        out.push_str(&format!("version {}\n", self.version));
        out.push_str("permanent-key\n");
        out.push_str(&encode_object("RSA PUBLIC KEY", &self.permanent_key.to_der()));
        out.push_str(&format!(
            "secret-id-part {}\n",
            b32_encode(&self.secret_id_part)
        ));
        out.push_str(&format!(
            "publication-time {}\n",
            self.publication_time.format(TIME_FORMAT)
        ));
        let versions: Vec<String> = self
            .protocol_versions
            .iter()
            .map(|v| v.to_string())
            .collect();
        out.push_str(&format!("protocol-versions {}\n", versions.join(",")));
        if !self.intro_points_block.is_empty() {
            out.push_str("introduction-points\n");
            out.push_str(&encode_object("MESSAGE", &self.intro_points_block));
        }
        out.push_str("signature\n");
        if !self.signature.is_empty() {
            out.push_str(&encode_object("SIGNATURE", &self.signature));
        }
        out.into_bytes()
    }

    /// Return a signed copy of this descriptor.
    ///
    /// The signature covers the serialization with the signature
    /// field empty; this descriptor itself is not modified.
    pub fn sign(&self, signer: &rsa::PrivateKey) -> Result<Self> {
        let mut signed = self.clone();
        signed.signature = Vec::new();
        let digest = Sha1::digest(signed.to_bytes());
        signed.signature = signer
            .sign(&digest)
            .map_err(|_| Error::BadSignature("signature"))?;
        Ok(signed)
    }

    /// Check the signature against the descriptor's own permanent
    /// key.
    pub fn verify_signature(&self) -> Result<()> {
        let mut unsigned = self.clone();
        unsigned.signature = Vec::new();
        let digest = Sha1::digest(unsigned.to_bytes());
        self.permanent_key
            .verify(&digest, &self.signature)
            .map_err(|_| Error::BadSignature("signature"))
    }

    /// Return the onion identifier (the v2 address) of the service
    /// this descriptor belongs to.
    pub fn onion_id(&self) -> String {
        b32_encode(&permanent_id(&self.permanent_key))
    }

    /// Build a descriptor from one syntactic document.
    fn from_document(doc: &TorDocument) -> Result<Self> {
        if !doc.has("rendezvous-service-descriptor") {
            return Err(Error::WrongDocumentType("rendezvous service descriptor"));
        }
        let desc_id_b32 = doc
            .exactly_once("rendezvous-service-descriptor")?
            .joined_string();
        let desc_id = b32_decode(&desc_id_b32)
            .ok_or_else(|| Error::BadArgument("rendezvous-service-descriptor", desc_id_b32))?;

        let version_str = doc.exactly_once("version")?.joined_string();
        let version: u32 = version_str
            .parse()
            .map_err(|_| Error::BadArgument("version", version_str))?;

        let perm_entry = doc.exactly_once("permanent-key")?;
        let der = perm_entry
            .args()
            .last()
            .ok_or(Error::TooFewArguments("permanent-key"))?;
        let permanent_key = rsa::PublicKey::from_der(der).ok_or(Error::BadObject(
            "permanent-key",
            onion_bytes::Error::BadMessage("invalid PKCS#1 DER"),
        ))?;

        let secret_b32 = doc.exactly_once("secret-id-part")?.joined_string();
        let secret_id_part = b32_decode(&secret_b32)
            .ok_or_else(|| Error::BadArgument("secret-id-part", secret_b32))?;

        let time_str = doc.exactly_once("publication-time")?.joined_string();
        let publication_time = chrono::NaiveDateTime::parse_from_str(&time_str, TIME_FORMAT)
            .map(|nd| Utc.from_utc_datetime(&nd))
            .map_err(|_| Error::BadArgument("publication-time", time_str))?;

        let versions_str = doc.exactly_once("protocol-versions")?.joined_string();
        let mut protocol_versions = Vec::new();
        for v in versions_str.split(',') {
            protocol_versions.push(
                v.parse()
                    .map_err(|_| Error::BadArgument("protocol-versions", versions_str.clone()))?,
            );
        }

        let intro_points_block = match doc.at_most_once("introduction-points")? {
            Some(entry) => entry.joined(),
            None => Vec::new(),
        };

        let sig_entry = doc.exactly_once("signature")?;
        if sig_entry.n_args() < 1 {
            return Err(Error::TooFewArguments("signature"));
        }
        let signature = sig_entry.joined();

        Ok(RendezvousDescriptor {
            desc_id,
            version,
            permanent_key,
            secret_id_part,
            publication_time,
            protocol_versions,
            intro_points_block,
            signature,
            replica: 0,
        })
    }
}

/// Parse every well-formed rendezvous descriptor in `data`.
///
/// Documents of another type, and descriptors that fail validation,
/// are skipped with a log line; the unconsumed tail of the input is
/// returned alongside the descriptors.
pub fn parse_rendezvous_descriptors(data: &[u8]) -> (Vec<RendezvousDescriptor>, &[u8]) {
    let (docs, rest) = parse_tor_document(data);
    let mut descs = Vec::new();
    for doc in &docs {
        match RendezvousDescriptor::from_document(doc) {
            Ok(desc) => descs.push(desc),
            Err(e) => warn!("skipping document: {}", e),
        }
    }
    (descs, rest)
}

/// Compute the descriptor identifier, base32-encoded, for an onion
/// address at a given time and replica.
pub fn desc_id_for_onion(onion: &str, when: DateTime<Utc>, replica: u8) -> Result<String> {
    let perm_id =
        b32_decode(onion).ok_or_else(|| Error::BadArgument("onion", onion.to_string()))?;
    if perm_id.len() != PERM_ID_LEN {
        return Err(Error::BadArgument("onion", onion.to_string()));
    }
    let secret_id = calc_secret_id(&perm_id, when, replica);
    Ok(b32_encode(&calc_descriptor_id(&perm_id, &secret_id)))
}

/// Truncated SHA-1 of the PKCS#1 DER encoding of an RSA key: the
/// identity underlying a v2 onion address.
fn permanent_id(pk: &rsa::PublicKey) -> Vec<u8> {
    pk.to_rsa_identity().permanent_id().to_vec()
}

/// Derive the secret identifier part for a time and replica.
///
/// The time period shifts by a fraction of a day determined by the
/// first identity byte, so not every service rotates its descriptors
/// at the same moment.
fn calc_secret_id(perm_id: &[u8], when: DateTime<Utc>, replica: u8) -> Vec<u8> {
    let offset = u32::from(perm_id[0]) * 86400 / 256;
    let time_period = (when.timestamp() as u32).wrapping_add(offset) / 86400;
    let mut h = Sha1::new();
    h.update(time_period.to_be_bytes());
    h.update([replica]);
    h.finalize().to_vec()
}

/// Descriptor identifier: SHA-1 of identity and secret part.
fn calc_descriptor_id(perm_id: &[u8], secret_id: &[u8]) -> Vec<u8> {
    let mut h = Sha1::new();
    h.update(perm_id);
    h.update(secret_id);
    h.finalize().to_vec()
}
