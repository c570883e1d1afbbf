//! Relay server descriptors (`@type server-descriptor 1.0`).
//!
//! A relay publishes one of these to describe its keys, address, and
//! policy.  The batch parser validates each document independently:
//! field multiplicity, argument syntax, and the two cross
//! certificates that tie the Ed25519 identity to the RSA keys.  A
//! document that fails any check is dropped with a log line and the
//! batch moves on.

use base64::engine::general_purpose::{STANDARD as B64, STANDARD_NO_PAD as B64_NO_PAD};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use onion_cert::Certificate;
use onion_llcrypto::d::{Digest, Sha1};
use onion_llcrypto::pk::curve25519;
use onion_llcrypto::pk::ed25519::Ed25519Identity;
use onion_llcrypto::pk::keymanip::convert_curve25519_to_ed25519_public;
use onion_llcrypto::pk::rsa;

use crate::doc::{parse_tor_document, TorDocument, TorEntry};
use crate::{Error, Result};

use std::convert::TryInto;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// The document type line this parser accepts.
const DOCUMENT_TYPE: &str = "server-descriptor 1.0";

/// The self-reported software a relay runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Software name ("Tor").
    pub software_name: String,
    /// Software version string.
    pub software_version: String,
    /// Operating system name.
    pub name: String,
}

/// Self-reported bandwidth figures, in bytes per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bandwidth {
    /// Long-term sustainable rate.
    pub average: u64,
    /// Short-term burst rate.
    pub burst: u64,
    /// Observed capacity.
    pub observed: u64,
}

/// IPv4 exit policy lines, kept verbatim in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitPolicy {
    /// Arguments of every reject line, in order.
    pub reject: Vec<String>,
    /// Arguments of every accept line, in order.
    pub accept: Vec<String>,
}

/// Summary IPv6 exit policy: a default verdict and a port list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exit6Policy {
    /// True for an accept list, false for a reject list.
    pub accept: bool,
    /// The ports or port ranges the verdict applies to.
    pub port_list: Vec<String>,
}

/// A parsed relay server descriptor.
#[derive(Clone)]
pub struct RelayDesc {
    /// The relay's nickname.
    pub nickname: String,
    /// Primary IPv4 address.
    pub address: IpAddr,
    /// OR port on the primary address.
    pub or_port: u16,
    /// Deprecated SOCKS port, normally zero.
    pub socks_port: u16,
    /// Directory port.
    pub dir_port: u16,
    /// All OR addresses: the primary one plus any or-address lines.
    pub or_addrs: Vec<SocketAddr>,
    /// Certificate binding an Ed25519 identity to the signing key.
    pub identity_ed25519: Option<Certificate>,
    /// The Ed25519 master identity, when declared.
    pub master_key_ed25519: Option<Ed25519Identity>,
    /// Self-reported bandwidth.
    pub bandwidth: Bandwidth,
    /// Self-reported software and operating system.
    pub platform: Option<Platform>,
    /// When the descriptor was generated.
    pub published: DateTime<Utc>,
    /// RSA identity fingerprint with the spaces stripped out.
    pub fingerprint: String,
    /// True if the relay says it is hibernating.
    pub hibernating: bool,
    /// Self-reported uptime.
    pub uptime: Duration,
    /// Digest of the relay's extra-info document.
    pub extra_info_digest: String,
    /// Medium-term RSA onion key (TAP).
    pub onion_key: rsa::PublicKey,
    /// RSA signature binding the onion key to the identity keys.
    pub onion_key_crosscert: Vec<u8>,
    /// Long-term RSA identity key used to sign the descriptor.
    pub signing_key: rsa::PublicKey,
    /// Hidden service descriptor versions stored, when a directory.
    pub hsdir_versions: Vec<u8>,
    /// Operator contact line.
    pub contact: String,
    /// Curve25519 onion key for the ntor handshake.
    pub ntor_onion_key: Option<curve25519::PublicKey>,
    /// Certificate binding the ntor key to the Ed25519 identity.
    pub ntor_onion_key_crosscert: Option<Certificate>,
    /// IPv4 exit policy.
    pub exit_policy: ExitPolicy,
    /// IPv6 exit policy summary.
    pub exit6_policy: Option<Exit6Policy>,
    /// True if the relay caches extra-info documents.
    pub caches_extra_info: bool,
    /// True if the relay allows single-hop exit connections.
    pub allow_single_hop_exits: bool,
    /// Ed25519 signature over the descriptor.
    pub router_sig_ed25519: Option<[u8; 64]>,
    /// RSA signature over the descriptor.
    pub router_signature: Vec<u8>,
}

/// Parse every well-formed relay descriptor in `data`.
///
/// Documents that are not server descriptors, or that fail any
/// validation rule, are skipped with a log line.  The unconsumed tail
/// of the input is returned alongside the descriptors.
pub fn parse_relay_descriptors(data: &[u8]) -> (Vec<RelayDesc>, &[u8]) {
    let (docs, rest) = parse_tor_document(data);
    let mut descs = Vec::new();
    for doc in &docs {
        match RelayDesc::from_document(doc) {
            Ok(desc) => descs.push(desc),
            Err(e) => warn!("skipping document: {}", e),
        }
    }
    (descs, rest)
}

impl RelayDesc {
    /// Build a descriptor from one syntactic document, validating as
    /// we go.
    fn from_document(doc: &TorDocument) -> Result<Self> {
        match doc.all("@type").first() {
            Some(t) if t.joined_string() == DOCUMENT_TYPE => (),
            _ => return Err(Error::WrongDocumentType(DOCUMENT_TYPE)),
        }

        let router = doc.exactly_once("router")?;
        if router.n_args() < 5 {
            return Err(Error::TooFewArguments("router"));
        }
        let nickname = arg_string(router, 0);
        let address: IpAddr = arg_string(router, 1)
            .parse()
            .map_err(|_| Error::BadArgument("router", arg_string(router, 1)))?;
        let or_port = parse_port(router, 2, "router")?;
        let socks_port = parse_port(router, 3, "router")?;
        let dir_port = parse_port(router, 4, "router")?;
        let mut or_addrs = vec![SocketAddr::new(address, or_port)];

        let identity_ed25519 = match doc.at_most_once("identity-ed25519")? {
            Some(entry) => {
                let bytes = entry
                    .arg(0)
                    .ok_or(Error::TooFewArguments("identity-ed25519"))?;
                Some(
                    Certificate::decode(bytes)
                        .map_err(|e| Error::BadObject("identity-ed25519", e))?,
                )
            }
            None => None,
        };
        let has_identity = identity_ed25519.is_some();

        let master_key_ed25519 = match doc.at_most_once("master-key-ed25519")? {
            Some(entry) => {
                let decoded = B64_NO_PAD
                    .decode(entry.joined())
                    .map_err(|_| Error::BadArgument("master-key-ed25519", entry.joined_string()))?;
                let master = Ed25519Identity::from_slice(&decoded)
                    .ok_or_else(|| Error::BadArgument("master-key-ed25519", entry.joined_string()))?;
                if let Some(cert) = &identity_ed25519 {
                    if let Some(signed_with) = cert.signed_with() {
                        if signed_with != master {
                            return Err(Error::BadArgument(
                                "master-key-ed25519",
                                "does not match the identity certificate".into(),
                            ));
                        }
                    }
                }
                Some(master)
            }
            None => None,
        };

        let bw = doc.exactly_once("bandwidth")?;
        if bw.n_args() != 3 {
            return Err(Error::TooFewArguments("bandwidth"));
        }
        let bandwidth = Bandwidth {
            average: parse_u64(bw, 0, "bandwidth")?,
            burst: parse_u64(bw, 1, "bandwidth")?,
            observed: parse_u64(bw, 2, "bandwidth")?,
        };

        let platform = match doc.at_most_once("platform")? {
            Some(entry) => Some(parse_platform_entry(entry)?),
            None => None,
        };

        // The deprecated "protocols" field is ignored.

        let published_str = doc.exactly_once("published")?.joined_string();
        let published = chrono::NaiveDateTime::parse_from_str(&published_str, "%Y-%m-%d %H:%M:%S")
            .map(|nd| Utc.from_utc_datetime(&nd))
            .map_err(|_| Error::BadArgument("published", published_str))?;

        let fingerprint = match doc.at_most_once("fingerprint")? {
            Some(entry) => entry.joined_string().replace(' ', ""),
            None => String::new(),
        };

        let hibernating = doc.at_most_once("hibernating")?.is_some();

        let uptime = match doc.at_most_once("uptime")? {
            Some(entry) => Duration::from_secs(parse_u64(entry, 0, "uptime")?),
            None => Duration::from_secs(0),
        };

        // Any arguments past the first are not in dir-spec; ignore them.
        let extra_info_digest = match doc.at_most_once("extra-info-digest")? {
            Some(entry) => String::from_utf8_lossy(
                entry.arg(0).ok_or(Error::TooFewArguments("extra-info-digest"))?,
            )
            .into_owned(),
            None => String::new(),
        };

        let onion_key = parse_rsa_key(doc.exactly_once("onion-key")?, "onion-key")?;
        let signing_key = parse_rsa_key(doc.exactly_once("signing-key")?, "signing-key")?;

        let onion_key_crosscert = match doc.at_most_once("onion-key-crosscert")? {
            Some(entry) => {
                let crosscert = entry.joined();
                // The signature covers unhashed data: the SHA-1 of the
                // signing key's DER encoding, then the master key (or
                // zeros when there is none).
                let mut data = Sha1::digest(signing_key.to_der()).to_vec();
                match &master_key_ed25519 {
                    Some(master) => data.extend_from_slice(master.as_bytes()),
                    None => data.extend_from_slice(&[0_u8; 32]),
                }
                onion_key
                    .verify(&data, &crosscert)
                    .map_err(|_| Error::BadSignature("onion-key-crosscert"))?;
                crosscert
            }
            None if has_identity => return Err(Error::MissingField("onion-key-crosscert")),
            None => Vec::new(),
        };

        let hsdir_versions = match doc.at_most_once("hidden-service-dir")? {
            Some(entry) if entry.n_args() == 0 => vec![2],
            Some(entry) => {
                let mut versions = Vec::new();
                for arg in entry.args() {
                    let v: u8 = String::from_utf8_lossy(arg)
                        .parse()
                        .map_err(|_| Error::BadArgument("hidden-service-dir", entry.joined_string()))?;
                    versions.push(v);
                }
                versions
            }
            None => Vec::new(),
        };

        let contact = match doc.at_most_once("contact")? {
            Some(entry) => entry.joined_string(),
            None => String::new(),
        };

        let ntor_onion_key = match doc.at_most_once("ntor-onion-key")? {
            Some(entry) => {
                let joined = entry.joined();
                let decoded = B64
                    .decode(&joined)
                    .or_else(|_| B64_NO_PAD.decode(&joined))
                    .map_err(|_| Error::BadArgument("ntor-onion-key", entry.joined_string()))?;
                let key: [u8; 32] = decoded[..]
                    .try_into()
                    .map_err(|_| Error::BadArgument("ntor-onion-key", entry.joined_string()))?;
                Some(curve25519::PublicKey::from(key))
            }
            None if has_identity => return Err(Error::MissingField("ntor-onion-key")),
            None => None,
        };

        let ntor_onion_key_crosscert = match doc.at_most_once("ntor-onion-key-crosscert")? {
            Some(entry) => {
                let mut cert = Certificate::decode(
                    entry
                        .arg(1)
                        .ok_or(Error::TooFewArguments("ntor-onion-key-crosscert"))?,
                )
                .map_err(|e| Error::BadObject("ntor-onion-key-crosscert", e))?;
                let signbit = match entry.arg(0) {
                    Some(b"0") => false,
                    Some(b"1") => true,
                    _ => {
                        return Err(Error::BadArgument(
                            "ntor-onion-key-crosscert",
                            entry.joined_string(),
                        ))
                    }
                };
                cert.set_pubkey_sign(signbit);
                // The certificate is signed with the Ed25519 form of
                // the ntor key; check it when the conversion works.
                if let Some(ntor) = &ntor_onion_key {
                    if let Some(pk) = convert_curve25519_to_ed25519_public(ntor, signbit as u8) {
                        cert.verify_signature(&pk)
                            .map_err(|_| Error::BadSignature("ntor-onion-key-crosscert"))?;
                    }
                }
                Some(cert)
            }
            None if has_identity => return Err(Error::MissingField("ntor-onion-key-crosscert")),
            None => None,
        };

        let mut exit_policy = ExitPolicy::default();
        for entry in doc.all("reject") {
            exit_policy.reject.push(entry.joined_string());
        }
        for entry in doc.all("accept") {
            exit_policy.accept.push(entry.joined_string());
        }

        let exit6_policy = match doc.at_most_once("ipv6-policy")? {
            Some(entry) => {
                let accept = match entry.arg(0) {
                    Some(b"accept") => true,
                    Some(b"reject") => false,
                    _ => {
                        return Err(Error::BadArgument("ipv6-policy", entry.joined_string()));
                    }
                };
                let port_list = entry.args()[1..]
                    .iter()
                    .map(|p| String::from_utf8_lossy(p).into_owned())
                    .collect();
                Some(Exit6Policy { accept, port_list })
            }
            None => None,
        };

        // The "family" field is ignored.

        let router_sig_ed25519 = match doc.at_most_once("router-sig-ed25519")? {
            Some(entry) => {
                let decoded = B64_NO_PAD
                    .decode(entry.joined())
                    .map_err(|_| Error::BadArgument("router-sig-ed25519", entry.joined_string()))?;
                let sig: [u8; 64] = decoded[..]
                    .try_into()
                    .map_err(|_| Error::BadArgument("router-sig-ed25519", entry.joined_string()))?;
                Some(sig)
            }
            None if has_identity => return Err(Error::MissingField("router-sig-ed25519")),
            None => None,
        };

        let router_signature = doc.exactly_once("router-signature")?.joined();

        // "read-history", "write-history", and "eventdns" are ignored.

        let caches_extra_info = parse_bare_flag(doc, "caches-extra-info")?;
        let allow_single_hop_exits = parse_bare_flag(doc, "allow-single-hop-exits")?;

        for entry in doc.all("or-address") {
            let addr_str = String::from_utf8_lossy(
                entry.arg(0).ok_or(Error::TooFewArguments("or-address"))?,
            )
            .into_owned();
            let addr: SocketAddr = addr_str
                .parse()
                .map_err(|_| Error::BadArgument("or-address", addr_str))?;
            or_addrs.push(addr);
        }

        Ok(RelayDesc {
            nickname,
            address,
            or_port,
            socks_port,
            dir_port,
            or_addrs,
            identity_ed25519,
            master_key_ed25519,
            bandwidth,
            platform,
            published,
            fingerprint,
            hibernating,
            uptime,
            extra_info_digest,
            onion_key,
            onion_key_crosscert,
            signing_key,
            hsdir_versions,
            contact,
            ntor_onion_key,
            ntor_onion_key_crosscert,
            exit_policy,
            exit6_policy,
            caches_extra_info,
            allow_single_hop_exits,
            router_sig_ed25519,
            router_signature,
        })
    }
}

/// Lossily decode argument `idx` as a string.  Missing arguments
/// become the empty string; callers check argument counts first.
fn arg_string(entry: &TorEntry, idx: usize) -> String {
    match entry.arg(idx) {
        Some(arg) => String::from_utf8_lossy(arg).into_owned(),
        None => String::new(),
    }
}

/// Parse argument `idx` as a TCP port number.
fn parse_port(entry: &TorEntry, idx: usize, field: &'static str) -> Result<u16> {
    arg_string(entry, idx)
        .parse()
        .map_err(|_| Error::BadArgument(field, arg_string(entry, idx)))
}

/// Parse argument `idx` as a u64.
fn parse_u64(entry: &TorEntry, idx: usize, field: &'static str) -> Result<u64> {
    arg_string(entry, idx)
        .parse()
        .map_err(|_| Error::BadArgument(field, arg_string(entry, idx)))
}

/// Decode the PKCS#1 DER object attached to `entry` as an RSA public
/// key.
fn parse_rsa_key(entry: &TorEntry, field: &'static str) -> Result<rsa::PublicKey> {
    let der = entry
        .args()
        .last()
        .ok_or(Error::TooFewArguments(field))?;
    rsa::PublicKey::from_der(der).ok_or(Error::BadObject(
        field,
        onion_bytes::Error::BadMessage("invalid PKCS#1 DER"),
    ))
}

/// Validate a field that takes no arguments and whose presence means
/// true.
fn parse_bare_flag(doc: &TorDocument, field: &'static str) -> Result<bool> {
    match doc.at_most_once(field)? {
        Some(entry) if entry.n_args() == 0 => Ok(true),
        Some(_) => Err(Error::UnexpectedArgument(field)),
        None => Ok(false),
    }
}

/// Split a platform line around its single literal "on" word.
///
/// Everything before the "on" except the last word is the software
/// name, the last word before it is the version, and everything after
/// it is the operating system name.
fn parse_platform_entry(entry: &TorEntry) -> Result<Platform> {
    let on_indexes: Vec<usize> = entry
        .args()
        .iter()
        .enumerate()
        .filter(|(_, arg)| &arg[..] == b"on")
        .map(|(i, _)| i)
        .collect();
    let on = match on_indexes[..] {
        [idx] if idx >= 1 => idx,
        _ => return Err(Error::BadArgument("platform", entry.joined_string())),
    };
    let join = |args: &[Vec<u8>]| -> String {
        String::from_utf8_lossy(&args.join(&b' ')).into_owned()
    };
    Ok(Platform {
        software_name: join(&entry.args()[..on - 1]),
        software_version: arg_string(entry, on - 1),
        name: join(&entry.args()[on + 1..]),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tokenize::encode_object;
    use onion_cert::{certtype, exttype, keytype, Extension};
    use onion_llcrypto::pk::ed25519::SigningKey;

    fn entry_of(args: &[&[u8]]) -> TorEntry {
        TorEntry::new(args.iter().map(|a| a.to_vec()).collect())
    }

    #[test]
    fn platform_rule() {
        let p = parse_platform_entry(&entry_of(&[b"Tor", b"0.4.8.9", b"on", b"Linux"])).unwrap();
        assert_eq!(p.software_name, "Tor");
        assert_eq!(p.software_version, "0.4.8.9");
        assert_eq!(p.name, "Linux");

        let p = parse_platform_entry(&entry_of(&[
            b"Tor", b"0.2.3.1", b"on", b"Darwin", b"x86_64",
        ]))
        .unwrap();
        assert_eq!(p.name, "Darwin x86_64");

        // No "on", two "on"s, or a leading "on" all fail.
        assert!(parse_platform_entry(&entry_of(&[b"Tor", b"0.4.8.9"])).is_err());
        assert!(parse_platform_entry(&entry_of(&[b"a", b"on", b"b", b"on", b"c"])).is_err());
        assert!(parse_platform_entry(&entry_of(&[b"on", b"Linux"])).is_err());
    }

    /// The RSA keys and Ed25519 identity backing a synthetic
    /// descriptor.
    struct TestRelay {
        onion_sk: rsa::PrivateKey,
        signing_sk: rsa::PrivateKey,
        ed: SigningKey,
    }

    impl TestRelay {
        fn new() -> Self {
            let mut rng = rand::thread_rng();
            TestRelay {
                onion_sk: rsa::PrivateKey::generate(&mut rng, 1024).unwrap(),
                signing_sk: rsa::PrivateKey::generate(&mut rng, 1024).unwrap(),
                ed: SigningKey::generate(&mut rng),
            }
        }

        /// Render a complete, internally consistent descriptor.
        fn descriptor(&self) -> String {
            let ed_pk = self.ed.verifying_key();
            let expiry = std::time::SystemTime::now() + Duration::from_secs(48 * 3600);

            let mut id_cert = Certificate::new(
                certtype::IDENTITY_V_SIGNING,
                keytype::ED25519_KEY,
                (&ed_pk).into(),
                expiry,
            );
            id_cert.push_extension(Extension::new(
                exttype::SIGNED_WITH_ED25519_KEY,
                0,
                ed_pk.to_bytes().to_vec(),
            ));
            id_cert.sign(&self.ed);

            // The ntor key is the Montgomery form of the Ed25519 key,
            // so the cross-certificate verifies under the conversion.
            let signbit = ed_pk.to_bytes()[31] >> 7;
            let ntor_pk = ed_pk.to_montgomery().to_bytes();
            let mut ntor_cert = Certificate::new(
                certtype::NTOR_CC_IDENTITY,
                keytype::ED25519_KEY,
                (&ed_pk).into(),
                expiry,
            );
            ntor_cert.sign(&self.ed);

            let signing_pk = self.signing_sk.to_public_key();
            let mut crosscert_data = Sha1::digest(signing_pk.to_der()).to_vec();
            crosscert_data.extend_from_slice(&ed_pk.to_bytes());
            let crosscert = self.onion_sk.sign(&crosscert_data).unwrap();

            let router_sig = {
                use onion_llcrypto::pk::ed25519::Signer;
                self.ed.sign(b"descriptor body stands in here")
            };

            let mut out = String::new();
            out.push_str("@type server-descriptor 1.0\n");
            out.push_str("router testor 203.0.113.5 9001 0 9030\n");
            out.push_str("identity-ed25519\n");
            out.push_str(&encode_object("ED25519 CERT", &id_cert.encode()));
            out.push_str(&format!(
                "master-key-ed25519 {}\n",
                B64_NO_PAD.encode(ed_pk.to_bytes())
            ));
            out.push_str("platform Tor 0.4.8.9 on Linux\n");
            out.push_str("published 2026-01-02 03:00:00\n");
            out.push_str("fingerprint 1234 5678 9ABC DEF0 1234 5678 9ABC DEF0 1234 5678\n");
            out.push_str("uptime 86400\n");
            out.push_str("bandwidth 1073741824 1073741824 642457600\n");
            out.push_str("onion-key\n");
            out.push_str(&encode_object(
                "RSA PUBLIC KEY",
                &self.onion_sk.to_public_key().to_der(),
            ));
            out.push_str("signing-key\n");
            out.push_str(&encode_object("RSA PUBLIC KEY", &signing_pk.to_der()));
            out.push_str("onion-key-crosscert\n");
            out.push_str(&encode_object("CROSSCERT", &crosscert));
            out.push_str(&format!("ntor-onion-key {}\n", B64_NO_PAD.encode(ntor_pk)));
            out.push_str(&format!("ntor-onion-key-crosscert {}\n", signbit));
            out.push_str(&encode_object("ED25519 CERT", &ntor_cert.encode()));
            out.push_str("hidden-service-dir\n");
            out.push_str("contact arma at mit dot edu\n");
            out.push_str("or-address [2001:db8::5]:9001\n");
            out.push_str("reject *:25\n");
            out.push_str("accept *:80\n");
            out.push_str("reject *:119\n");
            out.push_str("ipv6-policy accept 80,443\n");
            out.push_str(&format!(
                "router-sig-ed25519 {}\n",
                B64_NO_PAD.encode(router_sig.to_bytes())
            ));
            out.push_str("router-signature\n");
            out.push_str(&encode_object("SIGNATURE", &[7_u8; 128]));
            out
        }
    }

    #[test]
    fn full_descriptor_parses() {
        let relay = TestRelay::new();
        let text = relay.descriptor();
        let (descs, rest) = parse_relay_descriptors(text.as_bytes());
        assert!(rest.is_empty());
        assert_eq!(descs.len(), 1);
        let d = &descs[0];

        assert_eq!(d.nickname, "testor");
        assert_eq!(d.address, "203.0.113.5".parse::<IpAddr>().unwrap());
        assert_eq!((d.or_port, d.socks_port, d.dir_port), (9001, 0, 9030));
        assert_eq!(d.or_addrs.len(), 2);
        assert_eq!(d.or_addrs[1], "[2001:db8::5]:9001".parse().unwrap());
        assert!(d.identity_ed25519.is_some());
        assert_eq!(
            d.master_key_ed25519,
            Some((&relay.ed.verifying_key()).into())
        );
        assert_eq!(d.bandwidth.observed, 642_457_600);
        assert_eq!(d.platform.as_ref().unwrap().name, "Linux");
        assert_eq!(d.fingerprint, "123456789ABCDEF0123456789ABCDEF012345678");
        assert_eq!(d.uptime, Duration::from_secs(86400));
        assert_eq!(d.hsdir_versions, vec![2]);
        assert_eq!(d.contact, "arma at mit dot edu");
        assert!(d.ntor_onion_key.is_some());
        let ntor_cert = d.ntor_onion_key_crosscert.as_ref().unwrap();
        assert_eq!(ntor_cert.cert_type(), certtype::NTOR_CC_IDENTITY);
        assert_eq!(d.exit_policy.reject, vec!["*:25", "*:119"]);
        assert_eq!(d.exit_policy.accept, vec!["*:80"]);
        let v6 = d.exit6_policy.as_ref().unwrap();
        assert!(v6.accept);
        assert_eq!(v6.port_list, vec!["80,443"]);
        assert!(d.router_sig_ed25519.is_some());
        assert_eq!(d.router_signature, vec![7_u8; 128]);
    }

    #[test]
    fn multiplicity_violation_drops_one_document() {
        let relay = TestRelay::new();
        let good = relay.descriptor();
        // Duplicate the bandwidth line in a second copy.
        let bad = good.replacen(
            "bandwidth 1073741824",
            "bandwidth 1 2 3\nbandwidth 1073741824",
            1,
        );
        let batch = format!("{}{}", bad, good);
        let (descs, rest) = parse_relay_descriptors(batch.as_bytes());
        assert!(rest.is_empty());
        assert_eq!(descs.len(), 1);
        assert_eq!(descs[0].bandwidth.average, 1_073_741_824);
    }

    #[test]
    fn wrong_document_type_is_skipped() {
        let (descs, rest) = parse_relay_descriptors(b"@type bridge-pool-assignment 1.0\nfoo bar\n");
        assert!(descs.is_empty());
        assert!(rest.is_empty());
    }

    #[test]
    fn tampered_onion_key_crosscert_drops_document() {
        let relay = TestRelay::new();
        let good = relay.descriptor();
        // Re-sign the crosscert over different data.
        let bogus = relay.onion_sk.sign(&[0xaa_u8; 52]).unwrap();
        let start = good.find("onion-key-crosscert\n").unwrap();
        let pem_start = start + "onion-key-crosscert\n".len();
        let pem_end = pem_start
            + good[pem_start..].find("-----END CROSSCERT-----\n").unwrap()
            + "-----END CROSSCERT-----\n".len();
        let tampered = format!(
            "{}{}{}",
            &good[..pem_start],
            encode_object("CROSSCERT", &bogus),
            &good[pem_end..]
        );
        let (descs, _) = parse_relay_descriptors(tampered.as_bytes());
        assert!(descs.is_empty());
    }

    #[test]
    fn identity_forces_companion_fields() {
        let relay = TestRelay::new();
        let good = relay.descriptor();
        // Removing the ed25519 router signature while keeping the
        // identity certificate invalidates the document.
        let sig_start = good.find("router-sig-ed25519").unwrap();
        let sig_end = sig_start + good[sig_start..].find('\n').unwrap() + 1;
        let without = format!("{}{}", &good[..sig_start], &good[sig_end..]);
        let (descs, _) = parse_relay_descriptors(without.as_bytes());
        assert!(descs.is_empty());
    }
}
