//! The syntactic document model: ordered keyword/entry multimaps.
//!
//! Nothing in this module knows what any keyword means.  Multiplicity
//! rules and argument syntax belong to the semantic layers in
//! [`hsdesc`] and [`routerdesc`].

pub mod hsdesc;
pub mod routerdesc;

use crate::tokenize::parse_out_next_field;
use crate::{Error, Result};

/// One parsed record: the arguments that followed a keyword, in
/// order.  When the record carried a PEM object, its decoded bytes
/// are the last argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TorEntry {
    /// The arguments, in the order they appeared.
    args: Vec<Vec<u8>>,
}

impl TorEntry {
    /// Create an entry from its arguments.
    pub fn new(args: Vec<Vec<u8>>) -> Self {
        TorEntry { args }
    }

    /// Return all arguments in order.
    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }

    /// Return the argument at `idx`, if there is one.
    pub fn arg(&self, idx: usize) -> Option<&[u8]> {
        self.args.get(idx).map(|a| &a[..])
    }

    /// Return the number of arguments.
    pub fn n_args(&self) -> usize {
        self.args.len()
    }

    /// Join the arguments back together with single spaces.
    pub fn joined(&self) -> Vec<u8> {
        self.args.join(&b' ')
    }

    /// [`TorEntry::joined`], lossily decoded as UTF-8.
    pub fn joined_string(&self) -> String {
        String::from_utf8_lossy(&self.joined()).into_owned()
    }
}

/// An ordered multimap from keyword to the entries seen under it.
///
/// Backed by a vector rather than a hash map so that iteration and
/// re-serialization preserve encounter order.
#[derive(Debug, Clone, Default)]
pub struct TorDocument {
    /// Keywords in first-encounter order, each with its entries in
    /// encounter order.
    entries: Vec<(String, Vec<TorEntry>)>,
}

impl TorDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        TorDocument::default()
    }

    /// Record one more entry under `keyword`.
    pub fn push(&mut self, keyword: String, entry: TorEntry) {
        match self.entries.iter_mut().find(|(k, _)| *k == keyword) {
            Some((_, entries)) => entries.push(entry),
            None => self.entries.push((keyword, vec![entry])),
        }
    }

    /// Return true iff the document has at least one entry for
    /// `keyword`.
    pub fn has(&self, keyword: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == keyword)
    }

    /// Return all entries for `keyword`, in order.  Absent keywords
    /// yield an empty slice.
    pub fn all(&self, keyword: &str) -> &[TorEntry] {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, entries)| &entries[..])
            .unwrap_or(&[])
    }

    /// Require exactly one entry for `keyword` and return it.
    pub fn exactly_once(&self, keyword: &'static str) -> Result<&TorEntry> {
        match self.all(keyword) {
            [] => Err(Error::MissingField(keyword)),
            [entry] => Ok(entry),
            _ => Err(Error::DuplicateField(keyword)),
        }
    }

    /// Allow at most one entry for `keyword` and return it if
    /// present.
    pub fn at_most_once(&self, keyword: &'static str) -> Result<Option<&TorEntry>> {
        match self.all(keyword) {
            [] => Ok(None),
            [entry] => Ok(Some(entry)),
            _ => Err(Error::DuplicateField(keyword)),
        }
    }

    /// Iterate over keywords in first-encounter order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| &k[..])
    }
}

/// Decide whether a record opens a new document.
///
/// The very first record always does; after that, a record opens a
/// new document exactly when its keyword repeats the keyword that
/// opened the first one.
pub fn starts_new_document(first_keyword: Option<&str>, keyword: &str) -> bool {
    match first_keyword {
        None => true,
        Some(first) => first == keyword,
    }
}

/// Split a byte stream into documents.
///
/// Parsing stops, silently, at the first point where no further
/// record can be tokenized; whatever was not consumed comes back as
/// the second element.  An empty input yields no documents.
pub fn parse_tor_document(mut data: &[u8]) -> (Vec<TorDocument>, &[u8]) {
    let mut docs = Vec::new();
    let mut doc: Option<TorDocument> = None;
    let mut first_keyword: Option<String> = None;

    loop {
        let (keyword, args, rest) = match parse_out_next_field(data) {
            Some(parsed) => parsed,
            None => break,
        };
        data = rest;

        if starts_new_document(first_keyword.as_deref(), &keyword) {
            if let Some(finished) = doc.take() {
                docs.push(finished);
            }
        }
        if first_keyword.is_none() {
            first_keyword = Some(keyword.clone());
        }
        doc.get_or_insert_with(TorDocument::new)
            .push(keyword, TorEntry::new(args));
    }
    if let Some(finished) = doc {
        docs.push(finished);
    }
    (docs, data)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boundary_rule() {
        assert!(starts_new_document(None, "router"));
        assert!(starts_new_document(Some("router"), "router"));
        assert!(!starts_new_document(Some("router"), "bandwidth"));
    }

    #[test]
    fn two_documents_split_with_empty_remainder() {
        let input = b"router a 1\nbandwidth 1 2 3\nrouter b 2\nbandwidth 4 5 6\n";
        let (docs, rest) = parse_tor_document(input);
        assert_eq!(docs.len(), 2);
        assert!(rest.is_empty());
        assert_eq!(docs[0].exactly_once("router").unwrap().joined_string(), "a 1");
        assert_eq!(docs[1].exactly_once("router").unwrap().joined_string(), "b 2");
    }

    #[test]
    fn unterminated_tail_is_returned() {
        let input = b"router a 1\nbandwidth 1 2 3\nrouter b";
        let (docs, rest) = parse_tor_document(input);
        assert_eq!(docs.len(), 1);
        assert_eq!(rest, b"router b");
    }

    #[test]
    fn repeated_keywords_accumulate_in_order() {
        let input = b"router a\nreject *:25\naccept *:80\nreject *:119\n";
        let (docs, rest) = parse_tor_document(input);
        assert!(rest.is_empty());
        assert_eq!(docs.len(), 1);
        let rejects: Vec<String> = docs[0]
            .all("reject")
            .iter()
            .map(TorEntry::joined_string)
            .collect();
        assert_eq!(rejects, vec!["*:25", "*:119"]);
        assert!(docs[0].at_most_once("accept").unwrap().is_some());
        assert!(matches!(
            docs[0].exactly_once("reject"),
            Err(Error::DuplicateField("reject"))
        ));
        assert!(matches!(
            docs[0].exactly_once("bandwidth"),
            Err(Error::MissingField("bandwidth"))
        ));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let (docs, rest) = parse_tor_document(b"");
        assert!(docs.is_empty());
        assert!(rest.is_empty());
    }
}
