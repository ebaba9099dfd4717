//! # defs-address
//!
//! URL-like identifiers of the form `scheme://authority/path?query#fragment`
//! that portals use to make registered functions and services resolvable
//! across process and transport boundaries.

mod error;

pub use error::AddressError;

use std::fmt;

use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

/// Percent-encode set for query keys/values: everything outside of
/// unreserved characters, mirroring what `url`'s own query serializer does.
const QUERY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');

const NETWORK_SCHEMES: &[&str] = &["http", "https", "ws", "wss", "grpc", "tcp", "udp"];
const NON_NETWORK_SCHEMES: &[&str] = &["local", "test", "mock"];

/// A parsed, immutable address. Query keys preserve first-seen insertion
/// order; a key repeated in the source string keeps only its first value
/// (first value wins on duplicate keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    scheme: String,
    authority: String,
    path: String,
    query: IndexMap<String, String>,
    fragment: Option<String>,
}

impl Address {
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &IndexMap<String, String> {
        &self.query
    }

    pub fn query_get(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(|s| s.as_str())
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// `true` for schemes without network identity (`local`, `test`, `mock`).
    pub fn is_local(&self) -> bool {
        self.scheme == "local"
    }

    /// `true` for schemes with network identity. Unknown schemes default to
    /// network.
    pub fn is_network(&self) -> bool {
        if NON_NETWORK_SCHEMES.contains(&self.scheme.as_str()) {
            return false;
        }
        if NETWORK_SCHEMES.contains(&self.scheme.as_str()) {
            return true;
        }
        true
    }

    pub fn builder(scheme: impl Into<String>) -> AddressBuilder {
        AddressBuilder::new(scheme)
    }

    /// Parses an address string of the form `scheme://authority/path?query#fragment`.
    ///
    /// `local://name` and `local://name/id?…#…` both normalize to
    /// `path = "/name"`, discarding both the authority and any path segments
    /// beyond the host — the local scheme carries its disambiguating id via
    /// the `id` query parameter instead (see `libs/defs-core`'s Local portal).
    pub fn parse(s: &str) -> Result<Address, AddressError> {
        let (scheme, rest) = s
            .split_once("://")
            .ok_or_else(|| AddressError::Malformed(s.to_string()))?;
        if scheme.is_empty() {
            return Err(AddressError::Malformed(s.to_string()));
        }

        if scheme == "local" {
            return Self::parse_local(scheme, rest, s);
        }

        let url = url::Url::parse(s).map_err(|e| AddressError::Parse(e.to_string()))?;

        let authority = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };

        let mut query = IndexMap::new();
        for (k, v) in url.query_pairs() {
            query.entry(k.into_owned()).or_insert_with(|| v.into_owned());
        }

        let path = if url.path().is_empty() {
            "/".to_string()
        } else {
            url.path().to_string()
        };

        Ok(Address {
            scheme: url.scheme().to_string(),
            authority,
            path,
            query,
            fragment: url.fragment().map(|f| f.to_string()),
        })
    }

    fn parse_local(scheme: &str, rest: &str, original: &str) -> Result<Address, AddressError> {
        // rest = "<name>[/<id-path>][?query][#fragment]"
        let (before_fragment, fragment) = match rest.split_once('#') {
            Some((b, f)) => (b, Some(f.to_string())),
            None => (rest, None),
        };
        let (before_query, query_str) = match before_fragment.split_once('?') {
            Some((b, q)) => (b, Some(q)),
            None => (before_fragment, None),
        };

        let name = before_query.split('/').next().unwrap_or("");
        if name.is_empty() {
            return Err(AddressError::Malformed(original.to_string()));
        }

        let mut query = IndexMap::new();
        if let Some(qs) = query_str {
            for pair in qs.split('&').filter(|p| !p.is_empty()) {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                let k = percent_encoding::percent_decode_str(k)
                    .decode_utf8_lossy()
                    .into_owned();
                let v = percent_encoding::percent_decode_str(v)
                    .decode_utf8_lossy()
                    .into_owned();
                query.entry(k).or_insert(v);
            }
        }

        Ok(Address {
            scheme: scheme.to_string(),
            authority: String::new(),
            path: format!("/{name}"),
            query,
            fragment,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)?;
        if !self.query.is_empty() {
            write!(f, "?")?;
            for (i, (k, v)) in self.query.iter().enumerate() {
                if i > 0 {
                    write!(f, "&")?;
                }
                write!(
                    f,
                    "{}={}",
                    utf8_percent_encode(k, QUERY_ENCODE_SET),
                    utf8_percent_encode(v, QUERY_ENCODE_SET)
                )?;
            }
        }
        if let Some(frag) = &self.fragment {
            write!(f, "#{frag}")?;
        }
        Ok(())
    }
}

/// Fluent constructor for `Address`, grounded on the same builder pattern the
/// teacher uses for schema-less config structs (`ApiIngressConfig`-style
/// setters) — here expressed as a consuming builder since every field is
/// fixed at construction time.
#[derive(Debug, Clone)]
pub struct AddressBuilder {
    scheme: String,
    host: Option<String>,
    port: Option<u16>,
    authority: Option<String>,
    path: String,
    query: IndexMap<String, String>,
    fragment: Option<String>,
}

impl AddressBuilder {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: None,
            port: None,
            authority: None,
            path: "/".to_string(),
            query: IndexMap::new(),
            fragment: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the authority explicitly, overriding any `host`/`port` composition
    /// in `build()`.
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Composes authority from `host`+`port` only when an explicit authority
    /// wasn't set — an explicit `authority()` call always wins.
    pub fn build(self) -> Address {
        let authority = self.authority.unwrap_or_else(|| match (self.host, self.port) {
            (Some(h), Some(p)) => format!("{h}:{p}"),
            (Some(h), None) => h,
            (None, _) => String::new(),
        });

        Address {
            scheme: self.scheme,
            authority,
            path: self.path,
            query: self.query,
            fragment: self.fragment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_address_normalizes_authority_into_path() {
        let a = Address::parse("local://add").unwrap();
        assert_eq!(a.path(), "/add");
        assert_eq!(a.authority(), "");
        assert!(a.is_local());

        let b = Address::parse("local://add/123?id=7#frag").unwrap();
        assert_eq!(b.path(), "/add");
        assert_eq!(b.query_get("id"), Some("7"));
        assert_eq!(b.fragment(), Some("frag"));
    }

    #[test]
    fn http_address_parses_authority_and_query() {
        let a = Address::parse("http://localhost:8080/functions/add?x=1&y=2").unwrap();
        assert_eq!(a.authority(), "localhost:8080");
        assert_eq!(a.path(), "/functions/add");
        assert_eq!(a.query_get("x"), Some("1"));
        assert_eq!(a.query_get("y"), Some("2"));
        assert!(a.is_network());
        assert!(!a.is_local());
    }

    #[test]
    fn first_query_value_wins_on_duplicate_keys() {
        let a = Address::parse("http://h/p?k=1&k=2").unwrap();
        assert_eq!(a.query_get("k"), Some("1"));
    }

    #[test]
    fn builder_round_trips_through_string_and_parse() {
        let built = AddressBuilder::new("http")
            .host("localhost")
            .port(8080)
            .path("/functions/add")
            .query("id", "1")
            .build();

        let s = built.to_string();
        let reparsed = Address::parse(&s).unwrap();
        assert_eq!(built, reparsed);
    }

    #[test]
    fn builder_prefers_explicit_authority_over_host_port() {
        let built = AddressBuilder::new("http")
            .host("ignored")
            .port(1)
            .authority("explicit:9999")
            .build();
        assert_eq!(built.authority(), "explicit:9999");
    }

    #[test]
    fn unknown_scheme_defaults_to_network() {
        let a = Address::parse("customscheme://host/path").unwrap();
        assert!(a.is_network());
    }

    #[test]
    fn malformed_address_is_rejected() {
        assert!(Address::parse("not-an-address").is_err());
        assert!(Address::parse("local://").is_err());
    }
}
