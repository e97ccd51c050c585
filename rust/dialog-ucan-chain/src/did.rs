//! Decentralized identifiers.

use crate::error::DidParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// A [DID] naming a principal, e.g. `did:key:z6Mk…`.
///
/// Only the generic `did:<method>:<identifier>` shape is checked here.
/// Decoding key material out of a `did:key` lives in
/// [`ed25519::decode`](crate::ed25519::decode).
///
/// [DID]: https://www.w3.org/TR/did-core/
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Did(String);

impl Did {
    /// The DID method, e.g. `key` for `did:key:z6Mk…`.
    #[must_use]
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// Everything after `did:<method>:`.
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.0.splitn(3, ':').nth(2).unwrap_or_default()
    }

    /// Assembles a DID from parts that are already known to be well formed.
    #[cfg(any(test, feature = "ed25519", feature = "helpers"))]
    pub(crate) fn from_parts(method: &str, identifier: &str) -> Self {
        Did(format!("did:{method}:{identifier}"))
    }

    /// The full DID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Did {
    type Err = DidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        if parts.next() != Some("did") {
            return Err(DidParseError::MissingScheme(s.to_string()));
        }

        let method = parts.next().unwrap_or_default();
        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(DidParseError::InvalidMethod(s.to_string()));
        }

        match parts.next() {
            Some(identifier) if !identifier.is_empty() => Ok(Did(s.to_string())),
            _ => Err(DidParseError::EmptyIdentifier(s.to_string())),
        }
    }
}

impl TryFrom<String> for Did {
    type Error = DidParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Did {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_did_key() {
        let did: Did = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
            .parse()
            .unwrap();
        assert_eq!(did.method(), "key");
        assert_eq!(
            did.identifier(),
            "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
        );
    }

    #[test]
    fn it_keeps_colons_in_identifier() {
        let did: Did = "did:web:example.com:user:alice".parse().unwrap();
        assert_eq!(did.method(), "web");
        assert_eq!(did.identifier(), "example.com:user:alice");
    }

    #[test]
    fn it_rejects_missing_scheme() {
        assert_eq!(
            "key:z6Mk".parse::<Did>(),
            Err(DidParseError::MissingScheme("key:z6Mk".into()))
        );
    }

    #[test]
    fn it_rejects_bad_method() {
        assert!(matches!(
            "did:KEY:z6Mk".parse::<Did>(),
            Err(DidParseError::InvalidMethod(_))
        ));
        assert!(matches!(
            "did::z6Mk".parse::<Did>(),
            Err(DidParseError::InvalidMethod(_))
        ));
    }

    #[test]
    fn it_rejects_empty_identifier() {
        assert!(matches!(
            "did:key:".parse::<Did>(),
            Err(DidParseError::EmptyIdentifier(_))
        ));
        assert!(matches!(
            "did:key".parse::<Did>(),
            Err(DidParseError::EmptyIdentifier(_))
        ));
    }

    #[test]
    fn it_round_trips_through_cbor() {
        let did: Did = "did:key:z6MkRoundTrip".parse().unwrap();
        let bytes = serde_ipld_dagcbor::to_vec(&did).unwrap();
        let decoded: Did = serde_ipld_dagcbor::from_slice(&bytes).unwrap();
        assert_eq!(decoded, did);
    }
}
