//! Capabilities and the per-domain semantics that interpret them.
//!
//! A UCAN carries capabilities as untyped attribute maps ([`Capability`]).
//! A [`CapabilitySemantics`] implementation turns the ones it recognizes into
//! a typed representation and decides, for any two of them, whether one can
//! be delegated from the other.

mod info;
pub use info::*;

use ipld_core::ipld::Ipld;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw capability as it appears in a UCAN's attenuations.
///
/// The map is opaque to the resolution algorithm; only a
/// [`CapabilitySemantics`] implementation gives it meaning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(BTreeMap<String, Ipld>);

impl Capability {
    /// Creates an empty capability.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, replacing any previous value under `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Ipld) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Adds a string attribute.
    #[must_use]
    pub fn with_str(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(key, Ipld::String(value.into()))
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Ipld> {
        self.0.get(key)
    }

    /// Looks up an attribute that must be a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Ipld::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Iterates over the attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Ipld)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, Ipld>> for Capability {
    fn from(attributes: BTreeMap<String, Ipld>) -> Self {
        Self(attributes)
    }
}

impl<K: Into<String>> FromIterator<(K, Ipld)> for Capability {
    fn from_iter<T: IntoIterator<Item = (K, Ipld)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Rights overreach: a child capability that is related to a parent but
/// claims more than the parent grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityEscalation<A> {
    /// Human-readable reason, supplied by the semantics.
    pub escalation: String,
    /// The offending child capability.
    pub capability: A,
}

impl<A> CapabilityEscalation<A> {
    /// Creates an escalation for `capability`.
    pub fn new(escalation: impl Into<String>, capability: A) -> Self {
        Self {
            escalation: escalation.into(),
            capability,
        }
    }
}

/// Result of asking whether a child capability can be delegated from a
/// parent capability.
///
/// `Unrelated` means "look elsewhere". `Escalation` flags a claim that
/// overreaches its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegationOutcome<A> {
    /// The child is covered by the parent. Carries the effective capability,
    /// usually the child itself or something narrower.
    Granted(A),
    /// Parent and child are incomparable in this domain.
    Unrelated,
    /// Parent and child are related but the child claims more.
    Escalation(CapabilityEscalation<A>),
}

impl<A> DelegationOutcome<A> {
    /// Shorthand for an [`Escalation`](Self::Escalation) outcome.
    pub fn escalation(reason: impl Into<String>, capability: A) -> Self {
        Self::Escalation(CapabilityEscalation::new(reason, capability))
    }

    /// The granted capability, if any.
    pub fn granted(self) -> Option<A> {
        match self {
            Self::Granted(capability) => Some(capability),
            Self::Unrelated | Self::Escalation(_) => None,
        }
    }
}

/// Capability semantics for one domain.
///
/// Both operations must be total and free of side effects. A record the
/// domain does not recognize parses to `None`; a pair of capabilities the
/// domain cannot compare delegates to [`DelegationOutcome::Unrelated`].
pub trait CapabilitySemantics<A> {
    /// Interprets a raw capability, or returns `None` if it belongs to some
    /// other domain or is malformed.
    fn try_parsing(&self, capability: &Capability) -> Option<A>;

    /// Decides whether `child` can be delegated from `parent`.
    fn try_delegating(&self, parent: &A, child: &A) -> DelegationOutcome<A>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_string_attributes() {
        let capability = Capability::new()
            .with_str("email", "alice@example.com")
            .with("count", Ipld::Integer(3));

        assert_eq!(capability.get_str("email"), Some("alice@example.com"));
        assert_eq!(capability.get_str("count"), None);
        assert_eq!(capability.get("count"), Some(&Ipld::Integer(3)));
        assert_eq!(capability.get("missing"), None);
    }

    #[test]
    fn it_serializes_as_a_plain_map() {
        let capability = Capability::new().with_str("cap", "SEND");
        let bytes = serde_ipld_dagcbor::to_vec(&capability).unwrap();
        let map: BTreeMap<String, Ipld> = serde_ipld_dagcbor::from_slice(&bytes).unwrap();
        assert_eq!(map.get("cap"), Some(&Ipld::String("SEND".into())));
    }

    #[test]
    fn it_only_reports_granted_capabilities() {
        assert_eq!(DelegationOutcome::Granted(1).granted(), Some(1));
        assert_eq!(DelegationOutcome::<u8>::Unrelated.granted(), None);
        assert_eq!(DelegationOutcome::escalation("too much", 2).granted(), None);
    }
}
