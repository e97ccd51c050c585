//! UCAN payloads.
//!
//! A [`Ucan`] here is the already-verified payload of a token: signatures,
//! encodings and proof references have been dealt with upstream. Proofs are
//! attached by bundling the payload into a [`Chained`](crate::Chained).

pub mod builder;

use crate::{
    capability::Capability,
    did::Did,
    time::{TimeRange, Timestamp},
};
use ipld_core::ipld::Ipld;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The verified payload of a UCAN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ucan {
    #[serde(rename = "iss")]
    pub(crate) issuer: Did,

    #[serde(rename = "aud")]
    pub(crate) audience: Did,

    #[serde(rename = "exp")]
    pub(crate) expires_at: Timestamp,

    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    pub(crate) not_before: Option<Timestamp>,

    #[serde(rename = "att")]
    pub(crate) attenuations: Vec<Capability>,

    #[serde(rename = "fct", default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) facts: Vec<BTreeMap<String, Ipld>>,
}

impl Ucan {
    /// Creates a blank [`UcanBuilder`](builder::UcanBuilder).
    #[must_use]
    pub fn builder() -> builder::UcanBuilder {
        builder::UcanBuilder::new()
    }

    /// Getter for the `issuer` field.
    #[must_use]
    pub const fn issuer(&self) -> &Did {
        &self.issuer
    }

    /// Getter for the `audience` field.
    #[must_use]
    pub const fn audience(&self) -> &Did {
        &self.audience
    }

    /// Getter for the `expires_at` field.
    #[must_use]
    pub const fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Getter for the `not_before` field.
    #[must_use]
    pub const fn not_before(&self) -> Option<Timestamp> {
        self.not_before
    }

    /// The raw capabilities this token claims, in order.
    #[must_use]
    pub fn attenuations(&self) -> &[Capability] {
        &self.attenuations
    }

    /// Getter for the `facts` field.
    #[must_use]
    pub fn facts(&self) -> &[BTreeMap<String, Ipld>] {
        &self.facts
    }

    /// Returns `true` if the token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at < now
    }

    /// Returns `true` if `now` is before the token's `not_before`.
    #[must_use]
    pub fn is_too_early(&self, now: Timestamp) -> bool {
        self.not_before.is_some_and(|nbf| now < nbf)
    }

    /// The token's own validity window.
    #[must_use]
    pub const fn validity(&self) -> TimeRange {
        TimeRange::new(self.not_before, Some(self.expires_at))
    }
}

impl From<&Ucan> for TimeRange {
    fn from(ucan: &Ucan) -> Self {
        ucan.validity()
    }
}
