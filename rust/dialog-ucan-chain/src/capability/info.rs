use super::CapabilityEscalation;
use crate::{
    did::Did,
    time::{TimeRange, Timestamp},
    ucan::Ucan,
};

/// On whose authority, and during which window, a capability holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityInfo {
    /// The principal the capability is ultimately rooted at.
    pub originator: Did,
    /// Last second the capability is valid.
    pub expires_at: Timestamp,
    /// First second the capability is valid, if bounded.
    pub not_before: Option<Timestamp>,
}

impl CapabilityInfo {
    /// Creates capability info.
    #[must_use]
    pub const fn new(originator: Did, expires_at: Timestamp, not_before: Option<Timestamp>) -> Self {
        Self {
            originator,
            expires_at,
            not_before,
        }
    }

    /// Combines the info of a delegated (`self`) capability with the info of
    /// the `parent` it was delegated from.
    ///
    /// The originator is always taken from the parent and the window can
    /// only shrink: the earlier expiration and the later `not_before` win.
    #[must_use]
    pub fn merge(&self, parent: &CapabilityInfo) -> CapabilityInfo {
        let not_before = match (self.not_before, parent.not_before) {
            (Some(child), Some(parent)) => Some(child.max(parent)),
            (child, parent) => parent.or(child),
        };

        CapabilityInfo {
            originator: parent.originator.clone(),
            expires_at: self.expires_at.min(parent.expires_at),
            not_before,
        }
    }

    /// The validity window as a [`TimeRange`].
    #[must_use]
    pub const fn validity(&self) -> TimeRange {
        TimeRange::new(self.not_before, Some(self.expires_at))
    }
}

/// A capability that is self-rooted at a token's issuer.
impl From<&Ucan> for CapabilityInfo {
    fn from(ucan: &Ucan) -> Self {
        Self {
            originator: ucan.issuer().clone(),
            expires_at: ucan.expires_at(),
            not_before: ucan.not_before(),
        }
    }
}

/// A resolved capability together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityWithInfo<A> {
    /// Originator and validity window.
    pub info: CapabilityInfo,
    /// The capability itself.
    pub capability: A,
}

impl<A> CapabilityWithInfo<A> {
    /// Pairs a capability with its info.
    pub const fn new(info: CapabilityInfo, capability: A) -> Self {
        Self { info, capability }
    }
}

/// One element of a resolved capability sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityResult<A> {
    /// A capability backed by the chain, or self-rooted at a token.
    Capability(CapabilityWithInfo<A>),
    /// A claim that overreaches the proof it was matched against.
    Escalation(CapabilityEscalation<A>),
}

impl<A> CapabilityResult<A> {
    /// Returns `true` for [`CapabilityResult::Escalation`].
    pub const fn is_escalation(&self) -> bool {
        matches!(self, Self::Escalation(_))
    }

    /// The resolved capability, unless this is an escalation.
    pub fn into_capability(self) -> Option<CapabilityWithInfo<A>> {
        match self {
            Self::Capability(capability) => Some(capability),
            Self::Escalation(_) => None,
        }
    }
}

impl<A> From<CapabilityWithInfo<A>> for CapabilityResult<A> {
    fn from(capability: CapabilityWithInfo<A>) -> Self {
        Self::Capability(capability)
    }
}

impl<A> From<CapabilityEscalation<A>> for CapabilityResult<A> {
    fn from(escalation: CapabilityEscalation<A>) -> Self {
        Self::Escalation(escalation)
    }
}
