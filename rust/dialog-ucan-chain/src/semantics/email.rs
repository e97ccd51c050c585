use crate::capability::{Capability, CapabilitySemantics, DelegationOutcome};
use ipld_core::ipld::Ipld;

const SEND: &str = "SEND";

/// Permission to send mail from `email`.
///
/// Encoded as `{ "email": <address>, "cap": "SEND" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailCapability {
    /// The sending address.
    pub email: String,
}

impl EmailCapability {
    /// Permission to send from `email`.
    pub fn send(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl From<EmailCapability> for Capability {
    fn from(capability: EmailCapability) -> Self {
        Capability::new()
            .with("email", Ipld::String(capability.email))
            .with_str("cap", SEND)
    }
}

/// Email has a single action, so a capability is only ever delegated to an
/// identical one.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailSemantics;

impl CapabilitySemantics<EmailCapability> for EmailSemantics {
    fn try_parsing(&self, capability: &Capability) -> Option<EmailCapability> {
        if capability.get_str("cap")? != SEND {
            return None;
        }
        capability.get_str("email").map(EmailCapability::send)
    }

    fn try_delegating(
        &self,
        parent: &EmailCapability,
        child: &EmailCapability,
    ) -> DelegationOutcome<EmailCapability> {
        if parent.email == child.email {
            DelegationOutcome::Granted(child.clone())
        } else {
            DelegationOutcome::Unrelated
        }
    }
}
