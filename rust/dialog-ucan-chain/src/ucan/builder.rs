//! Assembling [`Chained`] tokens.

use super::Ucan;
use crate::{
    attenuation::can_delegate,
    capability::{Capability, CapabilitySemantics},
    chained::Chained,
    did::Did,
    error::BuildError,
    time::Timestamp,
};
use ipld_core::ipld::Ipld;
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, Clone, Copy)]
enum Expiration {
    At(Timestamp),
    Lifetime(u64),
}

/// Builder for a [`Ucan`] bundled with its proofs.
///
/// Signing is not part of this crate: the result is the payload a signer
/// would encode, together with the proofs it cites.
#[derive(Debug, Clone, Default)]
pub struct UcanBuilder {
    issuer: Option<Did>,
    audience: Option<Did>,
    expiration: Option<Expiration>,
    not_before: Option<Timestamp>,
    attenuations: Vec<Capability>,
    facts: Vec<BTreeMap<String, Ipld>>,
    proofs: Vec<Arc<Chained>>,
}

impl UcanBuilder {
    /// Creates a blank builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the issuer.
    #[must_use]
    pub fn issuer(mut self, issuer: Did) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Sets the audience.
    #[must_use]
    pub fn audience(mut self, audience: Did) -> Self {
        self.audience = Some(audience);
        self
    }

    /// Sets an absolute expiration.
    #[must_use]
    pub fn expires_at(mut self, expires_at: Timestamp) -> Self {
        self.expiration = Some(Expiration::At(expires_at));
        self
    }

    /// Expires `seconds` after the moment [`build`](Self::build) is called.
    #[must_use]
    pub fn with_lifetime(mut self, seconds: u64) -> Self {
        self.expiration = Some(Expiration::Lifetime(seconds));
        self
    }

    /// Sets the `not_before` bound.
    #[must_use]
    pub fn not_before(mut self, not_before: Timestamp) -> Self {
        self.not_before = Some(not_before);
        self
    }

    /// Adds a fact.
    #[must_use]
    pub fn fact(mut self, fact: BTreeMap<String, Ipld>) -> Self {
        self.facts.push(fact);
        self
    }

    /// Claims a capability without checking that any proof backs it.
    #[must_use]
    pub fn claim_capability(mut self, capability: impl Into<Capability>) -> Self {
        self.attenuations.push(capability.into());
        self
    }

    /// Cites a proof.
    #[must_use]
    pub fn witnessed_by(mut self, proof: impl Into<Arc<Chained>>) -> Self {
        let proof = proof.into();
        if !self.proofs.iter().any(|known| Arc::ptr_eq(known, &proof)) {
            self.proofs.push(proof);
        }
        self
    }

    /// Claims a capability that `proof` is able to delegate, citing the proof.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::CannotDelegate`] if `semantics` does not
    /// recognize the capability or nothing in `proof` grants it.
    pub fn delegate_capability<S, A>(
        self,
        semantics: &S,
        capability: impl Into<Capability>,
        proof: impl Into<Arc<Chained>>,
    ) -> Result<Self, BuildError>
    where
        S: CapabilitySemantics<A>,
    {
        let capability = capability.into();
        let proof = proof.into();

        let delegable = semantics
            .try_parsing(&capability)
            .is_some_and(|parsed| can_delegate(semantics, &parsed, &proof));

        if !delegable {
            return Err(BuildError::CannotDelegate {
                proof_issuer: proof.ucan().issuer().clone(),
            });
        }

        Ok(self.claim_capability(capability).witnessed_by(proof))
    }

    /// Builds the token.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the issuer, audience or expiration is
    /// missing, or a lifetime overflows.
    pub fn build(self) -> Result<Chained, BuildError> {
        let issuer = self.issuer.ok_or(BuildError::MissingIssuer)?;
        let audience = self.audience.ok_or(BuildError::MissingAudience)?;
        let expires_at = match self.expiration.ok_or(BuildError::MissingExpiration)? {
            Expiration::At(timestamp) => timestamp,
            Expiration::Lifetime(seconds) => Timestamp::now()
                .checked_add(seconds)
                .ok_or(BuildError::LifetimeOverflow { seconds })?,
        };

        let ucan = Ucan {
            issuer,
            audience,
            expires_at,
            not_before: self.not_before,
            attenuations: self.attenuations,
            facts: self.facts,
        };

        Ok(Chained::new(ucan, self.proofs))
    }
}
