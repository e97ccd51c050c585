//! Resolving the capabilities a chained UCAN actually holds.
//!
//! [`capabilities`] walks the proof DAG of a [`Chained`] token and, for every
//! capability the token claims, pairs it with the capabilities its proofs
//! resolve to. Each pairing yields a delegated capability, an escalation, or
//! nothing; claims no proof speaks to are reported as self-rooted at the
//! claiming token.
//!
//! The resulting sequence is lazy. Proofs are only resolved as far as the
//! consumer iterates, so [`can_delegate`] and [`has_capability`] stop at the
//! first match without touching the rest of the chain.

use crate::{
    capability::{
        CapabilityInfo, CapabilityResult, CapabilitySemantics, CapabilityWithInfo,
        DelegationOutcome,
    },
    chained::{Chained, ProofFold},
    ucan::Ucan,
};
use std::{fmt, vec};
use tracing::{debug, trace};

/// Lazy sequence of resolved capabilities, as produced by [`capabilities`].
///
/// Ordered by attenuation, then by proof within each attenuation, with a
/// self-rooted result last when no proof addressed the attenuation. Identical
/// results are not deduplicated.
pub struct Capabilities<'a, A>(Box<dyn Iterator<Item = CapabilityResult<A>> + 'a>);

impl<A> Iterator for Capabilities<'_, A> {
    type Item = CapabilityResult<A>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<A> fmt::Debug for Capabilities<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

/// Resolves every capability `chained` claims against its proofs.
///
/// Calling this again starts over from scratch.
pub fn capabilities<'a, S, A>(chained: &'a Chained, semantics: &'a S) -> Capabilities<'a, A>
where
    S: CapabilitySemantics<A>,
    A: 'a,
{
    chained.fold(move |ucan, proofs| resolve(semantics, ucan, proofs))
}

/// Returns `true` if some non-escalated capability of `chained` can be
/// delegated to `capability`.
pub fn can_delegate<S, A>(semantics: &S, capability: &A, chained: &Chained) -> bool
where
    S: CapabilitySemantics<A>,
{
    capabilities(chained, semantics)
        .filter_map(CapabilityResult::into_capability)
        .any(|candidate| {
            matches!(
                semantics.try_delegating(&candidate.capability, capability),
                DelegationOutcome::Granted(_)
            )
        })
}

/// Looks for a capability of `chained` that satisfies `requested`.
///
/// A candidate satisfies the request when it delegates to the requested
/// capability, is rooted at the same originator, lasts at least as long as
/// requested and, if it has a `not_before`, starts no later than the
/// requested `not_before`. A candidate with a `not_before` never satisfies a
/// request without one.
///
/// The first candidate that passes wins. The returned info is the requested
/// info merged with the candidate's.
pub fn has_capability<S, A>(
    semantics: &S,
    requested: &CapabilityWithInfo<A>,
    chained: &Chained,
) -> Option<CapabilityWithInfo<A>>
where
    S: CapabilitySemantics<A>,
{
    capabilities(chained, semantics)
        .filter_map(CapabilityResult::into_capability)
        .find_map(|candidate| {
            let delegated = semantics
                .try_delegating(&candidate.capability, &requested.capability)
                .granted()?;

            if candidate.info.originator != requested.info.originator {
                trace!(
                    originator = %candidate.info.originator,
                    requested = %requested.info.originator,
                    "Skipping candidate rooted elsewhere"
                );
                return None;
            }

            if candidate.info.expires_at < requested.info.expires_at {
                trace!(expires_at = %candidate.info.expires_at, "Skipping candidate that expires too soon");
                return None;
            }

            if let Some(not_before) = candidate.info.not_before {
                if requested.info.not_before.is_none_or(|requested| not_before > requested) {
                    trace!(%not_before, "Skipping candidate that starts too late");
                    return None;
                }
            }

            Some(CapabilityWithInfo::new(
                requested.info.merge(&candidate.info),
                delegated,
            ))
        })
}

/// One level of the fold: the claims of `ucan` matched against its proofs.
fn resolve<'a, S, A>(
    semantics: &'a S,
    ucan: &'a Ucan,
    proofs: Vec<ProofFold<'a, Capabilities<'a, A>>>,
) -> Capabilities<'a, A>
where
    S: CapabilitySemantics<A>,
    A: 'a,
{
    let info = CapabilityInfo::from(ucan);

    let claimed = ucan.attenuations().iter().filter_map(move |raw| {
        let parsed = semantics.try_parsing(raw);
        if parsed.is_none() {
            trace!(issuer = %ucan.issuer(), "Dropping unrecognized capability");
        }
        parsed
    });

    let resolved = claimed.flat_map(move |capability| Delegations {
        semantics,
        child: Some(CapabilityWithInfo::new(info.clone(), capability)),
        proofs: proofs.clone().into_iter(),
        current: None,
        addressed: false,
    });

    Capabilities(Box::new(resolved))
}

/// Matches a single claimed capability against every proof, in order.
struct Delegations<'a, S, A> {
    semantics: &'a S,
    /// Taken once the proofs are exhausted.
    child: Option<CapabilityWithInfo<A>>,
    proofs: vec::IntoIter<ProofFold<'a, Capabilities<'a, A>>>,
    current: Option<Capabilities<'a, A>>,
    /// Set once any proof delegated or escalated the child.
    addressed: bool,
}

impl<S, A> Iterator for Delegations<'_, S, A>
where
    S: CapabilitySemantics<A>,
{
    type Item = CapabilityResult<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let child = self.child.as_ref()?;

        loop {
            if let Some(parents) = self.current.as_mut() {
                match parents.next() {
                    Some(CapabilityResult::Escalation(escalation)) => {
                        return Some(escalation.into());
                    }
                    Some(CapabilityResult::Capability(parent)) => {
                        match self
                            .semantics
                            .try_delegating(&parent.capability, &child.capability)
                        {
                            DelegationOutcome::Unrelated => continue,
                            DelegationOutcome::Escalation(escalation) => {
                                debug!(
                                    originator = %parent.info.originator,
                                    reason = %escalation.escalation,
                                    "Capability escalates its proof"
                                );
                                self.addressed = true;
                                return Some(escalation.into());
                            }
                            DelegationOutcome::Granted(capability) => {
                                self.addressed = true;
                                return Some(
                                    CapabilityWithInfo::new(
                                        child.info.merge(&parent.info),
                                        capability,
                                    )
                                    .into(),
                                );
                            }
                        }
                    }
                    None => self.current = None,
                }
            }

            match self.proofs.next() {
                Some(proof) => self.current = Some(proof.force()),
                None => {
                    let child = self.child.take()?;
                    if self.addressed {
                        return None;
                    }
                    trace!(originator = %child.info.originator, "Capability is self-rooted");
                    return Some(child.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capability::Capability,
        did::Did,
        helpers::test_did as did,
        semantics::email::{EmailCapability, EmailSemantics},
        time::Timestamp,
    };
    use pretty_assertions::assert_eq;
    use std::{cell::Cell, sync::Arc};
    use testresult::TestResult;

    fn email(
        issuer: &str,
        audience: &str,
        address: &str,
        proofs: &[&Arc<Chained>],
    ) -> TestResult<Arc<Chained>> {
        let mut builder = Ucan::builder()
            .issuer(did(issuer))
            .audience(did(audience))
            .expires_at(Timestamp::from_unix(1000))
            .claim_capability(EmailCapability::send(address));
        for proof in proofs {
            builder = builder.witnessed_by(Arc::clone(proof));
        }
        Ok(Arc::new(builder.build()?))
    }

    /// Counts how often capabilities are parsed, to observe laziness.
    struct Counting<'c> {
        parsed: &'c Cell<usize>,
    }

    impl CapabilitySemantics<EmailCapability> for Counting<'_> {
        fn try_parsing(&self, capability: &Capability) -> Option<EmailCapability> {
            self.parsed.set(self.parsed.get() + 1);
            EmailSemantics.try_parsing(capability)
        }

        fn try_delegating(
            &self,
            parent: &EmailCapability,
            child: &EmailCapability,
        ) -> DelegationOutcome<EmailCapability> {
            EmailSemantics.try_delegating(parent, child)
        }
    }

    #[test]
    fn it_drops_capabilities_the_semantics_does_not_recognize() -> TestResult {
        let chained = Ucan::builder()
            .issuer(did("Alice"))
            .audience(did("Bob"))
            .expires_at(Timestamp::from_unix(1000))
            .claim_capability(Capability::new().with_str("wnfs", "alice/public/photos"))
            .claim_capability(EmailCapability::send("alice@example.com"))
            .build()?;

        let results: Vec<_> = capabilities(&chained, &EmailSemantics).collect();
        assert_eq!(results.len(), 1);
        Ok(())
    }

    #[test]
    fn it_delegates_through_matching_proofs() -> TestResult {
        let root = email("Alice", "Bob", "alice@example.com", &[])?;
        let leaf = email("Bob", "Carol", "alice@example.com", &[&root])?;

        let results: Vec<_> = capabilities(&leaf, &EmailSemantics).collect();
        assert_eq!(
            results,
            vec![CapabilityResult::Capability(CapabilityWithInfo::new(
                CapabilityInfo::new(did("Alice"), Timestamp::from_unix(1000), None),
                EmailCapability {
                    email: "alice@example.com".into()
                },
            ))]
        );
        Ok(())
    }

    #[test]
    fn it_yields_one_result_per_matching_proof() -> TestResult {
        let first = email("Alice", "Bob", "alice@example.com", &[])?;
        let second = email("Carol", "Bob", "alice@example.com", &[])?;
        let leaf = email("Bob", "Dave", "alice@example.com", &[&first, &second])?;

        let originators: Vec<Did> = capabilities(&leaf, &EmailSemantics)
            .filter_map(CapabilityResult::into_capability)
            .map(|capability| capability.info.originator)
            .collect();

        assert_eq!(originators, vec![did("Alice"), did("Carol")]);
        Ok(())
    }

    #[test]
    fn it_restarts_from_scratch() -> TestResult {
        let root = email("Alice", "Bob", "alice@example.com", &[])?;
        let leaf = email("Bob", "Carol", "alice@example.com", &[&root])?;

        let first: Vec<_> = capabilities(&leaf, &EmailSemantics).collect();
        let second: Vec<_> = capabilities(&leaf, &EmailSemantics).collect();
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn it_resolves_nothing_until_iterated() -> TestResult {
        let root = email("Alice", "Bob", "alice@example.com", &[])?;
        let leaf = email("Bob", "Carol", "bob@example.com", &[&root])?;

        let parsed = Cell::new(0);
        let semantics = Counting { parsed: &parsed };

        let mut results = capabilities(&leaf, &semantics);
        assert_eq!(parsed.get(), 0);

        results.next();
        assert_eq!(parsed.get(), 2);
        Ok(())
    }

    #[test]
    fn it_stops_at_the_first_delegable_capability() -> TestResult {
        let first = email("Alice", "Bob", "alice@example.com", &[])?;
        let second = email("Carol", "Bob", "alice@example.com", &[])?;
        let leaf = email("Bob", "Dave", "alice@example.com", &[&first, &second])?;

        let parsed = Cell::new(0);
        let semantics = Counting { parsed: &parsed };

        assert!(can_delegate(
            &semantics,
            &EmailCapability::send("alice@example.com"),
            &leaf
        ));
        // The leaf and the first proof, never the second.
        assert_eq!(parsed.get(), 2);
        Ok(())
    }
}
