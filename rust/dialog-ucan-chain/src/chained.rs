//! A verified UCAN bundled with its verified proofs.

use crate::{
    attenuation::{self, Capabilities},
    capability::{CapabilitySemantics, CapabilityWithInfo},
    error::ChainError,
    ucan::Ucan,
};
use std::{fmt, rc::Rc, sync::Arc};

/// A verified [`Ucan`] together with the verified proofs it cites.
///
/// Proofs are themselves `Chained`, so a value forms a DAG rooted at the
/// token: a proof shared by several tokens is held once behind an [`Arc`].
/// Building a `Chained` does not verify anything; callers bundle tokens whose
/// signatures have already been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Chained {
    ucan: Ucan,
    proofs: Vec<Arc<Chained>>,
}

/// Reducer applied at every level of a [`Chained::fold`].
type Reducer<'a, T> = dyn Fn(&'a Ucan, Vec<ProofFold<'a, T>>) -> T + 'a;

impl Chained {
    /// Bundles a verified token with its verified proofs, in citation order.
    #[must_use]
    pub fn new(ucan: Ucan, proofs: Vec<Arc<Chained>>) -> Self {
        Self { ucan, proofs }
    }

    /// The token at the root of this chain.
    #[must_use]
    pub const fn ucan(&self) -> &Ucan {
        &self.ucan
    }

    /// The proofs the root token cites, in citation order.
    #[must_use]
    pub fn proofs(&self) -> &[Arc<Chained>] {
        &self.proofs
    }

    /// Folds the proof DAG bottom-up.
    ///
    /// `reduce` receives the token at the current level and one [`ProofFold`]
    /// per proof, in citation order. Forcing a `ProofFold` runs the same fold
    /// over that proof, so each level can express its result in terms of the
    /// already-reduced results of its proofs, and proofs whose results are
    /// never needed are never reduced. A token without proofs is reduced with
    /// an empty list.
    ///
    /// Nothing is memoized: a proof reachable along several paths is reduced
    /// once for every path that forces it.
    pub fn fold<'a, T, F>(&'a self, reduce: F) -> T
    where
        F: Fn(&'a Ucan, Vec<ProofFold<'a, T>>) -> T + 'a,
    {
        self.fold_with(Rc::new(reduce))
    }

    fn fold_with<'a, T>(&'a self, reduce: Rc<Reducer<'a, T>>) -> T {
        let proofs = self
            .proofs
            .iter()
            .map(|proof| ProofFold {
                chained: proof,
                reduce: Rc::clone(&reduce),
            })
            .collect();

        reduce(&self.ucan, proofs)
    }

    /// See [`attenuation::capabilities`].
    pub fn capabilities<'a, S, A>(&'a self, semantics: &'a S) -> Capabilities<'a, A>
    where
        S: CapabilitySemantics<A>,
        A: 'a,
    {
        attenuation::capabilities(self, semantics)
    }

    /// See [`attenuation::can_delegate`].
    pub fn can_delegate<S, A>(&self, semantics: &S, capability: &A) -> bool
    where
        S: CapabilitySemantics<A>,
    {
        attenuation::can_delegate(semantics, capability, self)
    }

    /// See [`attenuation::has_capability`].
    pub fn has_capability<S, A>(
        &self,
        semantics: &S,
        requested: &CapabilityWithInfo<A>,
    ) -> Option<CapabilityWithInfo<A>>
    where
        S: CapabilitySemantics<A>,
    {
        attenuation::has_capability(semantics, requested, self)
    }

    /// Checks that every proof was delegated to the issuer of the token that
    /// cites it, all the way down the DAG.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::AudienceMismatch`] for the first proof, in
    /// depth-first citation order, whose audience is not the citing issuer.
    pub fn check_linkage(&self) -> Result<(), ChainError> {
        for proof in &self.proofs {
            if proof.ucan.audience() != self.ucan.issuer() {
                return Err(ChainError::AudienceMismatch {
                    audience: proof.ucan.audience().clone(),
                    issuer: self.ucan.issuer().clone(),
                });
            }
            proof.check_linkage()?;
        }
        Ok(())
    }
}

impl From<Ucan> for Chained {
    fn from(ucan: Ucan) -> Self {
        Self::new(ucan, Vec::new())
    }
}

/// A deferred fold over one proof of a [`Chained`] value.
pub struct ProofFold<'a, T> {
    chained: &'a Chained,
    reduce: Rc<Reducer<'a, T>>,
}

impl<'a, T> ProofFold<'a, T> {
    /// The proof this fold runs over.
    #[must_use]
    pub fn chained(&self) -> &'a Chained {
        self.chained
    }

    /// Runs the fold over the proof. Every call folds again from scratch.
    pub fn force(&self) -> T {
        self.chained.fold_with(Rc::clone(&self.reduce))
    }
}

impl<T> Clone for ProofFold<'_, T> {
    fn clone(&self) -> Self {
        Self {
            chained: self.chained,
            reduce: Rc::clone(&self.reduce),
        }
    }
}

impl<T> fmt::Debug for ProofFold<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofFold")
            .field("issuer", self.chained.ucan.issuer())
            .finish_non_exhaustive()
    }
}
