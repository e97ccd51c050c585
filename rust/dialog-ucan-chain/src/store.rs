//! In-memory index of chained UCANs.

use crate::{
    attenuation::has_capability,
    capability::{CapabilitySemantics, CapabilityWithInfo},
    chained::Chained,
    did::Did,
    error::StoreError,
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, trace};

/// Chained UCANs indexed by the audience they were delegated to.
///
/// Chains for one audience are kept in insertion order, so lookups prefer
/// whatever was added first.
#[derive(Debug, Clone, Default)]
pub struct UcanStore {
    by_audience: HashMap<Did, Vec<Arc<Chained>>>,
}

impl UcanStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chain under its audience. Returns `false` if an identical chain
    /// was already stored.
    pub fn add(&mut self, chained: impl Into<Arc<Chained>>) -> bool {
        let chained = chained.into();
        let audience = chained.ucan().audience().clone();
        let chains = self.by_audience.entry(audience).or_default();

        if chains
            .iter()
            .any(|known| Arc::ptr_eq(known, &chained) || **known == *chained)
        {
            trace!(audience = %chained.ucan().audience(), "Ignoring duplicate UCAN");
            return false;
        }

        chains.push(chained);
        true
    }

    /// Number of stored chains across all audiences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_audience.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Chains delegated to `audience`, in insertion order, that satisfy
    /// `predicate`.
    pub fn find_by_audience<'a, P>(
        &'a self,
        audience: &Did,
        predicate: P,
    ) -> impl Iterator<Item = &'a Arc<Chained>> + use<'a, P>
    where
        P: Fn(&Chained) -> bool + 'a,
    {
        self.by_audience
            .get(audience)
            .into_iter()
            .flatten()
            .filter(move |chained| predicate(chained))
    }

    /// Finds the first chain delegated to `audience` that holds `requested`,
    /// as decided by [`has_capability`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownAudience`] if nothing was delegated to
    /// `audience`, and [`StoreError::CapabilityNotFound`] if nothing that was
    /// holds the capability.
    pub fn find_with_capability<S, A>(
        &self,
        semantics: &S,
        audience: &Did,
        requested: &CapabilityWithInfo<A>,
    ) -> Result<(Arc<Chained>, CapabilityWithInfo<A>), StoreError>
    where
        S: CapabilitySemantics<A>,
    {
        let chains = self
            .by_audience
            .get(audience)
            .ok_or_else(|| StoreError::UnknownAudience(audience.clone()))?;

        for chained in chains {
            if let Some(found) = has_capability(semantics, requested, chained) {
                debug!(%audience, issuer = %chained.ucan().issuer(), "Found capability");
                return Ok((Arc::clone(chained), found));
            }
        }

        Err(StoreError::CapabilityNotFound(audience.clone()))
    }
}

impl<T: Into<Arc<Chained>>> Extend<T> for UcanStore {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for chained in iter {
            self.add(chained);
        }
    }
}

impl<T: Into<Arc<Chained>>> FromIterator<T> for UcanStore {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut store = Self::new();
        store.extend(iter);
        store
    }
}
