//! Validity windows.

use super::timestamp::Timestamp;
use std::{
    fmt,
    ops::{Bound, RangeBounds},
};

/// The window in which a token, or a capability resolved through a chain of
/// tokens, is valid.
///
/// `not_before` is the lower bound and `expiration` the upper bound. Both are
/// inclusive when set; [`Bound::Unbounded`] marks an open end. Intersecting
/// the windows of every link in a chain gives the window of the whole chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Earliest time this range is valid.
    pub not_before: Bound<Timestamp>,

    /// Latest time this range is valid.
    pub expiration: Bound<Timestamp>,
}

impl TimeRange {
    /// A range with no constraints.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            not_before: Bound::Unbounded,
            expiration: Bound::Unbounded,
        }
    }

    /// Creates a range from optional inclusive bounds.
    #[must_use]
    pub const fn new(not_before: Option<Timestamp>, expiration: Option<Timestamp>) -> Self {
        Self {
            not_before: match not_before {
                Some(t) => Bound::Included(t),
                None => Bound::Unbounded,
            },
            expiration: match expiration {
                Some(t) => Bound::Included(t),
                None => Bound::Unbounded,
            },
        }
    }

    /// Returns `true` if some instant lies within this range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match (self.not_before, self.expiration) {
            (Bound::Included(nbf), Bound::Included(exp)) => nbf <= exp,
            (Bound::Included(nbf), Bound::Excluded(exp))
            | (Bound::Excluded(nbf), Bound::Included(exp))
            | (Bound::Excluded(nbf), Bound::Excluded(exp)) => nbf < exp,
            _ => true,
        }
    }

    /// Intersects two ranges: the later lower bound and the earlier upper
    /// bound win.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self {
            not_before: later(self.not_before, other.not_before),
            expiration: earlier(self.expiration, other.expiration),
        }
    }
}

/// The tighter of two lower bounds.
fn later(a: Bound<Timestamp>, b: Bound<Timestamp>) -> Bound<Timestamp> {
    match (a, b) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other,
        (Bound::Included(x), Bound::Included(y)) => Bound::Included(x.max(y)),
        (Bound::Excluded(x), Bound::Excluded(y)) => Bound::Excluded(x.max(y)),
        (Bound::Excluded(x), Bound::Included(y)) | (Bound::Included(y), Bound::Excluded(x)) => {
            if x >= y {
                Bound::Excluded(x)
            } else {
                Bound::Included(y)
            }
        }
    }
}

/// The tighter of two upper bounds.
fn earlier(a: Bound<Timestamp>, b: Bound<Timestamp>) -> Bound<Timestamp> {
    match (a, b) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other,
        (Bound::Included(x), Bound::Included(y)) => Bound::Included(x.min(y)),
        (Bound::Excluded(x), Bound::Excluded(y)) => Bound::Excluded(x.min(y)),
        (Bound::Excluded(x), Bound::Included(y)) | (Bound::Included(y), Bound::Excluded(x)) => {
            if x <= y {
                Bound::Excluded(x)
            } else {
                Bound::Included(y)
            }
        }
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RangeBounds<Timestamp> for TimeRange {
    fn start_bound(&self) -> Bound<&Timestamp> {
        self.not_before.as_ref()
    }

    fn end_bound(&self) -> Bound<&Timestamp> {
        self.expiration.as_ref()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.not_before {
            Bound::Included(nbf) | Bound::Excluded(nbf) => write!(f, "{}", nbf.to_unix())?,
            Bound::Unbounded => {}
        }
        write!(f, "..")?;
        match self.expiration {
            Bound::Included(exp) => write!(f, "={}", exp.to_unix()),
            Bound::Excluded(exp) => write!(f, "{}", exp.to_unix()),
            Bound::Unbounded => Ok(()),
        }
    }
}
