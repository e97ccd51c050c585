//! Unix timestamps with second precision.

use serde::{Deserialize, Serialize};
use std::fmt;
use web_time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.
///
/// UCAN `exp` and `nbf` fields carry whole seconds, so no sub-second
/// precision is kept.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from seconds since the Unix epoch.
    #[must_use]
    pub const fn from_unix(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub const fn to_unix(self) -> u64 {
        self.0
    }

    /// The current time, truncated to whole seconds.
    ///
    /// Works on `wasm32-unknown-unknown` as well as native targets.
    #[must_use]
    pub fn now() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        Self(seconds)
    }

    /// Adds `seconds`, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, seconds: u64) -> Option<Self> {
        match self.0.checked_add(seconds) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl From<u64> for Timestamp {
    fn from(seconds: u64) -> Self {
        Self(seconds)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
