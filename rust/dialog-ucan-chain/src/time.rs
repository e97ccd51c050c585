//! Time utilities.
//!
//! [`Timestamp`] is the unit every validity window in a UCAN chain is
//! expressed in; [`TimeRange`] is the window itself.

pub mod range;
pub mod timestamp;

pub use range::*;
pub use timestamp::*;
