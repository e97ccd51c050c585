//! Capability resolution over chained UCAN proofs.
//!
//! A [`Ucan`] claims capabilities through its attenuations and backs those
//! claims with proofs, which are UCANs themselves. Once a token and its proofs
//! have been verified they are bundled into a [`Chained`] value, and this crate
//! answers the questions an authorization layer asks of it:
//!
//! - which capabilities does the chain actually grant, and on whose authority
//!   ([`capabilities`])
//! - can the holder delegate a given capability further ([`can_delegate`])
//! - does the chain grant a capability rooted at a specific originator for a
//!   specific validity window ([`has_capability`])
//!
//! What a capability *means* is left to a [`CapabilitySemantics`]
//! implementation for each domain. Semantics decide whether a child capability
//! is covered by a parent ([`DelegationOutcome::Granted`]), has nothing to do
//! with it ([`DelegationOutcome::Unrelated`]), or claims more than the parent
//! grants ([`DelegationOutcome::Escalation`]).
//!
//! # Example
//!
//! ```rust
//! use dialog_ucan_chain::{
//!     Did, Timestamp, Ucan, capabilities,
//!     semantics::email::{EmailCapability, EmailSemantics},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let alice: Did = "did:key:z6MkAlice".parse()?;
//! let bob: Did = "did:key:z6MkBob".parse()?;
//! let mallory: Did = "did:key:z6MkMallory".parse()?;
//!
//! let root = Ucan::builder()
//!     .issuer(alice.clone())
//!     .audience(bob.clone())
//!     .expires_at(Timestamp::from_unix(1_000))
//!     .claim_capability(EmailCapability::send("alice@example.com"))
//!     .build()?;
//!
//! let leaf = Ucan::builder()
//!     .issuer(bob)
//!     .audience(mallory)
//!     .expires_at(Timestamp::from_unix(500))
//!     .claim_capability(EmailCapability::send("alice@example.com"))
//!     .witnessed_by(root)
//!     .build()?;
//!
//! let granted: Vec<_> = capabilities(&leaf, &EmailSemantics).collect();
//! assert_eq!(granted.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod attenuation;
pub mod capability;
pub mod chained;
pub mod did;
pub mod error;
pub mod semantics;
pub mod store;
pub mod time;
pub mod ucan;

#[cfg(feature = "ed25519")]
pub mod ed25519;

#[cfg(any(test, feature = "helpers"))]
pub mod helpers;

pub use attenuation::{Capabilities, can_delegate, capabilities, has_capability};
pub use capability::{
    Capability, CapabilityEscalation, CapabilityInfo, CapabilityResult, CapabilitySemantics,
    CapabilityWithInfo, DelegationOutcome,
};
pub use chained::{Chained, ProofFold};
pub use did::Did;
pub use error::{BuildError, ChainError, DidParseError, StoreError};
pub use store::UcanStore;
pub use time::{TimeRange, Timestamp};
pub use ucan::{Ucan, builder::UcanBuilder};
