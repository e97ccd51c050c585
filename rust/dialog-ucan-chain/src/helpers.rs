//! Fixtures for building chains by hand in tests.

use crate::{did::Did, ucan::builder::UcanBuilder};

/// A readable, syntactically valid DID: `did:key:z6Mk<name>`.
///
/// The identifier is not a real key and does not decode.
#[must_use]
pub fn test_did(name: &str) -> Did {
    Did::from_parts("key", &format!("z6Mk{name}"))
}

/// A builder with issuer and audience set from [`test_did`].
#[must_use]
pub fn test_delegation(issuer: &str, audience: &str) -> UcanBuilder {
    UcanBuilder::new()
        .issuer(test_did(issuer))
        .audience(test_did(audience))
}
