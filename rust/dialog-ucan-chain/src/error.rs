//! Error types for the code surrounding capability resolution.
//!
//! Resolution itself never fails: rights escalation is reported as a
//! [`CapabilityResult::Escalation`](crate::CapabilityResult::Escalation)
//! value. The errors here cover parsing identities, assembling tokens and
//! chains, and looking chains up in a [`UcanStore`](crate::UcanStore).

use crate::did::Did;
use thiserror::Error;

/// Errors produced when parsing a [`Did`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DidParseError {
    /// The string does not start with the `did:` scheme.
    #[error("Invalid DID '{0}': missing 'did:' scheme")]
    MissingScheme(String),

    /// The method segment is empty or contains characters outside `[a-z0-9]`.
    #[error("Invalid DID '{0}': method must be lowercase alphanumeric")]
    InvalidMethod(String),

    /// The method-specific identifier is empty.
    #[error("Invalid DID '{0}': empty method-specific identifier")]
    EmptyIdentifier(String),
}

/// Errors produced by [`UcanBuilder::build`](crate::UcanBuilder::build).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No issuer was set.
    #[error("UCAN is missing an issuer")]
    MissingIssuer,

    /// No audience was set.
    #[error("UCAN is missing an audience")]
    MissingAudience,

    /// No expiration was set, neither directly nor as a lifetime.
    #[error("UCAN is missing an expiration")]
    MissingExpiration,

    /// The lifetime added to the start time overflows a [`Timestamp`](crate::Timestamp).
    #[error("Lifetime of {seconds}s overflows the expiration timestamp")]
    LifetimeOverflow {
        /// Requested lifetime in seconds.
        seconds: u64,
    },

    /// A capability was requested from a proof that cannot delegate it.
    #[error("Proof issued by '{proof_issuer}' cannot delegate the requested capability")]
    CannotDelegate {
        /// Issuer of the proof that was asked to back the capability.
        proof_issuer: Did,
    },
}

/// Errors produced by [`Chained::check_linkage`](crate::Chained::check_linkage).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A proof was delegated to someone other than the issuer it witnesses.
    #[error("Proof audience '{audience}' does not match witnessed issuer '{issuer}'")]
    AudienceMismatch {
        /// The audience of the proof.
        audience: Did,
        /// The issuer of the token that cites the proof.
        issuer: Did,
    },
}

/// Errors produced by [`UcanStore`](crate::UcanStore) lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Nothing has been delegated to the audience.
    #[error("No UCANs stored for audience '{0}'")]
    UnknownAudience(Did),

    /// UCANs exist for the audience but none grant the requested capability.
    #[error("No stored UCAN grants the requested capability to '{0}'")]
    CapabilityNotFound(Did),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_renders_audience_mismatch() {
        let err = ChainError::AudienceMismatch {
            audience: "did:key:z6MkAudience".parse().unwrap(),
            issuer: "did:key:z6MkIssuer".parse().unwrap(),
        };
        assert!(err.to_string().contains("did:key:z6MkAudience"));
        assert!(err.to_string().contains("did:key:z6MkIssuer"));
    }

    #[test]
    fn it_renders_lifetime_overflow() {
        let err = BuildError::LifetimeOverflow { seconds: 42 };
        assert_eq!(
            err.to_string(),
            "Lifetime of 42s overflows the expiration timestamp"
        );
    }
}
