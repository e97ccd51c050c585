//! Ed25519 `did:key` identities.
//!
//! Resolution only needs principals to compare as [`Did`] values. This module
//! produces those values from real key material, and checks signatures
//! against them, for callers that verify tokens before chaining them.

use crate::did::Did;
use base58::{FromBase58, ToBase58};
use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use signature::{Signer as _, Verifier as _};
use std::fmt;
use thiserror::Error;

const DID_KEY_METHOD: &str = "key";
const BASE58_PREFIX: char = 'z';
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];
const P256_MULTICODEC: [u8; 2] = [0x80, 0x24];

/// Key algorithms recognized in a `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// Edwards-curve 25519.
    Ed25519,
    /// NIST P-256. Recognized, but not verifiable here.
    P256,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ed25519 => f.write_str("ed25519"),
            Self::P256 => f.write_str("p256"),
        }
    }
}

/// The public key a `did:key` encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDid {
    /// Raw public key bytes, without the multicodec prefix.
    pub public_key: Vec<u8>,
    /// Algorithm named by the multicodec prefix.
    pub algorithm: KeyAlgorithm,
}

/// Errors from Ed25519 key and `did:key` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ed25519KeyError {
    /// The seed bytes have the wrong length (expected 32).
    #[error("expected 32 seed bytes, got {0}")]
    InvalidSeedLength(usize),

    /// Random number generation failed.
    #[error("RNG error: {0}")]
    Rng(getrandom::Error),

    /// The DID does not use the `key` method.
    #[error("'{0}' is not a did:key")]
    NotDidKey(Did),

    /// The base58 prefix 'z' is missing.
    #[error("missing base58 prefix 'z'")]
    MissingBase58Prefix,

    /// The base58 encoding is invalid.
    #[error("invalid base58 encoding")]
    InvalidBase58,

    /// The multicodec prefix names a key type this crate does not know.
    #[error("unsupported key type")]
    UnsupportedKeyType,

    /// The key is recognized but cannot check Ed25519 signatures.
    #[error("cannot verify signatures with a {0} key")]
    UnsupportedAlgorithm(KeyAlgorithm),

    /// The key bytes are invalid.
    #[error("invalid key bytes")]
    InvalidKey,

    /// The signature is malformed or does not match.
    #[error("invalid signature")]
    InvalidSignature,
}

impl From<getrandom::Error> for Ed25519KeyError {
    fn from(e: getrandom::Error) -> Self {
        Self::Rng(e)
    }
}

/// An Ed25519 signing key together with its `did:key`.
#[derive(Debug, Clone)]
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    did: Did,
}

impl Ed25519KeyPair {
    /// Generates a new keypair from `getrandom`.
    ///
    /// # Errors
    ///
    /// Returns an error if the RNG fails.
    #[allow(clippy::unused_async)]
    pub async fn generate() -> Result<Self, Ed25519KeyError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed)?;
        Ok(SigningKey::from_bytes(&seed).into())
    }

    /// Imports a keypair from a 32 byte seed.
    ///
    /// # Errors
    ///
    /// Returns [`Ed25519KeyError::InvalidSeedLength`] for any other length.
    pub fn import(seed: &[u8]) -> Result<Self, Ed25519KeyError> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| Ed25519KeyError::InvalidSeedLength(seed.len()))?;
        Ok(SigningKey::from_bytes(&seed).into())
    }

    /// The `did:key` of this keypair.
    #[must_use]
    pub const fn did(&self) -> &Did {
        &self.did
    }

    /// The public key, base58 encoded.
    #[must_use]
    pub fn public_key_string(&self) -> String {
        self.signing_key.verifying_key().as_bytes().to_base58()
    }

    /// Signs `data`, returning the raw 64 byte signature.
    ///
    /// # Errors
    ///
    /// Returns [`Ed25519KeyError::InvalidSignature`] if signing fails.
    #[allow(clippy::unused_async)]
    pub async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, Ed25519KeyError> {
        let signature: Signature = self
            .signing_key
            .try_sign(data)
            .map_err(|_| Ed25519KeyError::InvalidSignature)?;
        Ok(signature.to_bytes().to_vec())
    }
}

impl From<SigningKey> for Ed25519KeyPair {
    fn from(signing_key: SigningKey) -> Self {
        let did = did_for(&signing_key.verifying_key());
        Self { signing_key, did }
    }
}

impl fmt::Display for Ed25519KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.did)
    }
}

fn did_for(key: &VerifyingKey) -> Did {
    let mut raw_bytes = Vec::with_capacity(34);
    raw_bytes.extend_from_slice(&ED25519_MULTICODEC);
    raw_bytes.extend_from_slice(key.as_bytes());
    let identifier = format!("{BASE58_PREFIX}{}", raw_bytes.to_base58());
    Did::from_parts(DID_KEY_METHOD, &identifier)
}

/// Decodes the public key a `did:key` carries.
///
/// # Errors
///
/// Returns an error if `did` is not a base58btc `did:key` or its multicodec
/// prefix is unknown.
pub fn decode(did: &Did) -> Result<DecodedDid, Ed25519KeyError> {
    if did.method() != DID_KEY_METHOD {
        return Err(Ed25519KeyError::NotDidKey(did.clone()));
    }

    let b58 = did
        .identifier()
        .strip_prefix(BASE58_PREFIX)
        .ok_or(Ed25519KeyError::MissingBase58Prefix)?;
    let bytes = b58
        .from_base58()
        .map_err(|_| Ed25519KeyError::InvalidBase58)?;

    let (algorithm, public_key) = match bytes.split_first_chunk::<2>() {
        Some((&ED25519_MULTICODEC, key)) => (KeyAlgorithm::Ed25519, key),
        Some((&P256_MULTICODEC, key)) => (KeyAlgorithm::P256, key),
        _ => return Err(Ed25519KeyError::UnsupportedKeyType),
    };

    Ok(DecodedDid {
        public_key: public_key.to_vec(),
        algorithm,
    })
}

/// Checks that `signature` over `data` was made by the key behind `did`.
///
/// # Errors
///
/// Returns an error if `did` does not decode to an Ed25519 key or the
/// signature does not verify.
#[allow(clippy::unused_async)]
pub async fn verify(did: &Did, data: &[u8], signature: &[u8]) -> Result<(), Ed25519KeyError> {
    let decoded = decode(did)?;
    if decoded.algorithm != KeyAlgorithm::Ed25519 {
        return Err(Ed25519KeyError::UnsupportedAlgorithm(decoded.algorithm));
    }

    let key_bytes: [u8; 32] = decoded
        .public_key
        .as_slice()
        .try_into()
        .map_err(|_| Ed25519KeyError::InvalidKey)?;
    let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| Ed25519KeyError::InvalidKey)?;
    let signature =
        Signature::from_slice(signature).map_err(|_| Ed25519KeyError::InvalidSignature)?;

    key.verify(data, &signature)
        .map_err(|_| Ed25519KeyError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    use wasm_bindgen_test::wasm_bindgen_test;

    /// Create a deterministic test keypair from a seed.
    fn test_keypair(seed: u8) -> Ed25519KeyPair {
        Ed25519KeyPair::import(&[seed; 32]).unwrap()
    }

    #[test]
    fn it_encodes_did_key() {
        let keypair = test_keypair(0);
        assert_eq!(keypair.did().method(), "key");
        assert!(keypair.did().identifier().starts_with("z6Mk"));
        assert_eq!(keypair.to_string(), keypair.did().to_string());
    }

    #[test]
    fn it_decodes_its_own_did() -> TestResult {
        let keypair = test_keypair(1);
        let decoded = decode(keypair.did())?;

        assert_eq!(decoded.algorithm, KeyAlgorithm::Ed25519);
        assert_eq!(decoded.public_key.to_base58(), keypair.public_key_string());
        Ok(())
    }

    #[test]
    fn it_rejects_seeds_of_the_wrong_length() {
        assert_eq!(
            Ed25519KeyPair::import(&[0; 31]).unwrap_err(),
            Ed25519KeyError::InvalidSeedLength(31)
        );
    }

    #[test]
    fn it_rejects_dids_it_cannot_decode() -> TestResult {
        let web: Did = "did:web:example.com".parse()?;
        let unprefixed: Did = "did:key:6Mk".parse()?;
        let garbage: Did = "did:key:z0OIl".parse()?;

        assert_eq!(decode(&web), Err(Ed25519KeyError::NotDidKey(web.clone())));
        assert_eq!(
            decode(&unprefixed),
            Err(Ed25519KeyError::MissingBase58Prefix)
        );
        assert_eq!(decode(&garbage), Err(Ed25519KeyError::InvalidBase58));
        Ok(())
    }

    #[cfg_attr(not(all(target_arch = "wasm32", target_os = "unknown")), tokio::test)]
    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    async fn it_verifies_its_own_signatures() -> TestResult {
        let keypair = test_keypair(42);
        let signature = keypair.sign(b"hello").await?;

        verify(keypair.did(), b"hello", &signature).await?;
        assert_eq!(
            verify(keypair.did(), b"goodbye", &signature).await,
            Err(Ed25519KeyError::InvalidSignature)
        );
        Ok(())
    }

    #[cfg_attr(not(all(target_arch = "wasm32", target_os = "unknown")), tokio::test)]
    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    async fn it_rejects_signatures_from_other_keys() -> TestResult {
        let alice = test_keypair(1);
        let bob = test_keypair(2);
        let signature = alice.sign(b"hello").await?;

        assert_eq!(
            verify(bob.did(), b"hello", &signature).await,
            Err(Ed25519KeyError::InvalidSignature)
        );
        Ok(())
    }

    #[cfg_attr(not(all(target_arch = "wasm32", target_os = "unknown")), tokio::test)]
    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    async fn it_generates_distinct_keys() -> TestResult {
        let first = Ed25519KeyPair::generate().await?;
        let second = Ed25519KeyPair::generate().await?;
        assert_ne!(first.did(), second.did());
        Ok(())
    }
}
