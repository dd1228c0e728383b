//! Outcome derivation.
//!
//! `index = int(hex(HMAC-SHA256(rng_seed, "{client_seed}-{nonce}"))[..5], 16) % outcome_count`
//!
//! Keys and messages are hashed as their UTF-8 bytes. The leading 20 bits give
//! values in [0, 2^20); for outcome counts that do not divide 2^20 the lower
//! indices are very slightly favoured, exactly as in the on-chain algorithm.

use crate::errors::{FairnessError, FairnessResult};
use crate::fairness::hasher::{FairnessHasher, Sha256Hasher};
use serde::{Deserialize, Serialize};

/// Hex characters of the digest that feed the modulo step
pub const OUTCOME_HEX_PREFIX_LEN: usize = 5;

/// Full working of one derivation, for display and verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDerivation {
    /// `client_seed-nonce`, the HMAC payload
    pub message: String,
    /// Lowercase hex HMAC-SHA256 digest
    pub hmac_hex: String,
    /// First five hex characters parsed as an integer
    pub raw_value: u64,
    pub outcome_count: u64,
    pub result_index: u64,
}

/// HMAC payload for a play
pub fn outcome_message(client_seed: &str, nonce: u64) -> String {
    format!("{}-{}", client_seed, nonce)
}

/// Derive the result index in `[0, outcome_count)`.
///
/// Client seeds of any length are accepted; the play UI caps them at 32
/// characters but a longer seed just makes a longer message.
pub fn derive_outcome(
    rng_seed: &str,
    client_seed: &str,
    nonce: u64,
    outcome_count: u64,
) -> FairnessResult<u64> {
    derive_outcome_detailed(rng_seed, client_seed, nonce, outcome_count).map(|d| d.result_index)
}

pub fn derive_outcome_detailed(
    rng_seed: &str,
    client_seed: &str,
    nonce: u64,
    outcome_count: u64,
) -> FairnessResult<OutcomeDerivation> {
    derive_outcome_with(&Sha256Hasher, rng_seed, client_seed, nonce, outcome_count)
}

pub fn derive_outcome_with<H: FairnessHasher + ?Sized>(
    hasher: &H,
    rng_seed: &str,
    client_seed: &str,
    nonce: u64,
    outcome_count: u64,
) -> FairnessResult<OutcomeDerivation> {
    if outcome_count == 0 {
        return Err(FairnessError::invalid_argument(
            "outcome count must be positive",
        ));
    }
    if rng_seed.is_empty() {
        return Err(FairnessError::invalid_argument("rng seed must not be empty"));
    }

    let message = outcome_message(client_seed, nonce);
    let digest = hasher.hmac_sha256(rng_seed.as_bytes(), message.as_bytes())?;
    let hmac_hex = hex::encode(digest);

    let raw_value = u64::from_str_radix(&hmac_hex[..OUTCOME_HEX_PREFIX_LEN], 16)
        .map_err(|e| FairnessError::HashPrimitive(format!("digest is not hex: {}", e)))?;
    let result_index = raw_value % outcome_count;

    tracing::trace!(
        nonce,
        outcome_count,
        raw_value,
        result_index,
        "derived outcome"
    );

    Ok(OutcomeDerivation {
        message,
        hmac_hex,
        raw_value,
        outcome_count,
        result_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_golden_vector() {
        let derivation = derive_outcome_detailed("seed123", "abc", 0, 5).unwrap();
        assert_eq!(derivation.message, "abc-0");
        assert_eq!(
            derivation.hmac_hex,
            "6999a74585c4b361c6c9a53285f570f1a7835c2208d0ac3eeb962fd6ec7e579e"
        );
        assert_eq!(derivation.raw_value, 0x6999a);
        assert_eq!(derivation.result_index, 3);
    }

    #[test]
    fn test_nonce_sequence_vectors() {
        let expected = [3, 3, 2, 0, 0, 1];
        for (nonce, want) in expected.iter().enumerate() {
            assert_eq!(
                derive_outcome("seed123", "abc", nonce as u64, 5).unwrap(),
                *want,
                "nonce {}",
                nonce
            );
        }
    }

    #[test]
    fn test_large_nonces_are_not_truncated() {
        // 2^53 and u64::MAX render as full decimal strings
        assert_eq!(derive_outcome("seed123", "abc", 1 << 53, 100).unwrap(), 64);
        assert_eq!(derive_outcome("seed123", "abc", u64::MAX, 7).unwrap(), 6);
    }

    #[test]
    fn test_empty_client_seed() {
        let derivation = derive_outcome_detailed("seed123", "", 0, 2).unwrap();
        assert_eq!(derivation.message, "-0");
        assert_eq!(derivation.result_index, 1);
    }

    #[test]
    fn test_determinism() {
        let first = derive_outcome_detailed("server", "client", 9, 37).unwrap();
        for _ in 0..10 {
            assert_eq!(derive_outcome_detailed("server", "client", 9, 37).unwrap(), first);
        }
    }

    #[test]
    fn test_range() {
        for count in [1u64, 2, 3, 10, 100, 1 << 20, u64::MAX] {
            for nonce in 0..50 {
                let index = derive_outcome("range-seed", "client", nonce, count).unwrap();
                assert!(index < count);
            }
        }
        assert_eq!(derive_outcome("range-seed", "client", 3, 1).unwrap(), 0);
    }

    #[test]
    fn test_nonce_sensitivity() {
        let digests: HashSet<String> = (0..200)
            .map(|n| derive_outcome_detailed("seed", "client", n, 100).unwrap().hmac_hex)
            .collect();
        assert_eq!(digests.len(), 200);

        let changed = (0..200)
            .filter(|&n| {
                derive_outcome("seed", "client", n, 100).unwrap()
                    != derive_outcome("seed", "client", n + 1, 100).unwrap()
            })
            .count();
        assert!(changed > 180, "only {} of 200 indices changed", changed);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            derive_outcome("seed", "client", 0, 0),
            Err(FairnessError::InvalidArgument { .. })
        ));
        assert!(matches!(
            derive_outcome("", "client", 0, 5),
            Err(FairnessError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_roughly_uniform() {
        let mut buckets = [0u32; 4];
        for nonce in 0..4000 {
            buckets[derive_outcome("uniform", "client", nonce, 4).unwrap() as usize] += 1;
        }
        for count in buckets {
            assert!((800..1200).contains(&count), "bucket count {}", count);
        }
    }
}
