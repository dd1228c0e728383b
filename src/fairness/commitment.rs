//! Seed commitments: the hashed RNG seed published before a play and checked
//! against the revealed seed afterwards.

use crate::errors::{FairnessError, FairnessResult};
use crate::fairness::hasher::{FairnessHasher, Sha256Hasher};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Outcome of comparing a commitment with a revealed seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentCheck {
    Match,
    /// The revealed seed does not hash to the commitment. A legitimate
    /// negative result, not an error.
    Mismatch,
}

impl CommitmentCheck {
    pub fn is_match(self) -> bool {
        self == CommitmentCheck::Match
    }
}

/// Lowercase hex SHA-256 of `rng_seed`
pub fn hash_seed(rng_seed: &str) -> String {
    hash_seed_with(&Sha256Hasher, rng_seed)
}

pub fn hash_seed_with<H: FairnessHasher + ?Sized>(hasher: &H, rng_seed: &str) -> String {
    hex::encode(hasher.sha256(rng_seed.as_bytes()))
}

/// Strict commitment check.
///
/// `hashed_seed` must be exactly 64 hex characters (either case); anything
/// else is an `InvalidArgument`.
pub fn check_commitment(hashed_seed: &str, revealed_seed: &str) -> FairnessResult<CommitmentCheck> {
    check_commitment_with(&Sha256Hasher, hashed_seed, revealed_seed)
}

pub fn check_commitment_with<H: FairnessHasher + ?Sized>(
    hasher: &H,
    hashed_seed: &str,
    revealed_seed: &str,
) -> FairnessResult<CommitmentCheck> {
    let expected = decode_commitment(hashed_seed)?;
    let computed = hasher.sha256(revealed_seed.as_bytes());

    if bool::from(computed[..].ct_eq(&expected[..])) {
        Ok(CommitmentCheck::Match)
    } else {
        Ok(CommitmentCheck::Mismatch)
    }
}

/// Lenient commitment check: malformed input is simply `false`
pub fn verify_commitment(hashed_seed: &str, revealed_seed: &str) -> bool {
    verify_commitment_with(&Sha256Hasher, hashed_seed, revealed_seed)
}

pub fn verify_commitment_with<H: FairnessHasher + ?Sized>(
    hasher: &H,
    hashed_seed: &str,
    revealed_seed: &str,
) -> bool {
    match check_commitment_with(hasher, hashed_seed, revealed_seed) {
        Ok(check) => check.is_match(),
        Err(e) => {
            tracing::trace!("Commitment rejected as malformed: {}", e);
            false
        }
    }
}

fn decode_commitment(hashed_seed: &str) -> FairnessResult<[u8; 32]> {
    if hashed_seed.len() != 64 {
        return Err(FairnessError::invalid_argument(format!(
            "hashed seed must be 64 hex characters, got {}",
            hashed_seed.len()
        )));
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(hashed_seed, &mut out)
        .map_err(|e| FairnessError::invalid_argument(format!("hashed seed is not hex: {}", e)))?;
    Ok(out)
}

/// A committed RNG seed.
///
/// Only the hash is visible until the seed is released with [`reveal`].
///
/// [`reveal`]: SeedCommitment::reveal
#[derive(Clone, PartialEq, Eq)]
pub struct SeedCommitment {
    hashed_seed: String,
    rng_seed: String,
}

impl SeedCommitment {
    /// Commit to a fresh seed of 32 random bytes, hex encoded
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self::from_secret(hex::encode(bytes))
    }

    /// Commit to a caller-supplied seed
    pub fn from_secret(rng_seed: impl Into<String>) -> Self {
        let rng_seed = rng_seed.into();
        Self {
            hashed_seed: hash_seed(&rng_seed),
            rng_seed,
        }
    }

    pub fn hashed_seed(&self) -> &str {
        &self.hashed_seed
    }

    /// Seed used as the HMAC key; crate-internal until revealed
    pub(crate) fn secret(&self) -> &str {
        &self.rng_seed
    }

    /// Release the seed, consuming the commitment
    pub fn reveal(self) -> String {
        self.rng_seed
    }
}

impl fmt::Debug for SeedCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedCommitment")
            .field("hashed_seed", &self.hashed_seed)
            .field("rng_seed", &"<hidden>")
            .finish()
    }
}
