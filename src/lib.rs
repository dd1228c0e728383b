//! Solbet Fairness - provably fair commitment and outcome derivation
//!
//! Pure, synchronous building blocks for verifying casino plays:
//! - seed commitments (`SHA256(rng_seed)` published before play)
//! - outcome derivation (`HMAC-SHA256(rng_seed, "client_seed-nonce")` reduced
//!   to an index into the bet array)
//! - bet array fairness classification and outcome simulation
//! - the seed lifecycle (commit, play, reveal, rotate) and third-party
//!   verification of settled plays
//!
//! State such as the client seed and nonce is always passed in explicitly.

pub mod config;
pub mod errors;
pub mod fairness;
pub mod logging;

pub use errors::{ConfigurationError, FairnessError, FairnessResult};
pub use fairness::{
    check_commitment, derive_outcome, derive_outcome_detailed, hash_seed, simulate_bet,
    simulate_outcome, validate_bet_array, validate_bet_array_with, verify_commitment,
    verify_settled_play, BetArray, BetArrayValidation, ClientSeed, CommitmentCheck,
    FairnessClassification, FairnessHasher, FairnessPolicy, FairnessSession, Nonce,
    OutcomeDerivation, SeedCommitment, SettledPlay, Sha256Hasher, SimulatedOutcome,
    VerificationReport,
};
