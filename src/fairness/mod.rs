pub mod hasher;
pub mod types;
pub mod commitment;
pub mod outcome;
pub mod bet_array;
pub mod session;
pub mod verification;

pub use hasher::{FairnessHasher, Sha256Hasher};
pub use types::*;
pub use commitment::{
    check_commitment, check_commitment_with, hash_seed, hash_seed_with, verify_commitment,
    verify_commitment_with, CommitmentCheck, SeedCommitment,
};
pub use outcome::{
    derive_outcome, derive_outcome_detailed, derive_outcome_with, outcome_message,
    OutcomeDerivation,
};
pub use bet_array::{
    classify, simulate_bet, simulate_outcome, validate_bet_array, validate_bet_array_with,
    BetArrayValidation, FairnessClassification, FairnessPolicy, SimulatedOutcome,
};
pub use session::FairnessSession;
pub use verification::verify_settled_play;
