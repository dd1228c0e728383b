//! Per-player seed lifecycle on the authoritative side.
//!
//! A session holds the current commitment, the player's client seed and the
//! nonce. Every settled play consumes the commitment, bumps the nonce by one
//! and publishes a fresh commitment for the next play.

use crate::errors::{FairnessError, FairnessResult};
use crate::fairness::bet_array::simulate_outcome;
use crate::fairness::commitment::SeedCommitment;
use crate::fairness::outcome::derive_outcome_detailed;
use crate::fairness::types::{
    BetArray, ClientSeed, Nonce, SettledPlay, DEFAULT_CLIENT_SEED_MAX_LENGTH,
};
use rand::Rng;
use rand_core::{CryptoRng, RngCore};
use std::mem;

/// Inputs frozen when a play starts
#[derive(Debug, Clone)]
struct PendingPlay {
    client_seed: ClientSeed,
    nonce: Nonce,
}

#[derive(Debug)]
pub struct FairnessSession {
    commitment: SeedCommitment,
    client_seed: ClientSeed,
    nonce: Nonce,
    pending: Option<PendingPlay>,
    client_seed_max_length: usize,
}

impl FairnessSession {
    /// First-time setup: fresh commitment, nonce 0 and a shuffled client seed
    pub fn initialize<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let commitment = SeedCommitment::generate(rng);
        let client_seed = ClientSeed::shuffled(rng);
        tracing::info!(hashed_seed = %commitment.hashed_seed(), "Initialized fairness session");
        Self::with_state(commitment, client_seed, Nonce::default())
    }

    /// Resume a session from stored state
    pub fn with_state(commitment: SeedCommitment, client_seed: ClientSeed, nonce: Nonce) -> Self {
        Self {
            commitment,
            client_seed,
            nonce,
            pending: None,
            client_seed_max_length: DEFAULT_CLIENT_SEED_MAX_LENGTH,
        }
    }

    pub fn with_client_seed_max_length(mut self, max: usize) -> Self {
        self.client_seed_max_length = max;
        self
    }

    /// Commitment the next play will be derived from
    pub fn next_hashed_seed(&self) -> &str {
        self.commitment.hashed_seed()
    }

    pub fn client_seed(&self) -> &ClientSeed {
        &self.client_seed
    }

    pub fn nonce(&self) -> Nonce {
        self.nonce
    }

    pub fn is_playing(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the client seed; only allowed between plays
    pub fn set_client_seed(&mut self, value: impl Into<String>) -> FairnessResult<()> {
        self.ensure_idle()?;
        self.client_seed = ClientSeed::with_max_length(value, self.client_seed_max_length)?;
        Ok(())
    }

    pub fn shuffle_client_seed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FairnessResult<&ClientSeed> {
        self.ensure_idle()?;
        self.client_seed = ClientSeed::shuffled(rng);
        Ok(&self.client_seed)
    }

    /// Lock the client seed for a play
    pub fn begin_play(&mut self) -> FairnessResult<()> {
        self.ensure_idle()?;
        tracing::debug!(nonce = %self.nonce, "Play started");
        self.pending = Some(PendingPlay {
            client_seed: self.client_seed.clone(),
            nonce: self.nonce,
        });
        Ok(())
    }

    /// Release the lock without settling. The commitment stays unused.
    pub fn abort_play(&mut self) -> FairnessResult<()> {
        self.pending.take().ok_or(FairnessError::NoPlayInFlight)?;
        tracing::debug!(nonce = %self.nonce, "Play aborted");
        Ok(())
    }

    /// Settle the in-flight play against `bet`, reveal the seed and rotate
    /// to a new commitment. State is left untouched on error.
    pub fn settle_play<R: RngCore + CryptoRng>(
        &mut self,
        bet: &BetArray,
        rng: &mut R,
    ) -> FairnessResult<SettledPlay> {
        let pending = self.pending.as_ref().ok_or(FairnessError::NoPlayInFlight)?;
        let next_nonce = pending.nonce.next()?;

        let derivation = derive_outcome_detailed(
            self.commitment.secret(),
            pending.client_seed.as_str(),
            pending.nonce.value(),
            bet.outcome_count(),
        )?;
        let simulated = simulate_outcome(bet, derivation.result_index)?;

        let pending = self.pending.take().ok_or(FairnessError::NoPlayInFlight)?;
        let used = mem::replace(&mut self.commitment, SeedCommitment::generate(rng));
        self.nonce = next_nonce;

        let hashed_seed = used.hashed_seed().to_string();
        let play = SettledPlay {
            hashed_seed,
            revealed_seed: used.reveal(),
            client_seed: pending.client_seed,
            nonce: pending.nonce,
            bet: bet.clone(),
            result_index: simulated.result_index,
            multiplier: simulated.multiplier,
            next_hashed_seed: self.commitment.hashed_seed().to_string(),
        };

        tracing::info!(
            nonce = %play.nonce,
            result_index = play.result_index,
            multiplier = play.multiplier,
            next_hashed_seed = %play.next_hashed_seed,
            "Play settled, commitment rotated"
        );

        Ok(play)
    }

    fn ensure_idle(&self) -> FairnessResult<()> {
        if self.pending.is_some() {
            tracing::warn!("Rejected operation while a play is in flight");
            return Err(FairnessError::PlayInFlight);
        }
        Ok(())
    }
}
