use crate::errors::{FairnessError, FairnessResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest client seed the play UI accepts
pub const DEFAULT_CLIENT_SEED_MAX_LENGTH: usize = 32;

/// Player-supplied seed mixed into the next play's outcome
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSeed(String);

impl ClientSeed {
    /// Create a client seed, enforcing the default 32 character limit
    pub fn new(value: impl Into<String>) -> FairnessResult<Self> {
        Self::with_max_length(value, DEFAULT_CLIENT_SEED_MAX_LENGTH)
    }

    /// Create a client seed with a caller-chosen length limit (in characters)
    pub fn with_max_length(value: impl Into<String>, max: usize) -> FairnessResult<Self> {
        let value = value.into();
        let length = value.chars().count();
        if length > max {
            return Err(FairnessError::ClientSeedTooLong { length, max });
        }
        Ok(Self(value))
    }

    /// Random decimal integer in [0, 1e9), same shape as the shuffle button
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..1_000_000_000u32).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-player play counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(u64);

impl Nonce {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// The nonce for the following play
    pub fn next(self) -> FairnessResult<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(FairnessError::NonceExhausted)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered payout multipliers for one play.
///
/// Always non-empty, every entry finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BetArray(Vec<f64>);

impl BetArray {
    pub fn new(entries: Vec<f64>) -> FairnessResult<Self> {
        if entries.is_empty() {
            return Err(FairnessError::invalid_argument("bet array must not be empty"));
        }
        if let Some((index, value)) = entries
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(FairnessError::invalid_argument(format!(
                "bet array entry {} is not a finite non-negative number: {}",
                index, value
            )));
        }
        Ok(Self(entries))
    }

    pub fn entries(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Number of outcomes, as fed to outcome derivation
    pub fn outcome_count(&self) -> u64 {
        self.0.len() as u64
    }

    /// Arithmetic mean, summed left to right from zero
    pub fn expected_value(&self) -> f64 {
        let sum = self.0.iter().fold(0.0, |acc, v| acc + v);
        sum / self.0.len() as f64
    }
}

impl TryFrom<Vec<f64>> for BetArray {
    type Error = FairnessError;

    fn try_from(entries: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<BetArray> for Vec<f64> {
    fn from(bet: BetArray) -> Self {
        bet.0
    }
}

/// A play as recorded after settlement; everything a third party needs to
/// recompute and check the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledPlay {
    /// Commitment published before the play (hex SHA-256)
    pub hashed_seed: String,
    /// The RNG seed behind `hashed_seed`, revealed after settlement
    pub revealed_seed: String,
    pub client_seed: ClientSeed,
    pub nonce: Nonce,
    pub bet: BetArray,
    pub result_index: u64,
    pub multiplier: f64,
    /// Commitment for the player's next play
    pub next_hashed_seed: String,
}

/// Response from play verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub is_valid: bool,
    pub commitment_valid: bool,
    pub outcome_matches: bool,
    pub payout_matches: bool,
    pub computed_index: u64,
    pub computed_multiplier: f64,
    /// Lowercase hex HMAC-SHA256 behind `computed_index`
    pub hmac_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
