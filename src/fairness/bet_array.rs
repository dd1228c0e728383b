//! Bet array fairness validation and outcome simulation

use crate::errors::{FairnessError, FairnessResult};
use crate::fairness::outcome::derive_outcome;
use crate::fairness::types::BetArray;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format. Make sure it follows the syntax: [2, 0]";
pub const NOT_NUMBER_ARRAY_MESSAGE: &str =
    "Input must be an array of numbers. Example: [5, 0, 0, 0, 0]";
pub const OVERFLOW_MESSAGE: &str = "Multipliers are too large to average";

/// How the mean is compared against 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FairnessPolicy {
    /// Exact floating-point equality. Fragile for non-integer multipliers:
    /// `[0.1, 2.7, 0.2]` sums to 3.0000000000000004.
    #[default]
    Exact,
    /// Accept `|mean - 1| <= epsilon` as fair
    Tolerance(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FairnessClassification {
    Fair,
    PlayerEdge,
    HouseEdge,
    Malformed,
}

impl FairnessClassification {
    /// Only fair arrays may be wagered on
    pub fn is_allowed(self) -> bool {
        self == FairnessClassification::Fair
    }
}

impl fmt::Display for FairnessClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FairnessClassification::Fair => write!(f, "fair"),
            FairnessClassification::PlayerEdge => write!(f, "player_edge"),
            FairnessClassification::HouseEdge => write!(f, "house_edge"),
            FairnessClassification::Malformed => write!(f, "malformed"),
        }
    }
}

/// Classification of a bet array plus the advisory message shown next to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetArrayValidation {
    pub classification: FairnessClassification,
    pub message: String,
    /// Present unless the input was malformed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bet: Option<BetArray>,
}

impl BetArrayValidation {
    fn malformed(message: impl Into<String>) -> Self {
        Self {
            classification: FairnessClassification::Malformed,
            message: message.into(),
            expected_value: None,
            bet: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.classification.is_allowed()
    }
}

/// Classify a bet array typed as JSON text, comparing the mean exactly
pub fn validate_bet_array(json_text: &str) -> BetArrayValidation {
    validate_bet_array_with(json_text, FairnessPolicy::Exact)
}

pub fn validate_bet_array_with(json_text: &str, policy: FairnessPolicy) -> BetArrayValidation {
    let bet = match parse_bet_array(json_text) {
        Ok(bet) => bet,
        Err(message) => return BetArrayValidation::malformed(message),
    };
    classify(bet, policy)
}

/// Classify an already parsed bet array. An array whose sum overflows
/// `f64` has no meaningful mean and is reported as malformed.
pub fn classify(bet: BetArray, policy: FairnessPolicy) -> BetArrayValidation {
    let expected_value = bet.expected_value();
    if !expected_value.is_finite() {
        return BetArrayValidation::malformed(OVERFLOW_MESSAGE);
    }
    let fair = match policy {
        FairnessPolicy::Exact => expected_value == 1.0,
        FairnessPolicy::Tolerance(epsilon) => (expected_value - 1.0).abs() <= epsilon,
    };

    let (classification, message) = if fair {
        (FairnessClassification::Fair, "Equal odds = Allowed")
    } else if expected_value > 1.0 {
        (FairnessClassification::PlayerEdge, "Player has an edge = Not allowed")
    } else {
        (FairnessClassification::HouseEdge, "House has an edge = Not allowed")
    };

    tracing::trace!(%classification, expected_value, "classified bet array");

    BetArrayValidation {
        classification,
        message: message.to_string(),
        expected_value: Some(expected_value),
        bet: Some(bet),
    }
}

/// Strict parse: a non-empty JSON array of finite, non-negative numbers.
/// The error is the user-facing message.
fn parse_bet_array(json_text: &str) -> Result<BetArray, String> {
    let value: Value =
        serde_json::from_str(json_text).map_err(|_| INVALID_FORMAT_MESSAGE.to_string())?;

    let Value::Array(items) = value else {
        return Err(NOT_NUMBER_ARRAY_MESSAGE.to_string());
    };
    if items.is_empty() {
        return Err("Bet array must contain at least one entry".to_string());
    }

    let entries = items
        .iter()
        .map(|item| item.as_f64())
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| NOT_NUMBER_ARRAY_MESSAGE.to_string())?;

    BetArray::new(entries).map_err(|_| "Multipliers must be finite and non-negative".to_string())
}

/// The bet array entry a derived index lands on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedOutcome {
    pub result_index: u64,
    pub multiplier: f64,
    /// One flag per array position; only `result_index` is set
    pub highlighted: Vec<bool>,
}

/// Look up the payout multiplier for a derived index
pub fn simulate_outcome(bet: &BetArray, derived_index: u64) -> FairnessResult<SimulatedOutcome> {
    let multiplier = usize::try_from(derived_index)
        .ok()
        .and_then(|i| bet.get(i))
        .ok_or_else(|| {
            FairnessError::invalid_argument(format!(
                "index {} is outside a bet array of {} entries",
                derived_index,
                bet.len()
            ))
        })?;

    let highlighted = (0..bet.len())
        .map(|i| i as u64 == derived_index)
        .collect();

    Ok(SimulatedOutcome {
        result_index: derived_index,
        multiplier,
        highlighted,
    })
}

/// Derive an index from the seeds and land it on `bet`
pub fn simulate_bet(
    rng_seed: &str,
    client_seed: &str,
    nonce: u64,
    bet: &BetArray,
) -> FairnessResult<SimulatedOutcome> {
    let index = derive_outcome(rng_seed, client_seed, nonce, bet.outcome_count())?;
    simulate_outcome(bet, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(input: &str) -> FairnessClassification {
        validate_bet_array(input).classification
    }

    #[test]
    fn test_classification_scenarios() {
        assert_eq!(classification("[2,0]"), FairnessClassification::Fair);
        assert_eq!(classification("[5,0,0,0,0]"), FairnessClassification::Fair);
        assert_eq!(classification("[3,0]"), FairnessClassification::PlayerEdge);
        assert_eq!(classification("[1.9,0]"), FairnessClassification::HouseEdge);
        assert_eq!(classification("not json"), FairnessClassification::Malformed);
        assert_eq!(classification(r#"["a","b"]"#), FairnessClassification::Malformed);
    }

    #[test]
    fn test_messages() {
        let fair = validate_bet_array("[5, 0, 0, 0, 0]");
        assert!(fair.is_allowed());
        assert_eq!(fair.message, "Equal odds = Allowed");
        assert_eq!(fair.expected_value, Some(1.0));

        let house = validate_bet_array("[1.9, 0]");
        assert_eq!(house.message, "House has an edge = Not allowed");
        assert_eq!(house.expected_value, Some(0.95));

        assert_eq!(validate_bet_array("[3, 0]").message, "Player has an edge = Not allowed");
        assert_eq!(validate_bet_array("[2, 0").message, INVALID_FORMAT_MESSAGE);
        assert_eq!(validate_bet_array(r#"{"a": 1}"#).message, NOT_NUMBER_ARRAY_MESSAGE);
    }

    #[test]
    fn test_strict_schema() {
        for input in ["[]", "[1, null]", "[1, [1]]", "[true, 1]", "[-1, 3]", "2", r#""[2,0]""#, "[1e400]"] {
            let result = validate_bet_array(input);
            assert_eq!(result.classification, FairnessClassification::Malformed, "{}", input);
            assert!(result.expected_value.is_none());
            assert!(result.bet.is_none());
        }
    }

    #[test]
    fn test_overflowing_sum_is_malformed() {
        let result = validate_bet_array("[1e308, 1e308]");
        assert_eq!(result.classification, FairnessClassification::Malformed);
        assert_eq!(result.message, OVERFLOW_MESSAGE);
        assert!(result.expected_value.is_none());

        let bet = BetArray::new(vec![f64::MAX, f64::MAX]).unwrap();
        let result = classify(bet, FairnessPolicy::Tolerance(0.01));
        assert!(!result.is_allowed());
        assert!(serde_json::to_string(&result).unwrap().contains("malformed"));
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(classification("  [ 2 , 0 ]\n"), FairnessClassification::Fair);
    }

    // Exact equality misclassifies fair arrays with non-integer multipliers.
    #[test]
    fn test_exact_equality_fragility() {
        assert_eq!(classification("[0.1, 2.7, 0.2]"), FairnessClassification::PlayerEdge);
        assert_eq!(classification("[0.3, 2.3, 0.4]"), FairnessClassification::HouseEdge);

        let tolerant = FairnessPolicy::Tolerance(1e-9);
        assert!(validate_bet_array_with("[0.1, 2.7, 0.2]", tolerant).is_allowed());
        assert!(validate_bet_array_with("[0.3, 2.3, 0.4]", tolerant).is_allowed());
        assert_eq!(
            validate_bet_array_with("[1.9, 0]", tolerant).classification,
            FairnessClassification::HouseEdge
        );
    }

    #[test]
    fn test_simulate_outcome() {
        let bet = BetArray::new(vec![5.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let outcome = simulate_outcome(&bet, 0).unwrap();
        assert_eq!(outcome.multiplier, 5.0);
        assert_eq!(outcome.highlighted, vec![true, false, false, false, false]);

        let outcome = simulate_outcome(&bet, 3).unwrap();
        assert_eq!(outcome.multiplier, 0.0);
        assert_eq!(outcome.highlighted.iter().filter(|h| **h).count(), 1);
        assert!(outcome.highlighted[3]);

        assert!(matches!(
            simulate_outcome(&bet, 5),
            Err(FairnessError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_simulate_bet_golden() {
        let bet = BetArray::new(vec![5.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let outcome = simulate_bet("seed123", "abc", 0, &bet).unwrap();
        assert_eq!(outcome.result_index, 3);
        assert_eq!(outcome.multiplier, 0.0);
    }
}
