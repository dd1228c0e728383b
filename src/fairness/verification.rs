use crate::errors::FairnessResult;
use crate::fairness::bet_array::simulate_outcome;
use crate::fairness::commitment::check_commitment;
use crate::fairness::outcome::derive_outcome_detailed;
use crate::fairness::types::{SettledPlay, VerificationReport};

/// Recompute a settled play from its revealed inputs.
///
/// A play that does not check out is reported through the flags on the
/// report; `Err` is reserved for records that cannot be evaluated at all
/// (malformed commitment hex, empty revealed seed).
pub fn verify_settled_play(play: &SettledPlay) -> FairnessResult<VerificationReport> {
    let commitment_valid = check_commitment(&play.hashed_seed, &play.revealed_seed)?.is_match();

    let derivation = derive_outcome_detailed(
        &play.revealed_seed,
        play.client_seed.as_str(),
        play.nonce.value(),
        play.bet.outcome_count(),
    )?;
    let simulated = simulate_outcome(&play.bet, derivation.result_index)?;

    let outcome_matches = derivation.result_index == play.result_index;
    let payout_matches = simulated.multiplier == play.multiplier;

    let mut failures = Vec::new();
    if !commitment_valid {
        failures.push("revealed seed does not match the published hash".to_string());
    }
    if !outcome_matches {
        failures.push(format!(
            "recorded index {} but inputs derive {}",
            play.result_index, derivation.result_index
        ));
    }
    if !payout_matches {
        failures.push(format!(
            "recorded multiplier {} but bet array gives {}",
            play.multiplier, simulated.multiplier
        ));
    }

    let is_valid = failures.is_empty();
    let explanation = if is_valid {
        format!(
            "HMAC-SHA256(rng_seed, \"{}\") = {}; {:#x} mod {} = {}",
            derivation.message,
            derivation.hmac_hex,
            derivation.raw_value,
            derivation.outcome_count,
            derivation.result_index
        )
    } else {
        failures.join("; ")
    };

    if !is_valid {
        tracing::warn!(nonce = %play.nonce, "Play failed verification: {}", explanation);
    }

    Ok(VerificationReport {
        is_valid,
        commitment_valid,
        outcome_matches,
        payout_matches,
        computed_index: derivation.result_index,
        computed_multiplier: simulated.multiplier,
        hmac_hex: derivation.hmac_hex,
        explanation: Some(explanation),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FairnessError;
    use crate::fairness::commitment::hash_seed;
    use crate::fairness::types::{BetArray, ClientSeed, Nonce};

    fn golden_play() -> SettledPlay {
        SettledPlay {
            hashed_seed: hash_seed("seed123"),
            revealed_seed: "seed123".to_string(),
            client_seed: ClientSeed::new("abc").unwrap(),
            nonce: Nonce::new(0),
            bet: BetArray::new(vec![5.0, 0.0, 0.0, 0.0, 0.0]).unwrap(),
            result_index: 3,
            multiplier: 0.0,
            next_hashed_seed: hash_seed("next"),
        }
    }

    #[test]
    fn test_valid_play() {
        let report = verify_settled_play(&golden_play()).unwrap();
        assert!(report.is_valid);
        assert!(report.commitment_valid && report.outcome_matches && report.payout_matches);
        assert_eq!(report.computed_index, 3);
        assert!(report.explanation.unwrap().contains("0x6999a mod 5 = 3"));
    }

    #[test]
    fn test_swapped_seed_detected() {
        let mut play = golden_play();
        play.revealed_seed = "seed124".to_string();
        let report = verify_settled_play(&play).unwrap();
        assert!(!report.is_valid);
        assert!(!report.commitment_valid);
    }

    #[test]
    fn test_tampered_result_detected() {
        let mut play = golden_play();
        play.result_index = 0;
        play.multiplier = 5.0;
        let report = verify_settled_play(&play).unwrap();
        assert!(report.commitment_valid);
        assert!(!report.outcome_matches);
        assert!(!report.payout_matches);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_malformed_record() {
        let mut play = golden_play();
        play.hashed_seed = "xyz".to_string();
        assert!(matches!(
            verify_settled_play(&play),
            Err(FairnessError::InvalidArgument { .. })
        ));
    }
}
