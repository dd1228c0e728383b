//! Solbet provably-fair verification CLI
//!
//! Lets anyone recompute commitments, outcomes and settled plays offline.

use clap::{Parser, Subcommand};
use rand_core::OsRng;
use serde::Serialize;
use solbet_fairness::{
    check_commitment,
    config::{generate_sample_config, ConfigLoader, FairnessConfig},
    derive_outcome_detailed,
    logging::init_logging,
    simulate_bet, validate_bet_array_with, verify_settled_play, CommitmentCheck, SeedCommitment,
    SettledPlay,
};
use std::{error::Error, path::PathBuf, process::ExitCode};

#[derive(Parser)]
#[command(name = "solbet-fair")]
#[command(about = "Provably fair commitment and outcome verification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit to an RNG seed (a random one when --seed is omitted)
    Commit {
        #[arg(long)]
        seed: Option<String>,
    },

    /// Check a revealed seed against its published hash
    VerifyCommitment {
        /// Published SHA-256 commitment (hex)
        #[arg(long)]
        hashed: String,

        /// Revealed RNG seed
        #[arg(long)]
        seed: String,
    },

    /// Derive the result index for a play
    Derive {
        #[arg(long)]
        rng_seed: String,

        #[arg(long)]
        client_seed: String,

        #[arg(long)]
        nonce: u64,

        /// Number of possible outcomes
        #[arg(long)]
        outcomes: u64,
    },

    /// Classify a bet array (JSON) as fair, player edge or house edge
    Validate {
        /// Defaults to the configured simulator bet array
        bet_array: Option<String>,
    },

    /// Derive an outcome and land it on a bet array
    Simulate {
        #[arg(long)]
        rng_seed: String,

        #[arg(long)]
        client_seed: String,

        #[arg(long)]
        nonce: u64,

        /// Defaults to the configured simulator bet array
        #[arg(long)]
        bet_array: Option<String>,
    },

    /// Verify a settled play record (JSON file)
    VerifyPlay { file: PathBuf },

    /// Write a sample configuration file
    SampleConfig { path: PathBuf },
}

type CliResult = Result<bool, Box<dyn Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    match run(&cli, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &FairnessConfig) -> CliResult {
    match &cli.command {
        Commands::Commit { seed } => {
            let commitment = match seed {
                Some(seed) => SeedCommitment::from_secret(seed.clone()),
                None => SeedCommitment::generate(&mut OsRng),
            };
            let hashed_seed = commitment.hashed_seed().to_string();
            let rng_seed = commitment.reveal();

            if cli.json {
                #[derive(Serialize)]
                struct CommitOutput {
                    hashed_seed: String,
                    rng_seed: String,
                }
                print_json(&CommitOutput { hashed_seed, rng_seed })?;
            } else {
                println!("Hashed seed (publish): {}", hashed_seed);
                println!("RNG seed (keep secret): {}", rng_seed);
            }
            Ok(true)
        }

        Commands::VerifyCommitment { hashed, seed } => {
            let check = check_commitment(hashed, seed)?;
            if cli.json {
                print_json(&check)?;
            } else if check == CommitmentCheck::Match {
                println!("✅ Seed matches commitment");
            } else {
                println!("❌ Seed does NOT match commitment");
            }
            Ok(check.is_match())
        }

        Commands::Derive { rng_seed, client_seed, nonce, outcomes } => {
            warn_long_client_seed(client_seed, config);
            let derivation = derive_outcome_detailed(rng_seed, client_seed, *nonce, *outcomes)?;
            if cli.json {
                print_json(&derivation)?;
            } else {
                println!("Message:      {}", derivation.message);
                println!("HMAC-SHA256:  {}", derivation.hmac_hex);
                println!(
                    "Leading bits: {:#x} ({})",
                    derivation.raw_value, derivation.raw_value
                );
                println!(
                    "Result index: {} (of {})",
                    derivation.result_index, derivation.outcome_count
                );
            }
            Ok(true)
        }

        Commands::Validate { bet_array } => {
            let input = bet_array.as_deref().unwrap_or(&config.simulator.default_bet_array);
            let validation = validate_bet_array_with(input, config.validation.policy);
            if cli.json {
                print_json(&validation)?;
            } else {
                let mark = if validation.is_allowed() { "✅" } else { "❌" };
                println!("{} {}", mark, validation.message);
                if let Some(expected_value) = validation.expected_value {
                    println!("   Expected value: {}", expected_value);
                }
            }
            Ok(validation.is_allowed())
        }

        Commands::Simulate { rng_seed, client_seed, nonce, bet_array } => {
            warn_long_client_seed(client_seed, config);
            let input = bet_array.as_deref().unwrap_or(&config.simulator.default_bet_array);
            let validation = validate_bet_array_with(input, config.validation.policy);
            let Some(bet) = validation.bet.as_ref() else {
                return Err(validation.message.clone().into());
            };
            if !validation.is_allowed() {
                tracing::warn!("Simulating an unfair bet array: {}", validation.message);
            }

            let outcome = simulate_bet(rng_seed, client_seed, *nonce, bet)?;
            if cli.json {
                print_json(&outcome)?;
            } else {
                let cells: Vec<String> = bet
                    .entries()
                    .iter()
                    .zip(&outcome.highlighted)
                    .map(|(value, hit)| if *hit { format!("[{}x]", value) } else { format!("{}x", value) })
                    .collect();
                println!("Simulation result: {}", cells.join(" "));
                println!(
                    "Index {} pays {}x ({})",
                    outcome.result_index, outcome.multiplier, validation.message
                );
            }
            Ok(true)
        }

        Commands::VerifyPlay { file } => {
            let content = std::fs::read_to_string(file)
                .map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
            let play: SettledPlay = serde_json::from_str(&content)?;
            let report = verify_settled_play(&play)?;

            if cli.json {
                print_json(&report)?;
            } else {
                println!("🔍 Play Verification (nonce {})", play.nonce);
                println!("================================");
                println!("   Commitment: {}", status(report.commitment_valid));
                println!("   Outcome:    {}", status(report.outcome_matches));
                println!("   Payout:     {}", status(report.payout_matches));
                if let Some(explanation) = &report.explanation {
                    println!("   {}", explanation);
                }
                if report.is_valid {
                    println!("\n✅ PLAY VERIFIED");
                } else {
                    println!("\n❌ PLAY VERIFICATION FAILED");
                }
            }
            Ok(report.is_valid)
        }

        Commands::SampleConfig { path } => {
            generate_sample_config(path)?;
            println!("Wrote sample configuration to {}", path.display());
            Ok(true)
        }
    }
}

fn warn_long_client_seed(client_seed: &str, config: &FairnessConfig) {
    let length = client_seed.chars().count();
    if length > config.client_seed.max_length {
        tracing::warn!(
            length,
            max = config.client_seed.max_length,
            "Client seed is longer than the play UI accepts"
        );
    }
}

fn status(ok: bool) -> &'static str {
    if ok {
        "✅ ok"
    } else {
        "❌ mismatch"
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
