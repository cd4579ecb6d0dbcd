use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use keymint::config::{Config, ReferenceZone};
use keymint::issuer;
use keymint::models::{DurationUnit, GenerateRequest, Validation};
use keymint::store::KeyStore;

// ── CLI definition ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "keymint", about = "Generate and validate time-limited access keys", version)]
struct Cli {
    /// Hours east of UTC for human-readable timestamps (default: $KEYMINT_TZ_OFFSET_HOURS or 8)
    #[arg(long, global = true, allow_negative_numbers = true)]
    tz_offset_hours: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch of keys sharing one calendar-aware expiry
    Generate {
        /// Validity unit
        #[arg(long, value_enum, ignore_case = true)]
        unit: DurationUnit,
        /// How many units
        #[arg(long)]
        amount: u32,
        /// How many keys to generate
        #[arg(long)]
        count: u32,
        /// Optional tag/label
        #[arg(long, default_value = "")]
        tag: String,
        /// Output directory (default: $KEYMINT_OUTPUT_DIR or keys)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Issue one key into the key store
    Issue {
        /// How many units the key is valid for
        #[arg(long, default_value_t = 1)]
        duration: u32,
        /// Validity unit
        #[arg(long, value_enum, ignore_case = true, default_value_t = DurationUnit::Years)]
        unit: DurationUnit,
        /// Key store file (default: $KEYMINT_STORE_PATH or keys.json)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Check a key against the key store
    Validate {
        /// The key to check
        key: String,
        /// Key store file (default: $KEYMINT_STORE_PATH or keys.json)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("KEYMINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let zone = match cli.tz_offset_hours {
        Some(hours) => ReferenceZone::from_hours(format!("UTC{:+}", hours), hours)?,
        None => config.zone.clone(),
    };

    match cli.command {
        Commands::Generate {
            unit,
            amount,
            count,
            tag,
            output_dir,
        } => {
            let output_dir = output_dir.unwrap_or(config.output_dir);
            cmd_generate(
                GenerateRequest {
                    unit,
                    amount,
                    count,
                    tag,
                },
                output_dir,
                &zone,
            )
        }
        Commands::Issue {
            duration,
            unit,
            store,
        } => cmd_issue(store.unwrap_or(config.store_path), duration, unit),
        Commands::Validate { key, store } => cmd_validate(store.unwrap_or(config.store_path), &key),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn cmd_generate(request: GenerateRequest, output_dir: PathBuf, zone: &ReferenceZone) -> Result<ExitCode> {
    let result = issuer::generate_keys(&request, &output_dir, zone)
        .with_context(|| format!("generating keys into {}", output_dir.display()))?;

    println!(
        "Wrote: {}, {}, and updated {}",
        result.json_path.display(),
        result.csv_path.display(),
        result.latest_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_issue(store_path: PathBuf, duration: u32, unit: DurationUnit) -> Result<ExitCode> {
    let store = KeyStore::new(store_path);
    let record = store
        .issue_key(duration, unit)
        .with_context(|| format!("issuing key into {}", store.path().display()))?;

    println!("Key: {}", record.key);
    println!("Expires: {}", record.expires.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "Duration: {} {} ({} days)",
        record.duration, record.unit, record.valid_days
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(store_path: PathBuf, key: &str) -> Result<ExitCode> {
    let store = KeyStore::new(store_path);
    let outcome = store
        .validate_key(key)
        .with_context(|| format!("reading key store {}", store.path().display()))?;

    match &outcome {
        Validation::Valid(record) => println!(
            "Valid: expires {}",
            record.expires.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        Validation::Invalid(reason) => println!("Invalid: {}", reason),
    }
    Ok(ExitCode::from(validation_status(&outcome)))
}

/// Process status for `validate`: 0 for a usable key, 1 otherwise.
fn validation_status(outcome: &Validation) -> u8 {
    if outcome.is_valid() { 0 } else { 1 }
}
