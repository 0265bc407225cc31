//! Paycrypt: Privacy-preserving salary prediction pipeline.
//!
//! Runs one encrypted prediction end to end on this machine: encrypt the
//! feature vector, evaluate the linear model over ciphertexts, decrypt the
//! result. The evaluator side only ever sees ciphertexts and the public
//! modulus.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin predict -- --keys custkeys.json \
//!     --age 30 --eating 5 --active 5 --gender 1 [--model model.json] [--mean N]
//! ```

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paycrypt::adapters::{JsonFileKeyStore, LocalEvaluator};
use paycrypt::application::PredictionSession;
use paycrypt::{EmployeeFeatures, LinearModel};

const USAGE: &str =
    "Usage: predict --keys <path> --age N --eating N --active N --gender N [--model <path>] [--mean N]";

struct Args {
    keys: std::path::PathBuf,
    features: EmployeeFeatures,
    model: Option<std::path::PathBuf>,
    mean: Option<f64>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut keys: Option<std::path::PathBuf> = None;
    let mut model: Option<std::path::PathBuf> = None;
    let mut mean: Option<f64> = None;
    let mut age: Option<f64> = None;
    let mut eating: Option<f64> = None;
    let mut active: Option<f64> = None;
    let mut gender: Option<f64> = None;

    fn number(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<f64> {
        let raw = args
            .next()
            .ok_or_else(|| anyhow!("{flag} requires a value\n{USAGE}"))?;
        raw.parse::<f64>()
            .with_context(|| format!("{flag} must be a number, got {raw:?}"))
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--keys" => {
                let p = args
                    .next()
                    .ok_or_else(|| anyhow!("--keys requires a path\n{USAGE}"))?;
                keys = Some(std::path::PathBuf::from(p));
            }
            "--model" => {
                let p = args
                    .next()
                    .ok_or_else(|| anyhow!("--model requires a path\n{USAGE}"))?;
                model = Some(std::path::PathBuf::from(p));
            }
            "--age" => age = Some(number(&mut args, "--age")?),
            "--eating" => eating = Some(number(&mut args, "--eating")?),
            "--active" => active = Some(number(&mut args, "--active")?),
            "--gender" => gender = Some(number(&mut args, "--gender")?),
            "--mean" => mean = Some(number(&mut args, "--mean")?),
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => bail!("Unknown arg: {arg}\n{USAGE}"),
        }
    }

    let (Some(keys), Some(age), Some(eating), Some(active), Some(gender)) =
        (keys, age, eating, active, gender)
    else {
        bail!("{USAGE}");
    };

    Ok(Args {
        keys,
        features: EmployeeFeatures {
            age,
            healthy_eating: eating,
            active_lifestyle: active,
            gender_code: gender,
        },
        model,
        mean,
    })
}

fn load_model(path: Option<&std::path::Path>) -> Result<LinearModel> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read model file {path:?}"))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Malformed model file {path:?}"))
        }
        // Demo parameters fitted on the bundled employee history.
        None => LinearModel::new(vec![500.0, 1000.0, 800.0, 2000.0], 30000.0)
            .map_err(|e| anyhow!(e)),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;
    let model = load_model(args.model.as_deref())?;

    let keystore = Arc::new(JsonFileKeyStore::new(args.keys));
    let evaluator = Arc::new(LocalEvaluator::new(model));

    let mut session = PredictionSession::new(keystore, evaluator);
    let prediction = session.predict(&args.features)?;

    println!("Predicted salary: {:.2}", prediction.salary);
    println!("Key fingerprint:  {}", prediction.key_fingerprint);
    if let Some(percent) = prediction.percent_vs_mean(args.mean) {
        if percent >= 0.0 {
            println!("{percent:.1}% above the average salary");
        } else {
            println!("{:.1}% below the average salary", -percent);
        }
    }

    Ok(())
}
