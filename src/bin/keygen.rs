//! Paillier keypair generation utility.
//!
//! Generates a fresh keypair and writes the key record to a JSON file with
//! 0600 permissions (Unix).
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin keygen -- --out <path> [--bits N] [--force]
//! ```
//!
//! # Security
//!
//! - Prints only non-secret material (the public fingerprint)
//! - Refuses to overwrite an existing key file unless `--force` is given

use paycrypt::adapters::JsonFileKeyStore;
use paycrypt::crypto::{generate_keypair, DEFAULT_KEY_BITS};
use paycrypt::ports::KeyStore;

const USAGE: &str = "Usage: keygen --out <path> [--bits N] [--force]";

fn main() {
    let mut args = std::env::args().skip(1);
    let mut out_path: Option<std::path::PathBuf> = None;
    let mut bits = DEFAULT_KEY_BITS;
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                let p = args.next().unwrap_or_default();
                if p.is_empty() {
                    eprintln!("{USAGE}");
                    std::process::exit(2);
                }
                out_path = Some(std::path::PathBuf::from(p));
            }
            "--bits" => {
                let b = args.next().unwrap_or_default();
                match b.parse::<u64>() {
                    Ok(parsed) if parsed >= 64 => bits = parsed,
                    _ => {
                        eprintln!("--bits must be an integer >= 64\n{USAGE}");
                        std::process::exit(2);
                    }
                }
            }
            "--force" => force = true,
            "-h" | "--help" => {
                println!(
                    "{USAGE}\n\nWrites a Paillier key record (public modulus and private factors, decimal text) to <path> with 0600 permissions. Prints only non-secret material."
                );
                return;
            }
            _ => {
                eprintln!("Unknown arg: {arg}\n{USAGE}");
                std::process::exit(2);
            }
        }
    }

    let out_path = out_path.unwrap_or_else(|| {
        eprintln!("{USAGE}");
        std::process::exit(2);
    });

    if out_path.exists() && !force {
        eprintln!(
            "Refusing to overwrite existing file {:?}. Use --force.",
            out_path
        );
        std::process::exit(3);
    }

    let keys = match generate_keypair(bits) {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("Key generation failed: {e}");
            std::process::exit(4);
        }
    };

    let store = JsonFileKeyStore::new(&out_path);
    if let Err(e) = store.save_keys(&keys) {
        eprintln!("Failed to write {:?}: {e}", out_path);
        std::process::exit(4);
    }

    // Print only non-secret material.
    println!("Wrote {bits}-bit key record to {:?}", out_path);
    println!("PUBLIC_FINGERPRINT={}", keys.public.fingerprint());
}
