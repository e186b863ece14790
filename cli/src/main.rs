// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # bip75
//!
//! Entry point for the `bip75` binary. Parses CLI arguments, initializes
//! logging and runs one subcommand against message files on disk.
//!
//! - `inspect`    — envelope metadata as JSON
//! - `validate`   — full validation against a trust store
//! - `parse`      — decoded body and metadata as JSON
//! - `set-status` — rewrite the status of a stored message
//! - `keygen`     — fresh secp256k1 encryption key pair
//! - `version`    — print build version information

mod cli;
mod logging;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;

use bip75_protocol::crypto::generate_ec_key_pair;
use bip75_protocol::message::envelope;
use bip75_protocol::{Bip75, EncryptionParameters, RecipientParameters, StatusCode};

use cli::{Bip75Cli, Commands, RecipientKeyArgs};

const PRIVATE_KEY_FILE: &str = "private.pem";
const PUBLIC_KEY_FILE: &str = "public.pem";

fn main() -> Result<()> {
    let cli = Bip75Cli::parse();
    logging::init_logging(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Inspect(args) => inspect(&args.file),
        Commands::Validate(args) => validate(args),
        Commands::Parse(args) => parse(args),
        Commands::SetStatus(args) => set_status(args),
        Commands::Keygen(args) => keygen(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn read_message(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read message file {}", path.display()))
}

fn read_pem(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read key file {}", path.display()))
}

/// Recipient built from the optional key flags; `None` when no key was given.
fn recipient_parameters(keys: &RecipientKeyArgs) -> Result<Option<RecipientParameters>> {
    let Some(public_path) = &keys.recipient_public_key else {
        return Ok(None);
    };
    let public_key_pem = read_pem(public_path)?;
    let encryption = match &keys.recipient_private_key {
        Some(private_path) => EncryptionParameters::new(read_pem(private_path)?, public_key_pem),
        None => EncryptionParameters::public_only(public_key_pem),
    };
    Ok(Some(RecipientParameters {
        encryption_parameters: Some(encryption),
        ..RecipientParameters::default()
    }))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let bytes = read_message(path)?;
    let metadata = envelope::extract_metadata(&bytes)
        .with_context(|| format!("{} is not a BIP75 message", path.display()))?;
    print_json(&serde_json::to_value(metadata)?)
}

fn validate(args: cli::ValidateArgs) -> Result<()> {
    let bytes = read_message(&args.file)?;
    let recipient = recipient_parameters(&args.keys)?;
    let bip75 = Bip75::from_trust_store(&args.trust_store).with_context(|| {
        format!("failed to load trust store {}", args.trust_store.display())
    })?;

    let message_type = bip75.message_type(&bytes, recipient.as_ref())?;
    tracing::info!(%message_type, file = %args.file.display(), "validating message");

    match bip75.is_valid(&bytes, recipient.as_ref()) {
        Ok(_) => print_json(&json!({
            "valid": true,
            "message_type": message_type.to_string(),
        })),
        Err(err) => {
            print_json(&json!({
                "valid": false,
                "message_type": message_type.to_string(),
                "error": err.to_string(),
            }))?;
            bail!("{} failed validation", args.file.display())
        }
    }
}

fn parse(args: cli::ParseArgs) -> Result<()> {
    let bytes = read_message(&args.file)?;
    let recipient = recipient_parameters(&args.keys)?;
    let opened = envelope::open(
        &bytes,
        recipient.as_ref().and_then(|r| r.encryption_parameters.as_ref()),
    )?;
    print_json(&json!({
        "metadata": opened.metadata,
        "body": opened.body,
    }))
}

fn set_status(args: cli::SetStatusArgs) -> Result<()> {
    let code = StatusCode::try_from(args.code).map_err(anyhow::Error::msg)?;
    let bytes = read_message(&args.file)?;
    let changed = envelope::change_status(&bytes, code, &args.message)?;
    fs::write(&args.out, changed)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    tracing::info!(%code, out = %args.out.display(), "status changed");
    Ok(())
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let private_path = args.out_dir.join(PRIVATE_KEY_FILE);
    let public_path = args.out_dir.join(PUBLIC_KEY_FILE);
    if !args.force && (private_path.exists() || public_path.exists()) {
        bail!(
            "key files already exist in {} (use --force to overwrite)",
            args.out_dir.display()
        );
    }

    let pair = generate_ec_key_pair()?;
    fs::write(&private_path, pair.private_key_pem)
        .with_context(|| format!("failed to write {}", private_path.display()))?;
    fs::write(&public_path, pair.public_key_pem)
        .with_context(|| format!("failed to write {}", public_path.display()))?;

    tracing::info!(dir = %args.out_dir.display(), "encryption key pair written");
    println!("{}", public_path.display());
    Ok(())
}

fn print_version() {
    println!("bip75 {}", env!("CARGO_PKG_VERSION"));
    println!(
        "envelope version {}",
        bip75_protocol::config::PROTOCOL_VERSION
    );
}
