//! # CLI Interface
//!
//! Defines the command-line argument structure for `bip75` using `clap`
//! derive. Six subcommands: `inspect`, `validate`, `parse`, `set-status`,
//! `keygen` and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// BIP75 payment protocol tooling.
///
/// Inspects, validates and decodes InvoiceRequest, PaymentRequest, Payment
/// and PaymentAck messages stored as raw wire bytes.
#[derive(Parser, Debug)]
#[command(
    name = "bip75",
    about = "BIP75 payment protocol tooling",
    version,
    propagate_version = true
)]
pub struct Bip75Cli {
    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "BIP75_LOG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v, -vv, -vvv). Ignored when `RUST_LOG` is set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print envelope metadata as JSON without opening the body.
    Inspect(InspectArgs),
    /// Detect the message kind and run full validation.
    Validate(ValidateArgs),
    /// Print the decoded body and metadata as JSON, without validating.
    Parse(ParseArgs),
    /// Rewrite the status code and message of a stored message.
    SetStatus(SetStatusArgs),
    /// Write a fresh secp256k1 encryption key pair as PEM files.
    Keygen(KeygenArgs),
    /// Print version information and exit.
    Version,
}

/// Keys used to open an encrypted envelope.
#[derive(Args, Debug, Default)]
pub struct RecipientKeyArgs {
    /// PEM file with the recipient's secp256k1 private key.
    #[arg(long, requires = "recipient_public_key")]
    pub recipient_private_key: Option<PathBuf>,

    /// PEM file with the recipient's secp256k1 public key.
    #[arg(long)]
    pub recipient_public_key: Option<PathBuf>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Message file (raw wire bytes).
    pub file: PathBuf,
}

/// Arguments for the `validate` subcommand.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Message file (raw wire bytes).
    pub file: PathBuf,

    /// Directory of trusted chain files, one root plus intermediates each.
    #[arg(long, short = 't', env = "BIP75_TRUST_STORE")]
    pub trust_store: PathBuf,

    #[command(flatten)]
    pub keys: RecipientKeyArgs,
}

/// Arguments for the `parse` subcommand.
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Message file (raw wire bytes).
    pub file: PathBuf,

    #[command(flatten)]
    pub keys: RecipientKeyArgs,
}

/// Arguments for the `set-status` subcommand.
#[derive(Parser, Debug)]
pub struct SetStatusArgs {
    /// Message file (raw wire bytes).
    pub file: PathBuf,

    /// Numeric status code, e.g. 1 (OK), 2 (Cancel), 300 (Certificate Required).
    #[arg(long)]
    pub code: u32,

    /// Human-readable status message.
    #[arg(long, default_value = "")]
    pub message: String,

    /// Where to write the rewritten message.
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}

/// Arguments for the `keygen` subcommand.
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Directory receiving `private.pem` and `public.pem`.
    #[arg(long, short = 'o')]
    pub out_dir: PathBuf,

    /// Overwrite existing key files.
    #[arg(long)]
    pub force: bool,
}
