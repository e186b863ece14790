//! Error types for the BIP75 message engine.
//!
//! Every create, validate and parse operation returns a [`Bip75Error`] on
//! failure. The variants follow the failure taxonomy of the protocol: a
//! caller can always tell *which* check rejected a message.

use thiserror::Error;

use crate::crypto::encryption::EncryptionError;
use crate::crypto::keys::KeyError;
use crate::crypto::signatures::SignatureError;
use crate::message::address::AddressInformationError;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Bip75Error>;

/// Errors raised by the BIP75 engine.
#[derive(Debug, Error)]
pub enum Bip75Error {
    /// Wire bytes could not be decoded as the expected message kind.
    #[error("invalid object: {0}")]
    InvalidObject(String),

    /// A sender, attestation or envelope signature is missing or does not verify.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A single certificate is malformed or fails a structural/EV check.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// A certificate cannot be rooted in a trusted chain, or the trust
    /// store itself breaks the self-signed invariants.
    #[error("invalid certificate chain: {0}")]
    InvalidCertificateChain(String),

    /// An owner list does not contain exactly one primary owner.
    #[error("invalid owners: {0}")]
    InvalidOwners(String),

    /// Missing encryption keys, MAC mismatch, malformed ciphertext, or a
    /// cipher failure.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// A private or public key supplied by the caller could not be decoded.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The operation is not available for this message kind or configuration.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The external address-information provider failed.
    #[error(transparent)]
    AddressInformation(#[from] AddressInformationError),
}

impl From<EncryptionError> for Bip75Error {
    fn from(err: EncryptionError) -> Self {
        Bip75Error::Encryption(err.to_string())
    }
}

impl From<KeyError> for Bip75Error {
    fn from(err: KeyError) -> Self {
        Bip75Error::InvalidKey(err.to_string())
    }
}

impl From<SignatureError> for Bip75Error {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::Key(key) => key.into(),
            other => Bip75Error::InvalidSignature(other.to_string()),
        }
    }
}
