//! # Digital Signatures
//!
//! Two signature schemes, each with exactly one job:
//!
//! - **RSA PKCS#1 v1.5 with SHA-256** signs message bodies (sender level)
//!   and attestations (owner level). The signed input is the hex SHA-256 of
//!   the body with signatures blanked, so the RSA layer hashes a hash.
//!   Counterparties compute it the same way; do not "simplify" it.
//! - **ECDSA over secp256k1 with SHA-256** signs the encrypted envelope with
//!   the same EC key that performed the ECDH exchange.
//!
//! Signatures travel as lowercase hex strings (RSA) or raw DER bytes (ECDSA).
//! The algorithm is chosen by the function called; there is no global
//! provider registry to initialise first.

use k256::ecdsa::{Signature as EcdsaSignature, SigningKey as EcdsaSigningKey};
use k256::ecdsa::VerifyingKey as EcdsaVerifyingKey;
use k256::{PublicKey, SecretKey};
use rsa::pkcs1v15::{Signature as RsaSignature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

use super::keys::{rsa_private_key_from_pem, KeyError};

/// Errors during signature operations.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("malformed signature: {0}")]
    Malformed(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

// ---------------------------------------------------------------------------
// RSA-SHA256
// ---------------------------------------------------------------------------

/// Sign `message` with RSA-SHA256 and return the signature as hex.
pub fn rsa_sign(private_key: &RsaPrivateKey, message: &[u8]) -> String {
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key.sign(message);
    hex::encode(signature.to_bytes())
}

/// Sign with a key given as PEM. Convenience for callers holding parameters.
pub fn rsa_sign_with_pem(private_key_pem: &str, message: &[u8]) -> Result<String, SignatureError> {
    let key = rsa_private_key_from_pem(private_key_pem)?;
    Ok(rsa_sign(&key, message))
}

/// Verify a hex-encoded RSA-SHA256 signature.
///
/// Malformed hex is reported separately from a signature that simply does
/// not verify, so diagnostics can tell truncation from tampering.
pub fn rsa_verify(
    public_key: &RsaPublicKey,
    message: &[u8],
    signature_hex: &str,
) -> Result<(), SignatureError> {
    let bytes =
        hex::decode(signature_hex).map_err(|e| SignatureError::Malformed(e.to_string()))?;
    rsa_verify_raw(public_key, message, &bytes)
}

/// Verify raw RSA-SHA256 signature bytes.
pub fn rsa_verify_raw(
    public_key: &RsaPublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), SignatureError> {
    let signature = RsaSignature::try_from(signature)
        .map_err(|e| SignatureError::Malformed(e.to_string()))?;
    VerifyingKey::<Sha256>::new(public_key.clone())
        .verify(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

// ---------------------------------------------------------------------------
// ECDSA-secp256k1
// ---------------------------------------------------------------------------

/// Sign `message` with ECDSA/secp256k1 (SHA-256 digest), DER-encoded.
pub fn ecdsa_sign(secret_key: &SecretKey, message: &[u8]) -> Vec<u8> {
    let signing_key = EcdsaSigningKey::from(secret_key);
    let signature: EcdsaSignature = signing_key.sign(message);
    signature.to_der().as_bytes().to_vec()
}

/// Verify a DER-encoded ECDSA/secp256k1 signature.
pub fn ecdsa_verify(
    public_key: &PublicKey,
    message: &[u8],
    signature_der: &[u8],
) -> Result<(), SignatureError> {
    let signature = EcdsaSignature::from_der(signature_der)
        .map_err(|e| SignatureError::Malformed(e.to_string()))?;
    EcdsaVerifyingKey::from(public_key)
        .verify(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}
