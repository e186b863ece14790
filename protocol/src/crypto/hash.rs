//! # Hashing Utilities
//!
//! SHA-256 is the message digest of the protocol: attestation and sender
//! signatures are computed over the hex-encoded SHA-256 of a body with its
//! signatures blanked, and the default message identifier is a SHA-256 too.
//!
//! SHA-512 only appears as the key-derivation step of the hybrid encryption
//! scheme, where its 64-byte output is split into an AES key and a MAC key.

use sha2::{Digest, Sha256, Sha512};

/// Compute the SHA-256 hash of the input data.
///
/// ```
/// use bip75_protocol::crypto::sha256;
///
/// let hash = sha256(b"bip75");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// SHA-256 rendered as lowercase hex.
///
/// This string, not the raw digest, is what signers feed to RSA-SHA256.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Compute the SHA-512 hash and return a fixed-size array.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let mut output = [0u8; 64];
    output.copy_from_slice(&hasher.finalize());
    output
}
