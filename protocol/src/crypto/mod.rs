//! # Cryptographic Primitives
//!
//! Everything security-related in the engine flows through here:
//!
//! - **SHA-256 / SHA-512** for message digests and key derivation.
//! - **RSA PKCS#1 v1.5 + SHA-256** for sender and attestation signatures.
//! - **ECDSA secp256k1** for the encrypted-envelope signature.
//! - **ECDH secp256k1 + AES-256-CBC + HMAC-SHA1** for body encryption.
//!
//! Each function takes its keys and picks its algorithm explicitly. Nothing
//! here needs to be initialised before use, and nothing is global.

pub mod encryption;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use encryption::{decrypt, encrypt};
pub use hash::{sha256, sha256_hex, sha512};
pub use keys::{generate_ec_key_pair, EcKeyPairPem};
pub use signatures::{ecdsa_sign, ecdsa_verify, rsa_sign, rsa_verify};
