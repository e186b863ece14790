//! # Hybrid ECDH Encryption
//!
//! End-to-end protection for message bodies exchanged between a sender and a
//! recipient who each hold a secp256k1 key pair.
//!
//! ```text
//!   ECDH(sender_priv, recipient_pub) ──► x-coordinate (32 bytes)
//!                                         │
//!                                      SHA-512
//!                                         │
//!                    ┌────────────────────┴───────────────────┐
//!               bytes 0..32                              bytes 32..64
//!                AES key                                   MAC key
//!                    │                                         │
//!   AES-256-CBC(PKCS#7, IV = 0^16)                 HMAC-SHA1(IV ‖ pub ‖ ct)
//! ```
//!
//! ## Wire format
//!
//! One uppercase hex string:
//!
//! ```text
//! [0, 130)    sender public key, uncompressed (65 bytes)
//! [130, 170)  HMAC-SHA1 tag (20 bytes)
//! [170, ..)   AES-256-CBC ciphertext
//! ```
//!
//! ## Fixed IV
//!
//! The IV is sixteen zero bytes for every message. Identical plaintext
//! prefixes under the same key pair produce identical ciphertext prefixes.
//! Existing counterparties derive the IV the same way, so changing it is a
//! wire-format break and needs a protocol version bump, not a patch.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use k256::ecdh::diffie_hellman;
use k256::{PublicKey, SecretKey};
use sha1::Sha1;
use thiserror::Error;

use super::hash::sha512;
use super::keys::{
    ec_public_key_from_pem, ec_public_key_from_sec1, ec_public_key_uncompressed,
    ec_secret_key_from_pem,
};
use crate::config::{AES_IV_LENGTH, AES_KEY_LENGTH, HEX_MAC_END, HEX_PUBLIC_KEY_END};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha1 = Hmac<Sha1>;

const ZERO_IV: [u8; AES_IV_LENGTH] = [0u8; AES_IV_LENGTH];

/// Errors that can occur during encryption or decryption.
///
/// Each variant keeps the underlying cause as text so a failed exchange can
/// be diagnosed without exposing key material.
#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("malformed ciphertext: {0}")]
    Malformed(String),

    #[error("Mac invalid")]
    MacInvalid,

    #[error("cipher failure: {0}")]
    Cipher(String),
}

/// Symmetric keys derived from one ECDH exchange.
struct DerivedKeys {
    aes_key: [u8; AES_KEY_LENGTH],
    mac_key: [u8; AES_KEY_LENGTH],
}

fn derive_keys(secret: &SecretKey, peer: &PublicKey) -> DerivedKeys {
    let shared = diffie_hellman(secret.to_nonzero_scalar(), peer.as_affine());
    let digest = sha512(shared.raw_secret_bytes());
    let mut aes_key = [0u8; AES_KEY_LENGTH];
    let mut mac_key = [0u8; AES_KEY_LENGTH];
    aes_key.copy_from_slice(&digest[..AES_KEY_LENGTH]);
    mac_key.copy_from_slice(&digest[AES_KEY_LENGTH..]);
    DerivedKeys { aes_key, mac_key }
}

fn mac_for(
    mac_key: &[u8],
    sender_public: &[u8],
    ciphertext: &[u8],
) -> Result<HmacSha1, EncryptionError> {
    let mut mac = HmacSha1::new_from_slice(mac_key)
        .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;
    mac.update(&ZERO_IV);
    mac.update(sender_public);
    mac.update(ciphertext);
    Ok(mac)
}

/// Encrypt `plaintext` for the holder of `recipient_public_key_pem`.
///
/// `sender_public_key_pem` must be the public half of
/// `sender_private_key_pem`; it is embedded in the output so the recipient
/// can re-derive the shared secret.
pub fn encrypt(
    plaintext: &[u8],
    recipient_public_key_pem: &str,
    sender_public_key_pem: &str,
    sender_private_key_pem: &str,
) -> Result<String, EncryptionError> {
    let recipient_public = ec_public_key_from_pem(recipient_public_key_pem)
        .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;
    let sender_public = ec_public_key_from_pem(sender_public_key_pem)
        .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;
    let sender_secret = ec_secret_key_from_pem(sender_private_key_pem)
        .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;

    let keys = derive_keys(&sender_secret, &recipient_public);

    let ciphertext = Aes256CbcEnc::new_from_slices(&keys.aes_key, &ZERO_IV)
        .map_err(|e| EncryptionError::Cipher(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let sender_public_bytes = ec_public_key_uncompressed(&sender_public);
    let tag = mac_for(&keys.mac_key, &sender_public_bytes, &ciphertext)?
        .finalize()
        .into_bytes();

    let mut out = String::with_capacity(HEX_MAC_END + ciphertext.len() * 2);
    out.push_str(&hex::encode_upper(sender_public_bytes));
    out.push_str(&hex::encode_upper(tag));
    out.push_str(&hex::encode_upper(&ciphertext));
    Ok(out)
}

/// Decrypt a payload produced by [`encrypt`].
///
/// Keys are re-derived from `receiver_private_key_pem` and
/// `sender_public_key_pem`; the embedded public key only feeds the MAC.
pub fn decrypt(
    payload: &str,
    receiver_private_key_pem: &str,
    sender_public_key_pem: &str,
) -> Result<Vec<u8>, EncryptionError> {
    if !payload.is_ascii() {
        return Err(EncryptionError::Malformed("payload is not hex".to_string()));
    }
    if payload.len() < HEX_MAC_END {
        return Err(EncryptionError::Malformed(format!(
            "payload is {} hex chars, need at least {}",
            payload.len(),
            HEX_MAC_END
        )));
    }

    let embedded_public = hex::decode(&payload[..HEX_PUBLIC_KEY_END])
        .map_err(|e| EncryptionError::Malformed(format!("public key segment: {e}")))?;
    let embedded_mac = hex::decode(&payload[HEX_PUBLIC_KEY_END..HEX_MAC_END])
        .map_err(|e| EncryptionError::Malformed(format!("mac segment: {e}")))?;
    let ciphertext = hex::decode(&payload[HEX_MAC_END..])
        .map_err(|e| EncryptionError::Malformed(format!("ciphertext segment: {e}")))?;

    ec_public_key_from_sec1(&embedded_public)
        .map_err(|e| EncryptionError::Malformed(e.to_string()))?;

    let receiver_secret = ec_secret_key_from_pem(receiver_private_key_pem)
        .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;
    let sender_public = ec_public_key_from_pem(sender_public_key_pem)
        .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;

    let keys = derive_keys(&receiver_secret, &sender_public);

    mac_for(&keys.mac_key, &embedded_public, &ciphertext)?
        .verify_slice(&embedded_mac)
        .map_err(|_| EncryptionError::MacInvalid)?;

    Aes256CbcDec::new_from_slices(&keys.aes_key, &ZERO_IV)
        .map_err(|e| EncryptionError::Cipher(e.to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|e| EncryptionError::Cipher(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::generate_ec_key_pair;
    use crate::test_support::fixture;

    fn seal(plaintext: &[u8]) -> String {
        encrypt(
            plaintext,
            fixture::RECIPIENT_EC_PUB,
            fixture::SENDER_EC_PUB,
            fixture::SENDER_EC_KEY,
        )
        .unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let sealed = seal(b"serialized invoice request");
        let opened =
            decrypt(&sealed, fixture::RECIPIENT_EC_KEY, fixture::SENDER_EC_PUB).unwrap();
        assert_eq!(opened, b"serialized invoice request");
    }

    #[test]
    fn test_roundtrip_with_generated_keys() {
        let sender = generate_ec_key_pair().unwrap();
        let recipient = generate_ec_key_pair().unwrap();
        let cases: Vec<Vec<u8>> = vec![vec![], b"x".to_vec(), vec![0xAB; 16], vec![7u8; 4096]];
        for plaintext in &cases {
            let sealed = encrypt(
                plaintext,
                &recipient.public_key_pem,
                &sender.public_key_pem,
                &sender.private_key_pem,
            )
            .unwrap();
            let opened =
                decrypt(&sealed, &recipient.private_key_pem, &sender.public_key_pem).unwrap();
            assert_eq!(&opened, plaintext);
        }
    }

    #[test]
    fn test_output_layout() {
        let sealed = seal(b"0123456789abcdef");
        // A full block of input gains a full block of padding.
        assert_eq!(sealed.len(), HEX_MAC_END + 32 * 2);
        assert!(sealed.starts_with("04"));
        assert_eq!(sealed, sealed.to_uppercase());
        let embedded_pub = hex::decode(&sealed[..HEX_PUBLIC_KEY_END]).unwrap();
        let sender_pub = ec_public_key_from_pem(fixture::SENDER_EC_PUB).unwrap();
        assert_eq!(embedded_pub, ec_public_key_uncompressed(&sender_pub));
    }

    #[test]
    fn test_fixed_iv_is_deterministic() {
        assert_eq!(seal(b"same"), seal(b"same"));
    }

    #[test]
    fn test_wrong_receiver_key_fails_mac() {
        let sealed = seal(b"secret");
        let err = decrypt(&sealed, fixture::OTHER_EC_KEY, fixture::SENDER_EC_PUB).unwrap_err();
        assert!(matches!(err, EncryptionError::MacInvalid));
        assert_eq!(err.to_string(), "Mac invalid");
    }

    #[test]
    fn test_wrong_sender_public_key_fails_mac() {
        let sealed = seal(b"secret");
        let err =
            decrypt(&sealed, fixture::RECIPIENT_EC_KEY, fixture::OTHER_EC_PUB).unwrap_err();
        assert!(matches!(err, EncryptionError::MacInvalid));
    }

    #[test]
    fn test_tampered_ciphertext_fails_mac() {
        let mut sealed = seal(b"secret payload").into_bytes();
        let last = sealed.len() - 1;
        sealed[last] = if sealed[last] == b'0' { b'1' } else { b'0' };
        let sealed = String::from_utf8(sealed).unwrap();
        let err =
            decrypt(&sealed, fixture::RECIPIENT_EC_KEY, fixture::SENDER_EC_PUB).unwrap_err();
        assert!(matches!(err, EncryptionError::MacInvalid));
    }

    #[test]
    fn test_short_payload_is_malformed() {
        let err = decrypt("04ABCD", fixture::RECIPIENT_EC_KEY, fixture::SENDER_EC_PUB).unwrap_err();
        assert!(matches!(err, EncryptionError::Malformed(_)));
    }

    #[test]
    fn test_non_hex_payload_is_malformed() {
        let junk = "Z".repeat(HEX_MAC_END + 32);
        let err = decrypt(&junk, fixture::RECIPIENT_EC_KEY, fixture::SENDER_EC_PUB).unwrap_err();
        assert!(matches!(err, EncryptionError::Malformed(_)));
    }

    #[test]
    fn test_rsa_key_is_rejected() {
        let err = encrypt(
            b"x",
            fixture::RECIPIENT_EC_PUB,
            fixture::SENDER_EC_PUB,
            fixture::SENDER_KEY,
        )
        .unwrap_err();
        assert!(matches!(err, EncryptionError::InvalidKey(_)));
    }
}
