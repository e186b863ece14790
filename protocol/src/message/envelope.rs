//! # Envelope Codec
//!
//! Every message travels as a bincode-encoded [`WireEnvelope`]. The enum
//! tag tells a reader whether it holds a plain [`ProtocolMessage`] or an
//! [`EncryptedProtocolMessage`]; nothing else needs to be sniffed.
//!
//! An encrypted envelope carries the hybrid-encrypted bytes of a complete
//! plain `ProtocolMessage`, so the inner message type and version only
//! become visible after decryption. Its ECDSA signature covers the
//! ciphertext, both public keys, the identifier and the nonce. Status
//! fields are left out so a recipient can answer with a new status without
//! invalidating the sender's signature.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::body::{decode_exact, MessageBody};
use super::params::{EncryptionParameters, MessageInformation};
use super::types::{MessageType, StatusCode};
use crate::config::PROTOCOL_VERSION;
use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::hash::sha256;
use crate::crypto::keys::{ec_public_key_from_pem, ec_secret_key_from_pem};
use crate::crypto::signatures::{ecdsa_sign, ecdsa_verify};
use crate::error::{Bip75Error, Result};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Plain envelope around a serialized body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMessage {
    pub version: u32,
    pub status_code: StatusCode,
    pub status_message: String,
    pub message_type: MessageType,
    pub serialized_message: Vec<u8>,
    pub identifier: Vec<u8>,
}

/// Envelope around an encrypted `ProtocolMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedProtocolMessage {
    /// Uppercase hex payload from [`crate::crypto::encrypt`].
    pub encrypted_message: String,
    pub sender_public_key: String,
    pub receiver_public_key: String,
    /// DER ECDSA signature by the sender's encryption key.
    pub signature: Vec<u8>,
    pub identifier: Vec<u8>,
    pub status_code: StatusCode,
    pub status_message: String,
    /// Unix time in microseconds at creation.
    pub nonce: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireEnvelope {
    Plain(ProtocolMessage),
    Encrypted(EncryptedProtocolMessage),
}

/// Fields covered by the encrypted-envelope signature.
#[derive(Serialize)]
struct SignedFields<'a> {
    encrypted_message: &'a str,
    sender_public_key: &'a str,
    receiver_public_key: &'a str,
    identifier: &'a [u8],
    nonce: i64,
}

impl EncryptedProtocolMessage {
    fn signed_bytes(&self) -> Result<Vec<u8>> {
        let fields = SignedFields {
            encrypted_message: &self.encrypted_message,
            sender_public_key: &self.sender_public_key,
            receiver_public_key: &self.receiver_public_key,
            identifier: &self.identifier,
            nonce: self.nonce,
        };
        bincode::serialize(&fields)
            .map_err(|e| Bip75Error::InvalidObject(format!("cannot encode envelope: {e}")))
    }

    fn verify_signature(&self) -> Result<()> {
        let sender = ec_public_key_from_pem(&self.sender_public_key)?;
        ecdsa_verify(&sender, &self.signed_bytes()?, &self.signature).map_err(|_| {
            Bip75Error::InvalidSignature("encrypted message signature does not verify".to_string())
        })
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Envelope facts reported next to a parsed body.
///
/// The `encrypted_*`, key, signature and nonce fields are set only for
/// encrypted envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMessageMetadata {
    /// Zero for an encrypted envelope that has not been opened.
    pub version: u32,
    pub status_code: StatusCode,
    pub status_message: String,
    pub message_type: MessageType,
    /// Hex identifier.
    pub identifier: String,
    pub encrypted: bool,
    pub encrypted_message: Option<String>,
    pub sender_public_key_pem: Option<String>,
    pub recipient_public_key_pem: Option<String>,
    /// Hex DER signature.
    pub signature: Option<String>,
    pub nonce: Option<i64>,
}

impl From<&ProtocolMessage> for ProtocolMessageMetadata {
    fn from(message: &ProtocolMessage) -> Self {
        Self {
            version: message.version,
            status_code: message.status_code,
            status_message: message.status_message.clone(),
            message_type: message.message_type,
            identifier: hex::encode(&message.identifier),
            encrypted: false,
            encrypted_message: None,
            sender_public_key_pem: None,
            recipient_public_key_pem: None,
            signature: None,
            nonce: None,
        }
    }
}

impl From<&EncryptedProtocolMessage> for ProtocolMessageMetadata {
    fn from(message: &EncryptedProtocolMessage) -> Self {
        Self {
            version: 0,
            status_code: message.status_code,
            status_message: message.status_message.clone(),
            message_type: MessageType::Unknown,
            identifier: hex::encode(&message.identifier),
            encrypted: true,
            encrypted_message: Some(message.encrypted_message.clone()),
            sender_public_key_pem: Some(message.sender_public_key.clone()),
            recipient_public_key_pem: Some(message.receiver_public_key.clone()),
            signature: Some(hex::encode(&message.signature)),
            nonce: Some(message.nonce),
        }
    }
}

/// A body together with its envelope metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Opened {
    pub body: MessageBody,
    pub metadata: ProtocolMessageMetadata,
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

fn encode_envelope(envelope: &WireEnvelope) -> Result<Vec<u8>> {
    bincode::serialize(envelope)
        .map_err(|e| Bip75Error::InvalidObject(format!("cannot encode envelope: {e}")))
}

fn decode_envelope(bytes: &[u8], kind: MessageType) -> Result<WireEnvelope> {
    decode_exact(bytes).map_err(|e| {
        Bip75Error::InvalidObject(format!("bytes are not a valid {kind} message: {e}"))
    })
}

/// `SHA-256(body ‖ timestamp)`, the identifier used when the caller sets none.
fn default_identifier(serialized_body: &[u8]) -> Vec<u8> {
    let mut input = serialized_body.to_vec();
    input.extend_from_slice(&chrono::Utc::now().timestamp_micros().to_be_bytes());
    sha256(&input)
}

/// Wrap a signed body into wire bytes.
///
/// When both `sender` and `recipient` keys are given the message is
/// encrypted to the recipient and signed with the sender's EC key.
pub fn wrap(
    body: &MessageBody,
    information: &MessageInformation,
    sender: Option<&EncryptionParameters>,
    recipient: Option<&EncryptionParameters>,
) -> Result<Vec<u8>> {
    let serialized_message = body.encode()?;
    let identifier = information
        .identifier
        .clone()
        .unwrap_or_else(|| default_identifier(&serialized_message));
    let plain = ProtocolMessage {
        version: PROTOCOL_VERSION,
        status_code: information.status_code,
        status_message: information.status_message.clone(),
        message_type: body.message_type(),
        serialized_message,
        identifier,
    };

    let envelope = match (sender, recipient) {
        (Some(sender), Some(recipient)) => {
            WireEnvelope::Encrypted(seal(&plain, sender, recipient)?)
        }
        _ => WireEnvelope::Plain(plain),
    };
    debug!(
        message_type = %body.message_type(),
        encrypted = matches!(envelope, WireEnvelope::Encrypted(_)),
        "message wrapped"
    );
    encode_envelope(&envelope)
}

fn seal(
    plain: &ProtocolMessage,
    sender: &EncryptionParameters,
    recipient: &EncryptionParameters,
) -> Result<EncryptedProtocolMessage> {
    let sender_private = sender.private_key_pem.as_deref().ok_or_else(|| {
        Bip75Error::Encryption("sender private key required to encrypt".to_string())
    })?;
    let inner = encode_envelope(&WireEnvelope::Plain(plain.clone()))?;
    let encrypted_message = encrypt(
        &inner,
        &recipient.public_key_pem,
        &sender.public_key_pem,
        sender_private,
    )?;

    let mut sealed = EncryptedProtocolMessage {
        encrypted_message,
        sender_public_key: sender.public_key_pem.clone(),
        receiver_public_key: recipient.public_key_pem.clone(),
        signature: Vec::new(),
        identifier: plain.identifier.clone(),
        status_code: plain.status_code,
        status_message: plain.status_message.clone(),
        nonce: chrono::Utc::now().timestamp_micros(),
    };
    let signing_key = ec_secret_key_from_pem(sender_private)?;
    sealed.signature = ecdsa_sign(&signing_key, &sealed.signed_bytes()?);
    Ok(sealed)
}

/// Open wire bytes of any kind: verify and decrypt if encrypted, then
/// decode the body.
pub fn open(bytes: &[u8], recipient: Option<&EncryptionParameters>) -> Result<Opened> {
    open_as(bytes, MessageType::Unknown, recipient)
}

/// Open wire bytes that must hold a body of kind `expected`.
pub fn unwrap(
    bytes: &[u8],
    expected: MessageType,
    recipient: Option<&EncryptionParameters>,
) -> Result<Opened> {
    let opened = open_as(bytes, expected, recipient)?;
    if opened.body.message_type() != expected {
        return Err(Bip75Error::InvalidObject(format!(
            "expected {expected}, envelope holds {}",
            opened.body.message_type()
        )));
    }
    Ok(opened)
}

fn open_as(
    bytes: &[u8],
    kind: MessageType,
    recipient: Option<&EncryptionParameters>,
) -> Result<Opened> {
    match decode_envelope(bytes, kind)? {
        WireEnvelope::Plain(plain) => {
            let body = MessageBody::decode(plain.message_type, &plain.serialized_message)?;
            Ok(Opened {
                body,
                metadata: ProtocolMessageMetadata::from(&plain),
            })
        }
        WireEnvelope::Encrypted(sealed) => {
            if let Err(err) = sealed.verify_signature() {
                warn!(error = %err, "encrypted envelope rejected");
                return Err(err);
            }
            let receiver_private = recipient
                .and_then(|r| r.private_key_pem.as_deref())
                .ok_or_else(|| {
                    Bip75Error::Encryption("recipient keys required to decrypt".to_string())
                })?;
            let inner = decrypt(
                &sealed.encrypted_message,
                receiver_private,
                &sealed.sender_public_key,
            )?;
            let plain = match decode_envelope(&inner, kind)? {
                WireEnvelope::Plain(plain) => plain,
                WireEnvelope::Encrypted(_) => {
                    return Err(Bip75Error::InvalidObject(
                        "encrypted envelope nested inside an encrypted envelope".to_string(),
                    ))
                }
            };
            if plain.identifier != sealed.identifier {
                return Err(Bip75Error::InvalidObject(
                    "encrypted envelope identifier does not match the inner message".to_string(),
                ));
            }
            let body = MessageBody::decode(plain.message_type, &plain.serialized_message)?;

            let mut metadata = ProtocolMessageMetadata::from(&sealed);
            metadata.version = plain.version;
            metadata.message_type = plain.message_type;
            Ok(Opened { body, metadata })
        }
    }
}

/// Envelope metadata without opening the body.
pub fn extract_metadata(bytes: &[u8]) -> Result<ProtocolMessageMetadata> {
    Ok(match decode_envelope(bytes, MessageType::Unknown)? {
        WireEnvelope::Plain(plain) => ProtocolMessageMetadata::from(&plain),
        WireEnvelope::Encrypted(sealed) => ProtocolMessageMetadata::from(&sealed),
    })
}

/// Rewrite the status fields of an envelope and nothing else.
pub fn change_status(bytes: &[u8], code: StatusCode, message: &str) -> Result<Vec<u8>> {
    let envelope = match decode_envelope(bytes, MessageType::Unknown)? {
        WireEnvelope::Plain(mut plain) => {
            plain.status_code = code;
            plain.status_message = message.to_string();
            WireEnvelope::Plain(plain)
        }
        WireEnvelope::Encrypted(mut sealed) => {
            sealed.status_code = code;
            sealed.status_message = message.to_string();
            WireEnvelope::Encrypted(sealed)
        }
    };
    debug!(status = %code, "message status changed");
    encode_envelope(&envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::body::{Payment, PaymentAck};
    use crate::test_support::fixture;

    fn body() -> MessageBody {
        MessageBody::Payment(Payment {
            memo: "payment memo".to_string(),
            transactions: vec![vec![1, 2, 3]],
            ..Payment::default()
        })
    }

    fn sender_keys() -> EncryptionParameters {
        EncryptionParameters::new(fixture::SENDER_EC_KEY, fixture::SENDER_EC_PUB)
    }

    fn recipient_keys() -> EncryptionParameters {
        EncryptionParameters::new(fixture::RECIPIENT_EC_KEY, fixture::RECIPIENT_EC_PUB)
    }

    fn encrypted_bytes() -> Vec<u8> {
        wrap(
            &body(),
            &MessageInformation::default(),
            Some(&sender_keys()),
            Some(&EncryptionParameters::public_only(fixture::RECIPIENT_EC_PUB)),
        )
        .unwrap()
    }

    #[test]
    fn test_plain_round_trip() {
        let info = MessageInformation {
            identifier: Some(b"id-1".to_vec()),
            ..MessageInformation::default()
        };
        let bytes = wrap(&body(), &info, None, None).unwrap();
        let opened = unwrap(&bytes, MessageType::Payment, None).unwrap();
        assert_eq!(opened.body, body());
        assert_eq!(opened.metadata.identifier, hex::encode(b"id-1"));
        assert_eq!(opened.metadata.version, PROTOCOL_VERSION);
        assert_eq!(opened.metadata.status_message, "OK");
        assert!(!opened.metadata.encrypted);
    }

    #[test]
    fn test_default_identifier_is_sha256_sized() {
        let bytes = wrap(&body(), &MessageInformation::default(), None, None).unwrap();
        let metadata = extract_metadata(&bytes).unwrap();
        assert_eq!(metadata.identifier.len(), 64);
    }

    #[test]
    fn test_message_type_mismatch_is_invalid_object() {
        let bytes = wrap(&body(), &MessageInformation::default(), None, None).unwrap();
        let err = unwrap(&bytes, MessageType::PaymentAck, None).unwrap_err();
        assert!(matches!(err, Bip75Error::InvalidObject(_)));
    }

    #[test]
    fn test_garbage_bytes_name_the_expected_kind() {
        let err = unwrap(b"not an envelope", MessageType::InvoiceRequest, None).unwrap_err();
        assert!(matches!(&err, Bip75Error::InvalidObject(msg) if msg.contains("InvoiceRequest")));
    }

    #[test]
    fn test_encrypted_round_trip() {
        let bytes = encrypted_bytes();
        let metadata = extract_metadata(&bytes).unwrap();
        assert!(metadata.encrypted);
        assert_eq!(metadata.message_type, MessageType::Unknown);
        assert!(metadata.nonce.unwrap() > 0);

        let opened = unwrap(&bytes, MessageType::Payment, Some(&recipient_keys())).unwrap();
        assert_eq!(opened.body, body());
        assert_eq!(opened.metadata.message_type, MessageType::Payment);
        assert_eq!(opened.metadata.version, PROTOCOL_VERSION);
        assert_eq!(
            opened.metadata.sender_public_key_pem.as_deref(),
            Some(fixture::SENDER_EC_PUB)
        );
    }

    #[test]
    fn test_encrypted_without_recipient_keys_fails() {
        let bytes = encrypted_bytes();
        let err = unwrap(&bytes, MessageType::Payment, None).unwrap_err();
        assert!(matches!(&err, Bip75Error::Encryption(msg) if msg.contains("recipient keys required")));
    }

    #[test]
    fn test_encrypted_with_wrong_recipient_fails() {
        let bytes = encrypted_bytes();
        let wrong = EncryptionParameters::new(fixture::OTHER_EC_KEY, fixture::OTHER_EC_PUB);
        assert!(matches!(
            unwrap(&bytes, MessageType::Payment, Some(&wrong)),
            Err(Bip75Error::Encryption(_))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails_outer_signature() {
        let bytes = encrypted_bytes();
        let WireEnvelope::Encrypted(mut sealed) = bincode::deserialize(&bytes).unwrap() else {
            panic!("expected encrypted envelope");
        };
        sealed.nonce += 1;
        let tampered = bincode::serialize(&WireEnvelope::Encrypted(sealed)).unwrap();
        assert!(matches!(
            unwrap(&tampered, MessageType::Payment, Some(&recipient_keys())),
            Err(Bip75Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_are_invalid_object() {
        let mut bytes = wrap(&body(), &MessageInformation::default(), None, None).unwrap();
        bytes.push(0);
        assert!(matches!(
            unwrap(&bytes, MessageType::Payment, None),
            Err(Bip75Error::InvalidObject(_))
        ));

        let mut encrypted = encrypted_bytes();
        encrypted.push(0);
        assert!(matches!(extract_metadata(&encrypted), Err(Bip75Error::InvalidObject(_))));
    }

    #[test]
    fn test_appended_body_byte_is_invalid_object() {
        let bytes = wrap(&body(), &MessageInformation::default(), None, None).unwrap();
        let WireEnvelope::Plain(mut plain) = bincode::deserialize(&bytes).unwrap() else {
            panic!("expected plain envelope");
        };
        plain.serialized_message.push(0);
        let tampered = encode_envelope(&WireEnvelope::Plain(plain)).unwrap();
        assert!(matches!(
            unwrap(&tampered, MessageType::Payment, None),
            Err(Bip75Error::InvalidObject(_))
        ));
    }

    #[test]
    fn test_inner_identifier_must_match_outer() {
        let plain = ProtocolMessage {
            version: PROTOCOL_VERSION,
            status_code: StatusCode::Ok,
            status_message: "OK".to_string(),
            message_type: MessageType::Payment,
            serialized_message: body().encode().unwrap(),
            identifier: b"inner".to_vec(),
        };
        let mut sealed = seal(&plain, &sender_keys(), &recipient_keys()).unwrap();
        sealed.identifier = b"outer".to_vec();
        let key = ec_secret_key_from_pem(fixture::SENDER_EC_KEY).unwrap();
        sealed.signature = ecdsa_sign(&key, &sealed.signed_bytes().unwrap());
        let bytes = encode_envelope(&WireEnvelope::Encrypted(sealed)).unwrap();

        let err = unwrap(&bytes, MessageType::Payment, Some(&recipient_keys())).unwrap_err();
        assert!(matches!(&err, Bip75Error::InvalidObject(msg) if msg.contains("identifier")));
    }

    #[test]
    fn test_sender_without_private_key_cannot_encrypt() {
        let sender = EncryptionParameters::public_only(fixture::SENDER_EC_PUB);
        let err = wrap(
            &body(),
            &MessageInformation::default(),
            Some(&sender),
            Some(&recipient_keys()),
        )
        .unwrap_err();
        assert!(matches!(err, Bip75Error::Encryption(_)));
    }

    #[test]
    fn test_change_status_plain() {
        let bytes = wrap(&body(), &MessageInformation::default(), None, None).unwrap();
        let changed = change_status(&bytes, StatusCode::Cancel, "cancelled").unwrap();
        let metadata = extract_metadata(&changed).unwrap();
        assert_eq!(metadata.status_code, StatusCode::Cancel);
        assert_eq!(metadata.status_message, "cancelled");
        assert_eq!(unwrap(&changed, MessageType::Payment, None).unwrap().body, body());
    }

    #[test]
    fn test_change_status_keeps_encrypted_signature_valid() {
        let changed =
            change_status(&encrypted_bytes(), StatusCode::AmountTooLow, "too low").unwrap();
        let opened = unwrap(&changed, MessageType::Payment, Some(&recipient_keys())).unwrap();
        assert_eq!(opened.metadata.status_code, StatusCode::AmountTooLow);
        assert_eq!(opened.metadata.status_message, "too low");
    }

    #[test]
    fn test_open_detects_kind() {
        let ack = MessageBody::PaymentAck(PaymentAck::default());
        let bytes = wrap(&ack, &MessageInformation::default(), None, None).unwrap();
        assert_eq!(open(&bytes, None).unwrap().body.message_type(), MessageType::PaymentAck);
    }
}
