//! # Message Processors
//!
//! One processor per message kind, each driving the full pipeline:
//!
//! ```text
//! create:  parameters → owners checked → body → attestations signed
//!          → sender signed → envelope (encrypted on request)
//! read:    envelope → [outer signature, decrypt] → body
//!          → sender chain + signature → sender EV → owner attestations
//! ```
//!
//! The read side is shared through [`MessageProcessor`]; only `create`
//! differs per kind. [`Bip75`] owns the trust set and the optional
//! address-information provider and hands out processors.

pub mod facade;
pub mod invoice_request;
pub mod payment;
pub mod payment_ack;
pub mod payment_request;

use tracing::{debug, warn};

use crate::crypto::signatures::{rsa_sign_with_pem, rsa_verify};
use crate::error::{Bip75Error, Result};
use crate::message::address::AddressInformationProvider;
use crate::message::attestation::{sign_attestations, verify_attestations};
use crate::message::body::{MessageBody, Output, OwnerRole};
use crate::message::envelope::{self, ProtocolMessageMetadata};
use crate::message::params::{
    EncryptionParameters, MessageInformation, OwnerParameters, RecipientParameters,
    SenderParameters,
};
use crate::message::types::{MessageType, PkiType};
use crate::pki::{public_key_from_certificate_pem, CertificateValidator};

pub use facade::Bip75;
pub use invoice_request::{InvoiceRequestParameters, InvoiceRequestProcessor};
pub use payment::{PaymentParameters, PaymentProcessor};
pub use payment_ack::{PaymentAckParameters, PaymentAckProcessor};
pub use payment_request::{PaymentRequestParameters, PaymentRequestProcessor};

/// A decoded body and its envelope metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub body: T,
    pub metadata: ProtocolMessageMetadata,
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Validation and parsing for one message kind.
pub trait MessageProcessor {
    type Body;

    const MESSAGE_TYPE: MessageType;

    fn validator(&self) -> &CertificateValidator;

    fn address_provider(&self) -> Option<&dyn AddressInformationProvider>;

    /// Extract this processor's body from a decoded [`MessageBody`].
    fn into_body(body: MessageBody) -> Result<Self::Body>;

    /// Verify every signature and certificate in `bytes`.
    ///
    /// Returns `Ok(true)` or the error of the first check that failed.
    fn is_valid(&self, bytes: &[u8], recipient: Option<&RecipientParameters>) -> Result<bool> {
        let opened = envelope::unwrap(
            bytes,
            Self::MESSAGE_TYPE,
            recipient.and_then(RecipientParameters::encryption),
        )?;
        verify_body(&opened.body, self.validator()).map_err(|err| {
            warn!(message_type = %Self::MESSAGE_TYPE, error = %err, "message rejected");
            err
        })?;
        debug!(message_type = %Self::MESSAGE_TYPE, "message valid");
        Ok(true)
    }

    /// Decode (and decrypt) without verifying anything.
    fn parse(
        &self,
        bytes: &[u8],
        recipient: Option<&RecipientParameters>,
    ) -> Result<Parsed<Self::Body>> {
        let opened = envelope::unwrap(
            bytes,
            Self::MESSAGE_TYPE,
            recipient.and_then(RecipientParameters::encryption),
        )?;
        Ok(Parsed {
            body: Self::into_body(opened.body)?,
            metadata: opened.metadata,
        })
    }

    /// Parse, then look up address information for every output.
    fn parse_with_addresses_info(
        &self,
        bytes: &[u8],
        recipient: Option<&RecipientParameters>,
    ) -> Result<Parsed<Self::Body>> {
        let provider = self.address_provider().ok_or_else(|| {
            Bip75Error::UnsupportedOperation(
                "no address information provider configured".to_string(),
            )
        })?;
        let mut opened = envelope::unwrap(
            bytes,
            Self::MESSAGE_TYPE,
            recipient.and_then(RecipientParameters::encryption),
        )?;
        let outputs = opened.body.outputs_mut().ok_or_else(|| {
            Bip75Error::UnsupportedOperation(format!(
                "{} carries no addresses to enrich",
                Self::MESSAGE_TYPE
            ))
        })?;
        enrich_outputs(outputs, provider)?;
        Ok(Parsed {
            body: Self::into_body(opened.body)?,
            metadata: opened.metadata,
        })
    }
}

/// Sender checks, then owner attestations.
pub(crate) fn verify_body(body: &MessageBody, validator: &CertificateValidator) -> Result<()> {
    verify_sender(body, validator)?;
    verify_attestations(body, validator)
}

fn verify_sender(body: &MessageBody, validator: &CertificateValidator) -> Result<()> {
    let Some(sender) = body.sender() else {
        return Ok(());
    };

    if sender.pki_type.is_signed() {
        if !validator.validate(sender.certificate_pem)? {
            return Err(Bip75Error::InvalidCertificateChain(
                "sender certificate is not rooted in a trusted chain".to_string(),
            ));
        }
        if sender.signature.is_empty() {
            return Err(Bip75Error::InvalidSignature(
                "message is not signed by the sender".to_string(),
            ));
        }
        let key = public_key_from_certificate_pem(sender.certificate_pem)?;
        let digest = body.sender_digest()?;
        rsa_verify(&key, digest.as_bytes(), sender.signature).map_err(|_| {
            Bip75Error::InvalidSignature("sender signature does not verify".to_string())
        })?;
    }

    if !sender.ev_certificate_pem.is_empty() {
        let trusted = validator
            .validate(sender.ev_certificate_pem)
            .map_err(|e| Bip75Error::InvalidCertificate(format!("sender EV certificate: {e}")))?;
        if !trusted {
            return Err(Bip75Error::InvalidCertificate(
                "sender EV certificate is not rooted in a trusted chain".to_string(),
            ));
        }
        if !validator.is_ev_certificate(sender.ev_certificate_pem)? {
            return Err(Bip75Error::InvalidCertificate(
                "sender EV certificate carries no extended-validation policy".to_string(),
            ));
        }
    }
    Ok(())
}

fn enrich_outputs(outputs: &mut [Output], provider: &dyn AddressInformationProvider) -> Result<()> {
    for output in outputs {
        let information = provider.get_address_information(output.currency, &output.script)?;
        output.address_information = Some(information);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Create side
// ---------------------------------------------------------------------------

/// Sender fields as they go into a signed body.
pub(crate) struct SenderFields {
    pub pki_type: PkiType,
    pub certificate_pem: String,
    pub ev_certificate_pem: String,
}

pub(crate) fn sender_fields(sender: &SenderParameters) -> Result<SenderFields> {
    let (pki_type, certificate_pem) = match &sender.pki_data_parameters {
        Some(params) if params.pki_type.is_signed() => {
            let pem = params.certificate_pem.clone().ok_or_else(|| {
                Bip75Error::InvalidCertificate("sender has no certificate".to_string())
            })?;
            (params.pki_type, pem)
        }
        _ => (PkiType::None, String::new()),
    };
    Ok(SenderFields {
        pki_type,
        certificate_pem,
        ev_certificate_pem: sender.ev_certificate_pem.clone().unwrap_or_default(),
    })
}

/// Sign and attach attestations for every owner list of `body`.
pub(crate) fn sign_owners(
    body: &mut MessageBody,
    lists: &[(OwnerRole, &[OwnerParameters])],
) -> Result<()> {
    let digest = body.attestation_digest()?;
    let mut records = Vec::new();
    for (role, owners) in lists {
        records.extend(sign_attestations(owners, *role, &digest)?);
    }
    body.attach_attestation_signatures(&records)
}

/// Sign the body as the sender. Unsigned senders leave it untouched.
pub(crate) fn sign_sender(body: &mut MessageBody, sender: &SenderParameters) -> Result<()> {
    let Some(params) = sender
        .pki_data_parameters
        .as_ref()
        .filter(|p| p.pki_type.is_signed())
    else {
        return Ok(());
    };
    let key = params
        .private_key_pem
        .as_deref()
        .ok_or_else(|| Bip75Error::InvalidKey("sender has no private key".to_string()))?;
    let digest = body.sender_digest()?;
    body.set_sender_signature(rsa_sign_with_pem(key, digest.as_bytes())?);
    debug!(message_type = %body.message_type(), "sender signature attached");
    Ok(())
}

/// Both key sets when encryption is requested, failing if either is missing.
pub(crate) fn encryption_keys<'a>(
    information: &MessageInformation,
    sender: &'a SenderParameters,
    recipient: Option<&'a RecipientParameters>,
) -> Result<Option<(&'a EncryptionParameters, &'a EncryptionParameters)>> {
    if !information.encrypt_message {
        return Ok(None);
    }
    let sender_keys = sender.encryption_parameters.as_ref().ok_or_else(|| {
        Bip75Error::Encryption("sender encryption parameters are required to encrypt".to_string())
    })?;
    let recipient_keys = recipient
        .and_then(RecipientParameters::encryption)
        .ok_or_else(|| {
            Bip75Error::Encryption(
                "recipient encryption parameters are required to encrypt".to_string(),
            )
        })?;
    Ok(Some((sender_keys, recipient_keys)))
}

/// Wrap a finished body, encrypting when keys were resolved.
pub(crate) fn seal(
    body: &MessageBody,
    information: &MessageInformation,
    keys: Option<(&EncryptionParameters, &EncryptionParameters)>,
) -> Result<Vec<u8>> {
    envelope::wrap(
        body,
        information,
        keys.map(|(sender, _)| sender),
        keys.map(|(_, recipient)| recipient),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::params::PkiDataParameters;
    use crate::message::types::Attestation;
    use crate::test_support::fixture;

    #[test]
    fn test_unsigned_sender_fields() {
        let fields = sender_fields(&SenderParameters::default()).unwrap();
        assert_eq!(fields.pki_type, PkiType::None);
        assert!(fields.certificate_pem.is_empty());
    }

    #[test]
    fn test_x509_sender_without_certificate_fails() {
        let sender = SenderParameters {
            pki_data_parameters: Some(PkiDataParameters {
                certificate_pem: None,
                ..PkiDataParameters::x509(Attestation::LegalPersonPrimaryName, "", fixture::SENDER_KEY)
            }),
            ..SenderParameters::default()
        };
        assert!(matches!(
            sender_fields(&sender),
            Err(Bip75Error::InvalidCertificate(_))
        ));
    }

    #[test]
    fn test_encryption_keys_not_requested() {
        let sender = SenderParameters::default();
        let keys = encryption_keys(&MessageInformation::default(), &sender, None).unwrap();
        assert!(keys.is_none());
    }

    #[test]
    fn test_encryption_keys_missing_sender() {
        let recipient = RecipientParameters {
            encryption_parameters: Some(EncryptionParameters::public_only(fixture::RECIPIENT_EC_PUB)),
            ..RecipientParameters::default()
        };
        let err = encryption_keys(
            &MessageInformation::encrypted(),
            &SenderParameters::default(),
            Some(&recipient),
        )
        .unwrap_err();
        assert!(matches!(&err, Bip75Error::Encryption(msg) if msg.contains("sender")));
    }

    #[test]
    fn test_encryption_keys_missing_recipient() {
        let sender = SenderParameters {
            encryption_parameters: Some(EncryptionParameters::new(
                fixture::SENDER_EC_KEY,
                fixture::SENDER_EC_PUB,
            )),
            ..SenderParameters::default()
        };
        let err = encryption_keys(&MessageInformation::encrypted(), &sender, None).unwrap_err();
        assert!(matches!(&err, Bip75Error::Encryption(msg) if msg.contains("recipient")));
    }
}
