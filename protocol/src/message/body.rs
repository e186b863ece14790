//! Message bodies as they travel inside the envelope.
//!
//! [`MessageBody`] is the one place that knows where each kind keeps its
//! signatures. Hashing for both attestation and sender signatures goes
//! through it, so the fields excluded from each digest are decided here
//! and nowhere else.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::address::AddressInformation;
use super::attestation::AttestationSignature;
use super::types::{AddressCurrency, Attestation, MessageType, PkiType};
use crate::config::{DEFAULT_NETWORK, PAYMENT_DETAILS_VERSION};
use crate::crypto::hash::sha256_hex;
use crate::error::{Bip75Error, Result};

// ---------------------------------------------------------------------------
// Owners
// ---------------------------------------------------------------------------

/// One attestation as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkiData {
    pub attestation: Attestation,
    pub certificate_pem: String,
    pub pki_type: PkiType,
    /// Hex RSA signature; empty when blank.
    pub signature: String,
}

/// An originator or beneficiary as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub primary_for_transaction: bool,
    pub pki_data: Vec<PkiData>,
}

/// Which owner list an owner belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwnerRole {
    Originator,
    Beneficiary,
}

impl std::fmt::Display for OwnerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Originator => write!(f, "originators"),
            Self::Beneficiary => write!(f, "beneficiaries"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A payment output.
///
/// `address_information` is local enrichment and is never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub amount: u64,
    pub script: String,
    pub currency: AddressCurrency,
    #[serde(skip)]
    pub address_information: Option<AddressInformation>,
}

impl Output {
    pub fn new(amount: u64, script: impl Into<String>, currency: AddressCurrency) -> Self {
        Self {
            amount,
            script: script.into(),
            currency,
            address_information: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub amount: u64,
    pub memo: String,
    pub notification_url: String,
    pub originators: Vec<Owner>,
    pub beneficiaries: Vec<Owner>,
    pub originators_addresses: Vec<Output>,
    pub attestations_requested: Vec<Attestation>,
    pub recipient_vasp_name: String,
    pub recipient_chain_address: String,
    pub sender_pki_type: PkiType,
    /// Sender certificate PEM; empty when the sender is unsigned.
    pub sender_pki_data: String,
    pub sender_signature: String,
    pub sender_ev_cert: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub network: String,
    pub beneficiaries_addresses: Vec<Output>,
    /// Creation time, Unix seconds.
    pub time: i64,
    /// Expiry, Unix seconds; zero for none.
    pub expires: i64,
    pub memo: String,
    pub payment_url: String,
    pub merchant_data: Vec<u8>,
}

impl Default for PaymentDetails {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            beneficiaries_addresses: Vec::new(),
            time: 0,
            expires: 0,
            memo: String::new(),
            payment_url: String::new(),
            merchant_data: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_details_version: u32,
    pub payment_details: PaymentDetails,
    pub beneficiaries: Vec<Owner>,
    pub attestations_requested: Vec<Attestation>,
    pub sender_pki_type: PkiType,
    pub sender_pki_data: String,
    pub sender_signature: String,
    pub sender_ev_cert: String,
}

impl Default for PaymentRequest {
    fn default() -> Self {
        Self {
            payment_details_version: PAYMENT_DETAILS_VERSION,
            payment_details: PaymentDetails::default(),
            beneficiaries: Vec::new(),
            attestations_requested: Vec::new(),
            sender_pki_type: PkiType::None,
            sender_pki_data: String::new(),
            sender_signature: String::new(),
            sender_ev_cert: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub merchant_data: Vec<u8>,
    /// Raw signed transactions.
    pub transactions: Vec<Vec<u8>>,
    pub refund_to: Vec<Output>,
    pub memo: String,
    pub originators: Vec<Owner>,
    pub beneficiaries: Vec<Owner>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentAck {
    pub payment: Payment,
    pub memo: String,
}

/// Sender fields of a signed body, borrowed.
#[derive(Debug, Clone, Copy)]
pub struct SenderData<'a> {
    pub pki_type: PkiType,
    pub certificate_pem: &'a str,
    pub signature: &'a str,
    pub ev_certificate_pem: &'a str,
}

// ---------------------------------------------------------------------------
// MessageBody
// ---------------------------------------------------------------------------

/// Any of the four bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageBody {
    InvoiceRequest(InvoiceRequest),
    PaymentRequest(PaymentRequest),
    Payment(Payment),
    PaymentAck(PaymentAck),
}

fn encode<T: Serialize>(value: &T, kind: MessageType) -> Result<Vec<u8>> {
    bincode::serialize(value)
        .map_err(|e| Bip75Error::InvalidObject(format!("cannot encode {kind}: {e}")))
}

/// Decode with the `bincode::serialize` layout, refusing bytes left over
/// after the value. Digests cover the re-encoded value only.
pub(crate) fn decode_exact<T: DeserializeOwned>(bytes: &[u8]) -> bincode::Result<T> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .deserialize(bytes)
}

fn decode<T: DeserializeOwned>(bytes: &[u8], kind: MessageType) -> Result<T> {
    decode_exact(bytes)
        .map_err(|e| Bip75Error::InvalidObject(format!("invalid {kind}: {e}")))
}

fn clear_owner_signatures(owners: &mut [Owner]) {
    for pki in owners.iter_mut().flat_map(|o| o.pki_data.iter_mut()) {
        pki.signature.clear();
    }
}

impl MessageBody {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::InvoiceRequest(_) => MessageType::InvoiceRequest,
            Self::PaymentRequest(_) => MessageType::PaymentRequest,
            Self::Payment(_) => MessageType::Payment,
            Self::PaymentAck(_) => MessageType::PaymentAck,
        }
    }

    /// Serialize the inner body (without the enum tag).
    pub fn encode(&self) -> Result<Vec<u8>> {
        let kind = self.message_type();
        match self {
            Self::InvoiceRequest(body) => encode(body, kind),
            Self::PaymentRequest(body) => encode(body, kind),
            Self::Payment(body) => encode(body, kind),
            Self::PaymentAck(body) => encode(body, kind),
        }
    }

    /// Decode a body of the given kind.
    pub fn decode(message_type: MessageType, bytes: &[u8]) -> Result<Self> {
        Ok(match message_type {
            MessageType::InvoiceRequest => Self::InvoiceRequest(decode(bytes, message_type)?),
            MessageType::PaymentRequest => Self::PaymentRequest(decode(bytes, message_type)?),
            MessageType::Payment => Self::Payment(decode(bytes, message_type)?),
            MessageType::PaymentAck => Self::PaymentAck(decode(bytes, message_type)?),
            MessageType::Unknown => {
                return Err(Bip75Error::InvalidObject(
                    "message type is unknown".to_string(),
                ))
            }
        })
    }

    /// Owner lists in verification order: originators, then beneficiaries.
    ///
    /// A PaymentAck exposes the lists of the Payment it embeds.
    pub fn owner_lists(&self) -> Vec<(OwnerRole, &[Owner])> {
        match self {
            Self::InvoiceRequest(body) => vec![
                (OwnerRole::Originator, body.originators.as_slice()),
                (OwnerRole::Beneficiary, body.beneficiaries.as_slice()),
            ],
            Self::PaymentRequest(body) => {
                vec![(OwnerRole::Beneficiary, body.beneficiaries.as_slice())]
            }
            Self::Payment(body) => vec![
                (OwnerRole::Originator, body.originators.as_slice()),
                (OwnerRole::Beneficiary, body.beneficiaries.as_slice()),
            ],
            Self::PaymentAck(body) => vec![
                (OwnerRole::Originator, body.payment.originators.as_slice()),
                (OwnerRole::Beneficiary, body.payment.beneficiaries.as_slice()),
            ],
        }
    }

    fn owners_mut(&mut self, role: OwnerRole) -> Option<&mut Vec<Owner>> {
        match (self, role) {
            (Self::InvoiceRequest(body), OwnerRole::Originator) => Some(&mut body.originators),
            (Self::InvoiceRequest(body), OwnerRole::Beneficiary) => Some(&mut body.beneficiaries),
            (Self::PaymentRequest(_), OwnerRole::Originator) => None,
            (Self::PaymentRequest(body), OwnerRole::Beneficiary) => Some(&mut body.beneficiaries),
            (Self::Payment(body), OwnerRole::Originator) => Some(&mut body.originators),
            (Self::Payment(body), OwnerRole::Beneficiary) => Some(&mut body.beneficiaries),
            (Self::PaymentAck(body), OwnerRole::Originator) => Some(&mut body.payment.originators),
            (Self::PaymentAck(body), OwnerRole::Beneficiary) => {
                Some(&mut body.payment.beneficiaries)
            }
        }
    }

    /// Sender fields, for the kinds that have a sender signature.
    pub fn sender(&self) -> Option<SenderData<'_>> {
        match self {
            Self::InvoiceRequest(body) => Some(SenderData {
                pki_type: body.sender_pki_type,
                certificate_pem: &body.sender_pki_data,
                signature: &body.sender_signature,
                ev_certificate_pem: &body.sender_ev_cert,
            }),
            Self::PaymentRequest(body) => Some(SenderData {
                pki_type: body.sender_pki_type,
                certificate_pem: &body.sender_pki_data,
                signature: &body.sender_signature,
                ev_certificate_pem: &body.sender_ev_cert,
            }),
            Self::Payment(_) | Self::PaymentAck(_) => None,
        }
    }

    fn sender_signature_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::InvoiceRequest(body) => Some(&mut body.sender_signature),
            Self::PaymentRequest(body) => Some(&mut body.sender_signature),
            Self::Payment(_) | Self::PaymentAck(_) => None,
        }
    }

    /// Set the sender signature. A no-op for kinds without one.
    pub fn set_sender_signature(&mut self, signature: String) {
        if let Some(slot) = self.sender_signature_mut() {
            *slot = signature;
        }
    }

    /// Attach attestation signature records to their owner entries.
    pub fn attach_attestation_signatures(&mut self, signatures: &[AttestationSignature]) -> Result<()> {
        for record in signatures {
            let slot = self
                .owners_mut(record.role)
                .and_then(|owners| owners.get_mut(record.owner_index))
                .and_then(|owner| owner.pki_data.get_mut(record.pki_index))
                .ok_or_else(|| {
                    Bip75Error::InvalidOwners(format!(
                        "no {} entry at owner {} attestation {}",
                        record.role, record.owner_index, record.pki_index
                    ))
                })?;
            if slot.attestation != record.attestation {
                return Err(Bip75Error::InvalidOwners(format!(
                    "signature for {} does not match attestation {}",
                    record.attestation, slot.attestation
                )));
            }
            slot.signature = record.signature.clone();
        }
        Ok(())
    }

    /// Digest signed by primary owners: the body with every signature blank.
    ///
    /// For a PaymentAck this is the digest of the embedded Payment, which is
    /// what its owners signed.
    pub fn attestation_digest(&self) -> Result<String> {
        if let Self::PaymentAck(ack) = self {
            return Self::Payment(ack.payment.clone()).attestation_digest();
        }
        let mut blank = self.clone();
        blank.set_sender_signature(String::new());
        for role in [OwnerRole::Originator, OwnerRole::Beneficiary] {
            if let Some(owners) = blank.owners_mut(role) {
                clear_owner_signatures(owners);
            }
        }
        Ok(sha256_hex(&blank.encode()?))
    }

    /// Digest signed by the sender: the body with only the sender signature
    /// blank. Owner signatures are covered.
    pub fn sender_digest(&self) -> Result<String> {
        let mut blank = self.clone();
        blank.set_sender_signature(String::new());
        Ok(sha256_hex(&blank.encode()?))
    }

    /// Outputs that can be enriched with address information.
    pub fn outputs_mut(&mut self) -> Option<&mut Vec<Output>> {
        match self {
            Self::InvoiceRequest(body) => Some(&mut body.originators_addresses),
            Self::PaymentRequest(body) => Some(&mut body.payment_details.beneficiaries_addresses),
            Self::Payment(_) | Self::PaymentAck(_) => None,
        }
    }
}
