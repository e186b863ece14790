//! Payment: the originator's signed transactions.
//!
//! A Payment carries no sender signature; its owner attestations are the
//! only signed content.

use std::sync::Arc;

use tracing::debug;

use super::{encryption_keys, seal, sign_owners, MessageProcessor, Parsed};
use crate::error::{Bip75Error, Result};
use crate::message::address::AddressInformationProvider;
use crate::message::attestation::{owners_from_parameters, validate_owners};
use crate::message::body::{MessageBody, Output, OwnerRole, Payment};
use crate::message::params::{
    MessageInformation, OwnerParameters, RecipientParameters, SenderParameters,
};
use crate::message::types::MessageType;
use crate::pki::CertificateValidator;

/// Body fields of a new Payment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentParameters {
    pub merchant_data: Vec<u8>,
    pub transactions: Vec<Vec<u8>>,
    pub refund_to: Vec<Output>,
    pub memo: String,
    /// Required; exactly one must be primary.
    pub originators: Vec<OwnerParameters>,
    /// Optional; if present, exactly one must be primary.
    pub beneficiaries: Vec<OwnerParameters>,
}

#[derive(Clone)]
pub struct PaymentProcessor {
    validator: Arc<CertificateValidator>,
    provider: Option<Arc<dyn AddressInformationProvider>>,
}

impl PaymentProcessor {
    pub fn new(
        validator: Arc<CertificateValidator>,
        provider: Option<Arc<dyn AddressInformationProvider>>,
    ) -> Self {
        Self {
            validator,
            provider,
        }
    }

    /// Build, attest and wrap a Payment.
    ///
    /// Only the sender's encryption parameters are used.
    pub fn create(
        &self,
        params: &PaymentParameters,
        sender: &SenderParameters,
        recipient: Option<&RecipientParameters>,
        information: &MessageInformation,
    ) -> Result<Vec<u8>> {
        validate_owners(&params.originators, OwnerRole::Originator)?;
        if !params.beneficiaries.is_empty() {
            validate_owners(&params.beneficiaries, OwnerRole::Beneficiary)?;
        }
        let keys = encryption_keys(information, sender, recipient)?;

        let mut body = MessageBody::Payment(Payment {
            merchant_data: params.merchant_data.clone(),
            transactions: params.transactions.clone(),
            refund_to: params.refund_to.clone(),
            memo: params.memo.clone(),
            originators: owners_from_parameters(&params.originators)?,
            beneficiaries: owners_from_parameters(&params.beneficiaries)?,
        });
        sign_owners(
            &mut body,
            &[
                (OwnerRole::Originator, params.originators.as_slice()),
                (OwnerRole::Beneficiary, params.beneficiaries.as_slice()),
            ],
        )?;
        debug!(
            transactions = params.transactions.len(),
            encrypted = keys.is_some(),
            "payment created"
        );
        seal(&body, information, keys)
    }
}

impl MessageProcessor for PaymentProcessor {
    type Body = Payment;

    const MESSAGE_TYPE: MessageType = MessageType::Payment;

    fn validator(&self) -> &CertificateValidator {
        &self.validator
    }

    fn address_provider(&self) -> Option<&dyn AddressInformationProvider> {
        self.provider.as_deref()
    }

    fn into_body(body: MessageBody) -> Result<Payment> {
        match body {
            MessageBody::Payment(body) => Ok(body),
            other => Err(Bip75Error::InvalidObject(format!(
                "expected Payment, found {}",
                other.message_type()
            ))),
        }
    }

    fn parse_with_addresses_info(
        &self,
        _bytes: &[u8],
        _recipient: Option<&RecipientParameters>,
    ) -> Result<Parsed<Payment>> {
        Err(Bip75Error::UnsupportedOperation(
            "address information is not available for Payment".to_string(),
        ))
    }
}
