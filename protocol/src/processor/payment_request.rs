//! PaymentRequest: the beneficiary side answering with payment details.

use std::sync::Arc;

use tracing::debug;

use super::{
    encryption_keys, seal, sender_fields, sign_owners, sign_sender, MessageProcessor,
};
use crate::config::PAYMENT_DETAILS_VERSION;
use crate::error::{Bip75Error, Result};
use crate::message::address::AddressInformationProvider;
use crate::message::attestation::{owners_from_parameters, validate_owners};
use crate::message::body::{MessageBody, OwnerRole, PaymentDetails, PaymentRequest};
use crate::message::params::{
    MessageInformation, OwnerParameters, RecipientParameters, SenderParameters,
};
use crate::message::types::{Attestation, MessageType};
use crate::pki::CertificateValidator;

/// Body fields of a new PaymentRequest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentRequestParameters {
    pub payment_details: PaymentDetails,
    /// Required; exactly one must be primary.
    pub beneficiaries: Vec<OwnerParameters>,
    pub attestations_requested: Vec<Attestation>,
}

#[derive(Clone)]
pub struct PaymentRequestProcessor {
    validator: Arc<CertificateValidator>,
    provider: Option<Arc<dyn AddressInformationProvider>>,
}

impl PaymentRequestProcessor {
    pub fn new(
        validator: Arc<CertificateValidator>,
        provider: Option<Arc<dyn AddressInformationProvider>>,
    ) -> Self {
        Self {
            validator,
            provider,
        }
    }

    /// Build, sign and wrap a PaymentRequest.
    pub fn create(
        &self,
        params: &PaymentRequestParameters,
        sender: &SenderParameters,
        recipient: Option<&RecipientParameters>,
        information: &MessageInformation,
    ) -> Result<Vec<u8>> {
        validate_owners(&params.beneficiaries, OwnerRole::Beneficiary)?;
        let keys = encryption_keys(information, sender, recipient)?;
        let sender_fields = sender_fields(sender)?;

        let mut body = MessageBody::PaymentRequest(PaymentRequest {
            payment_details_version: PAYMENT_DETAILS_VERSION,
            payment_details: params.payment_details.clone(),
            beneficiaries: owners_from_parameters(&params.beneficiaries)?,
            attestations_requested: params.attestations_requested.clone(),
            sender_pki_type: sender_fields.pki_type,
            sender_pki_data: sender_fields.certificate_pem,
            sender_signature: String::new(),
            sender_ev_cert: sender_fields.ev_certificate_pem,
        });

        sign_owners(&mut body, &[(OwnerRole::Beneficiary, params.beneficiaries.as_slice())])?;
        sign_sender(&mut body, sender)?;
        debug!(
            outputs = params.payment_details.beneficiaries_addresses.len(),
            encrypted = keys.is_some(),
            "payment request created"
        );
        seal(&body, information, keys)
    }
}

impl MessageProcessor for PaymentRequestProcessor {
    type Body = PaymentRequest;

    const MESSAGE_TYPE: MessageType = MessageType::PaymentRequest;

    fn validator(&self) -> &CertificateValidator {
        &self.validator
    }

    fn address_provider(&self) -> Option<&dyn AddressInformationProvider> {
        self.provider.as_deref()
    }

    fn into_body(body: MessageBody) -> Result<PaymentRequest> {
        match body {
            MessageBody::PaymentRequest(body) => Ok(body),
            other => Err(Bip75Error::InvalidObject(format!(
                "expected PaymentRequest, found {}",
                other.message_type()
            ))),
        }
    }
}
