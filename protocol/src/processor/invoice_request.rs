//! InvoiceRequest: the originator side opening a transaction.

use std::sync::Arc;

use tracing::debug;

use super::{
    encryption_keys, seal, sender_fields, sign_owners, sign_sender, MessageProcessor,
};
use crate::error::{Bip75Error, Result};
use crate::message::address::AddressInformationProvider;
use crate::message::attestation::{owners_from_parameters, validate_owners};
use crate::message::body::{InvoiceRequest, MessageBody, Output, OwnerRole};
use crate::message::params::{
    MessageInformation, OwnerParameters, RecipientParameters, SenderParameters,
};
use crate::message::types::{Attestation, MessageType};
use crate::pki::CertificateValidator;

/// Body fields of a new InvoiceRequest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceRequestParameters {
    pub amount: u64,
    pub memo: String,
    pub notification_url: String,
    /// Required; exactly one must be primary.
    pub originators: Vec<OwnerParameters>,
    /// Optional; if present, exactly one must be primary.
    pub beneficiaries: Vec<OwnerParameters>,
    pub originators_addresses: Vec<Output>,
    pub attestations_requested: Vec<Attestation>,
}

#[derive(Clone)]
pub struct InvoiceRequestProcessor {
    validator: Arc<CertificateValidator>,
    provider: Option<Arc<dyn AddressInformationProvider>>,
}

impl InvoiceRequestProcessor {
    pub fn new(
        validator: Arc<CertificateValidator>,
        provider: Option<Arc<dyn AddressInformationProvider>>,
    ) -> Self {
        Self {
            validator,
            provider,
        }
    }

    /// Build, sign and wrap an InvoiceRequest.
    pub fn create(
        &self,
        params: &InvoiceRequestParameters,
        sender: &SenderParameters,
        recipient: Option<&RecipientParameters>,
        information: &MessageInformation,
    ) -> Result<Vec<u8>> {
        validate_owners(&params.originators, OwnerRole::Originator)?;
        if !params.beneficiaries.is_empty() {
            validate_owners(&params.beneficiaries, OwnerRole::Beneficiary)?;
        }
        let keys = encryption_keys(information, sender, recipient)?;
        let sender_fields = sender_fields(sender)?;

        let mut body = MessageBody::InvoiceRequest(InvoiceRequest {
            amount: params.amount,
            memo: params.memo.clone(),
            notification_url: params.notification_url.clone(),
            originators: owners_from_parameters(&params.originators)?,
            beneficiaries: owners_from_parameters(&params.beneficiaries)?,
            originators_addresses: params.originators_addresses.clone(),
            attestations_requested: params.attestations_requested.clone(),
            recipient_vasp_name: recipient
                .and_then(|r| r.vasp_name.clone())
                .unwrap_or_default(),
            recipient_chain_address: recipient
                .and_then(|r| r.chain_address.clone())
                .unwrap_or_default(),
            sender_pki_type: sender_fields.pki_type,
            sender_pki_data: sender_fields.certificate_pem,
            sender_signature: String::new(),
            sender_ev_cert: sender_fields.ev_certificate_pem,
        });

        sign_owners(
            &mut body,
            &[
                (OwnerRole::Originator, params.originators.as_slice()),
                (OwnerRole::Beneficiary, params.beneficiaries.as_slice()),
            ],
        )?;
        sign_sender(&mut body, sender)?;
        debug!(amount = params.amount, encrypted = keys.is_some(), "invoice request created");
        seal(&body, information, keys)
    }
}

impl MessageProcessor for InvoiceRequestProcessor {
    type Body = InvoiceRequest;

    const MESSAGE_TYPE: MessageType = MessageType::InvoiceRequest;

    fn validator(&self) -> &CertificateValidator {
        &self.validator
    }

    fn address_provider(&self) -> Option<&dyn AddressInformationProvider> {
        self.provider.as_deref()
    }

    fn into_body(body: MessageBody) -> Result<InvoiceRequest> {
        match body {
            MessageBody::InvoiceRequest(body) => Ok(body),
            other => Err(Bip75Error::InvalidObject(format!(
                "expected InvoiceRequest, found {}",
                other.message_type()
            ))),
        }
    }
}
