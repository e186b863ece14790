//! PaymentAck: the beneficiary's acknowledgement of a Payment.
//!
//! The acknowledged Payment is embedded as received, attestation
//! signatures included, so validating a PaymentAck re-checks the Payment's
//! owners.

use std::sync::Arc;

use tracing::debug;

use super::{encryption_keys, seal, MessageProcessor, Parsed};
use crate::error::{Bip75Error, Result};
use crate::message::address::AddressInformationProvider;
use crate::message::body::{MessageBody, Payment, PaymentAck};
use crate::message::envelope;
use crate::message::params::{MessageInformation, RecipientParameters, SenderParameters};
use crate::message::types::MessageType;
use crate::pki::CertificateValidator;

/// Body fields of a new PaymentAck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentAckParameters {
    pub payment: Payment,
    pub memo: String,
}

impl PaymentAckParameters {
    /// Acknowledge a Payment received as wire bytes.
    ///
    /// `recipient` is needed when the Payment was encrypted.
    pub fn from_payment_bytes(
        payment_bytes: &[u8],
        recipient: Option<&RecipientParameters>,
        memo: impl Into<String>,
    ) -> Result<Self> {
        let opened = envelope::unwrap(
            payment_bytes,
            MessageType::Payment,
            recipient.and_then(RecipientParameters::encryption),
        )?;
        let MessageBody::Payment(payment) = opened.body else {
            return Err(Bip75Error::InvalidObject(
                "acknowledged message is not a Payment".to_string(),
            ));
        };
        Ok(Self {
            payment,
            memo: memo.into(),
        })
    }
}

#[derive(Clone)]
pub struct PaymentAckProcessor {
    validator: Arc<CertificateValidator>,
    provider: Option<Arc<dyn AddressInformationProvider>>,
}

impl PaymentAckProcessor {
    pub fn new(
        validator: Arc<CertificateValidator>,
        provider: Option<Arc<dyn AddressInformationProvider>>,
    ) -> Self {
        Self {
            validator,
            provider,
        }
    }

    /// Wrap an acknowledgement of `params.payment`.
    pub fn create(
        &self,
        params: &PaymentAckParameters,
        sender: &SenderParameters,
        recipient: Option<&RecipientParameters>,
        information: &MessageInformation,
    ) -> Result<Vec<u8>> {
        let keys = encryption_keys(information, sender, recipient)?;
        let body = MessageBody::PaymentAck(PaymentAck {
            payment: params.payment.clone(),
            memo: params.memo.clone(),
        });
        debug!(encrypted = keys.is_some(), "payment ack created");
        seal(&body, information, keys)
    }
}

impl MessageProcessor for PaymentAckProcessor {
    type Body = PaymentAck;

    const MESSAGE_TYPE: MessageType = MessageType::PaymentAck;

    fn validator(&self) -> &CertificateValidator {
        &self.validator
    }

    fn address_provider(&self) -> Option<&dyn AddressInformationProvider> {
        self.provider.as_deref()
    }

    fn into_body(body: MessageBody) -> Result<PaymentAck> {
        match body {
            MessageBody::PaymentAck(body) => Ok(body),
            other => Err(Bip75Error::InvalidObject(format!(
                "expected PaymentAck, found {}",
                other.message_type()
            ))),
        }
    }

    fn parse_with_addresses_info(
        &self,
        _bytes: &[u8],
        _recipient: Option<&RecipientParameters>,
    ) -> Result<Parsed<PaymentAck>> {
        Err(Bip75Error::UnsupportedOperation(
            "address information is not available for PaymentAck".to_string(),
        ))
    }
}
