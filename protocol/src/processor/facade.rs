//! Single entry point over the four processors.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    verify_body, InvoiceRequestProcessor, Parsed, PaymentAckProcessor, PaymentProcessor,
    PaymentRequestProcessor,
};
use crate::error::Result;
use crate::message::address::AddressInformationProvider;
use crate::message::body::MessageBody;
use crate::message::envelope::{self, ProtocolMessageMetadata};
use crate::message::params::RecipientParameters;
use crate::message::types::{MessageType, StatusCode};
use crate::pki::CertificateValidator;

/// Owns the trust set and the optional address-information provider, and
/// hands out processors that share them.
///
/// ```no_run
/// use bip75_protocol::Bip75;
///
/// let bip75 = Bip75::from_trust_store("/etc/bip75/trust")?;
/// let metadata = bip75.message_metadata(&std::fs::read("message.bin")?)?;
/// println!("{}", metadata.message_type);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Bip75 {
    validator: Arc<CertificateValidator>,
    provider: Option<Arc<dyn AddressInformationProvider>>,
}

impl Bip75 {
    pub fn new(validator: CertificateValidator) -> Self {
        Self::with_shared_validator(Arc::new(validator))
    }

    pub fn with_shared_validator(validator: Arc<CertificateValidator>) -> Self {
        Self {
            validator,
            provider: None,
        }
    }

    /// Load the trust store directory and build the facade over it.
    pub fn from_trust_store(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(CertificateValidator::new(dir)?))
    }

    pub fn with_address_information_provider(
        mut self,
        provider: Arc<dyn AddressInformationProvider>,
    ) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn validator(&self) -> &CertificateValidator {
        &self.validator
    }

    pub fn invoice_request(&self) -> InvoiceRequestProcessor {
        InvoiceRequestProcessor::new(self.validator.clone(), self.provider.clone())
    }

    pub fn payment_request(&self) -> PaymentRequestProcessor {
        PaymentRequestProcessor::new(self.validator.clone(), self.provider.clone())
    }

    pub fn payment(&self) -> PaymentProcessor {
        PaymentProcessor::new(self.validator.clone(), self.provider.clone())
    }

    pub fn payment_ack(&self) -> PaymentAckProcessor {
        PaymentAckProcessor::new(self.validator.clone(), self.provider.clone())
    }

    /// Envelope metadata without opening the body.
    pub fn message_metadata(&self, bytes: &[u8]) -> Result<ProtocolMessageMetadata> {
        envelope::extract_metadata(bytes)
    }

    /// Rewrite the status of a message; signatures stay valid.
    pub fn change_status(&self, bytes: &[u8], code: StatusCode, message: &str) -> Result<Vec<u8>> {
        envelope::change_status(bytes, code, message)
    }

    /// Kind of the body, decrypting if necessary.
    pub fn message_type(
        &self,
        bytes: &[u8],
        recipient: Option<&RecipientParameters>,
    ) -> Result<MessageType> {
        Ok(self.parse(bytes, recipient)?.body.message_type())
    }

    /// Decode a message of any kind without verifying it.
    pub fn parse(
        &self,
        bytes: &[u8],
        recipient: Option<&RecipientParameters>,
    ) -> Result<Parsed<MessageBody>> {
        let opened = envelope::open(bytes, recipient.and_then(RecipientParameters::encryption))?;
        Ok(Parsed {
            body: opened.body,
            metadata: opened.metadata,
        })
    }

    /// Validate a message of any kind.
    pub fn is_valid(&self, bytes: &[u8], recipient: Option<&RecipientParameters>) -> Result<bool> {
        let parsed = self.parse(bytes, recipient)?;
        let message_type = parsed.body.message_type();
        verify_body(&parsed.body, &self.validator).map_err(|err| {
            warn!(%message_type, error = %err, "message rejected");
            err
        })?;
        debug!(%message_type, "message valid");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::params::{MessageInformation, SenderParameters};
    use crate::processor::PaymentAckParameters;
    use crate::test_support::{trust_store_dir, trusted_validator};

    #[test]
    fn test_from_trust_store() {
        let bip75 = Bip75::from_trust_store(trust_store_dir()).unwrap();
        assert_eq!(bip75.validator().chains().len(), 1);
    }

    #[test]
    fn test_any_kind_validation_and_status() {
        let bip75 = Bip75::new(trusted_validator());
        let bytes = bip75
            .payment_ack()
            .create(
                &PaymentAckParameters::default(),
                &SenderParameters::default(),
                None,
                &MessageInformation::default(),
            )
            .unwrap();
        assert_eq!(bip75.message_type(&bytes, None).unwrap(), MessageType::PaymentAck);
        assert!(bip75.is_valid(&bytes, None).unwrap());

        let changed = bip75.change_status(&bytes, StatusCode::Cancel, "no").unwrap();
        let metadata = bip75.message_metadata(&changed).unwrap();
        assert_eq!(metadata.status_code, StatusCode::Cancel);
        assert_eq!(metadata.message_type, MessageType::PaymentAck);
    }
}
