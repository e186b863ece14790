//! Creation parameters.
//!
//! These carry private keys and therefore never travel on the wire. The
//! processors turn them into the signed bodies in [`super::body`].

use super::types::{Attestation, PkiType, StatusCode};
use crate::config::DEFAULT_STATUS_MESSAGE;

/// One attestation an owner or sender asserts.
///
/// For [`PkiType::X509Sha256`] the certificate is required; the private key
/// is required only where a signature is produced (primary owners and the
/// sender).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkiDataParameters {
    pub attestation: Attestation,
    pub private_key_pem: Option<String>,
    pub certificate_pem: Option<String>,
    pub pki_type: PkiType,
}

impl PkiDataParameters {
    /// An unsigned attestation.
    pub fn unsigned(attestation: Attestation) -> Self {
        Self {
            attestation,
            private_key_pem: None,
            certificate_pem: None,
            pki_type: PkiType::None,
        }
    }

    /// An X.509-backed attestation.
    pub fn x509(
        attestation: Attestation,
        certificate_pem: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> Self {
        Self {
            attestation,
            private_key_pem: Some(private_key_pem.into()),
            certificate_pem: Some(certificate_pem.into()),
            pki_type: PkiType::X509Sha256,
        }
    }
}

/// An originator or beneficiary as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerParameters {
    pub primary_for_transaction: bool,
    pub pki_data_parameters: Vec<PkiDataParameters>,
}

/// secp256k1 keys for the encrypted envelope.
///
/// A sender needs both halves. A recipient needs only the public half to be
/// encrypted to, and the private half to decrypt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionParameters {
    pub private_key_pem: Option<String>,
    pub public_key_pem: String,
}

impl EncryptionParameters {
    pub fn new(private_key_pem: impl Into<String>, public_key_pem: impl Into<String>) -> Self {
        Self {
            private_key_pem: Some(private_key_pem.into()),
            public_key_pem: public_key_pem.into(),
        }
    }

    /// Only the public half, enough to encrypt to this party.
    pub fn public_only(public_key_pem: impl Into<String>) -> Self {
        Self {
            private_key_pem: None,
            public_key_pem: public_key_pem.into(),
        }
    }
}

/// The party signing the whole message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderParameters {
    pub pki_data_parameters: Option<PkiDataParameters>,
    pub ev_certificate_pem: Option<String>,
    pub encryption_parameters: Option<EncryptionParameters>,
}

/// The party a message is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientParameters {
    pub vasp_name: Option<String>,
    pub chain_address: Option<String>,
    pub encryption_parameters: Option<EncryptionParameters>,
}

impl RecipientParameters {
    pub(crate) fn encryption(&self) -> Option<&EncryptionParameters> {
        self.encryption_parameters.as_ref()
    }
}

/// Envelope-level settings for a message being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInformation {
    pub status_code: StatusCode,
    pub status_message: String,
    /// Caller-chosen identifier; derived from the body when absent.
    pub identifier: Option<Vec<u8>>,
    pub encrypt_message: bool,
}

impl Default for MessageInformation {
    fn default() -> Self {
        Self {
            status_code: StatusCode::Ok,
            status_message: DEFAULT_STATUS_MESSAGE.to_string(),
            identifier: None,
            encrypt_message: false,
        }
    }
}

impl MessageInformation {
    /// Default settings with encryption turned on.
    pub fn encrypted() -> Self {
        Self {
            encrypt_message: true,
            ..Self::default()
        }
    }
}
