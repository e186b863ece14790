//! X.509 certificate wrapper.
//!
//! A thin layer over `x509-cert` exposing exactly the questions path
//! building and attestation checks ask: who issued this, did they really
//! sign it, is it inside its validity window, may it issue others, and
//! which policies does it assert.

use rsa::pkcs1v15::{Signature as RsaSignature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::{Sha256, Sha384, Sha512};
use x509_cert::der::oid::{AssociatedOid, ObjectIdentifier};
use x509_cert::der::{Decode, DecodePem, Encode};
use x509_cert::ext::pkix::{BasicConstraints, CertificatePolicies};
use x509_cert::Certificate;

use crate::config::is_ev_policy;
use crate::error::{Bip75Error, Result};

const SHA256_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const SHA384_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");
const SHA512_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

/// A parsed X.509 certificate.
#[derive(Clone, Debug, PartialEq)]
pub struct X509Certificate {
    inner: Certificate,
}

impl X509Certificate {
    /// Parse a single PEM-encoded certificate.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let inner = Certificate::from_pem(pem.trim())
            .map_err(|e| Bip75Error::InvalidCertificate(format!("unparsable PEM: {e}")))?;
        Ok(Self { inner })
    }

    /// Parse every certificate in a PEM bundle, in file order.
    pub fn bundle_from_pem(bytes: &[u8]) -> Result<Vec<Self>> {
        let certs = Certificate::load_pem_chain(bytes)
            .map_err(|e| Bip75Error::InvalidCertificate(format!("unparsable PEM bundle: {e}")))?;
        Ok(certs.into_iter().map(|inner| Self { inner }).collect())
    }

    /// Subject distinguished name in RFC 4514 form, for logs and errors.
    pub fn subject(&self) -> String {
        self.inner.tbs_certificate.subject.to_string()
    }

    /// Issuer distinguished name in RFC 4514 form.
    pub fn issuer(&self) -> String {
        self.inner.tbs_certificate.issuer.to_string()
    }

    /// RSA public key from the SubjectPublicKeyInfo.
    pub fn rsa_public_key(&self) -> Result<RsaPublicKey> {
        let spki = self
            .inner
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| Bip75Error::InvalidCertificate(e.to_string()))?;
        <RsaPublicKey as rsa::pkcs8::DecodePublicKey>::from_public_key_der(&spki).map_err(|e| {
            Bip75Error::InvalidCertificate(format!(
                "{} does not carry an RSA key: {e}",
                self.subject()
            ))
        })
    }

    /// `true` if the issuer name equals the subject name and the signature
    /// verifies under the certificate's own key.
    pub fn is_self_signed(&self) -> bool {
        self.inner.tbs_certificate.subject == self.inner.tbs_certificate.issuer
            && self.is_signed_by_key_of(self)
    }

    /// `true` if `issuer` is named as this certificate's issuer and its key
    /// verifies this certificate's signature.
    pub fn is_issued_by(&self, issuer: &X509Certificate) -> bool {
        self.inner.tbs_certificate.issuer == issuer.inner.tbs_certificate.subject
            && self.is_signed_by_key_of(issuer)
    }

    fn is_signed_by_key_of(&self, issuer: &X509Certificate) -> bool {
        let Ok(key) = issuer.rsa_public_key() else {
            return false;
        };
        let Ok(tbs) = self.inner.tbs_certificate.to_der() else {
            return false;
        };
        let Some(sig_bytes) = self.inner.signature.as_bytes() else {
            return false;
        };
        let Ok(signature) = RsaSignature::try_from(sig_bytes) else {
            return false;
        };

        let algorithm = self.inner.signature_algorithm.oid;
        if algorithm == SHA256_WITH_RSA {
            VerifyingKey::<Sha256>::new(key).verify(&tbs, &signature).is_ok()
        } else if algorithm == SHA384_WITH_RSA {
            VerifyingKey::<Sha384>::new(key).verify(&tbs, &signature).is_ok()
        } else if algorithm == SHA512_WITH_RSA {
            VerifyingKey::<Sha512>::new(key).verify(&tbs, &signature).is_ok()
        } else {
            tracing::debug!(%algorithm, subject = %self.subject(), "unsupported certificate signature algorithm");
            false
        }
    }

    /// `true` if `unix_seconds` falls inside `[notBefore, notAfter]`.
    pub fn is_valid_at(&self, unix_seconds: u64) -> bool {
        let validity = &self.inner.tbs_certificate.validity;
        let not_before = validity.not_before.to_unix_duration().as_secs();
        let not_after = validity.not_after.to_unix_duration().as_secs();
        not_before <= unix_seconds && unix_seconds <= not_after
    }

    /// Whether this certificate may act as an issuer.
    ///
    /// A certificate without a BasicConstraints extension is accepted as an
    /// issuer (legacy v1 roots); one that says `CA:FALSE` is not.
    pub fn may_issue(&self) -> bool {
        match self.basic_constraints() {
            Some(constraints) => constraints.ca,
            None => true,
        }
    }

    fn basic_constraints(&self) -> Option<BasicConstraints> {
        self.extension_value(BasicConstraints::OID)
            .and_then(|der| BasicConstraints::from_der(der).ok())
    }

    /// Dotted policy OIDs from the CertificatePolicies extension.
    pub fn policy_oids(&self) -> Vec<String> {
        self.extension_value(CertificatePolicies::OID)
            .and_then(|der| CertificatePolicies::from_der(der).ok())
            .map(|policies| {
                policies
                    .0
                    .iter()
                    .map(|info| info.policy_identifier.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `true` if any asserted policy is a known extended-validation policy.
    pub fn is_ev(&self) -> bool {
        self.policy_oids().iter().any(|oid| is_ev_policy(oid))
    }

    fn extension_value(&self, oid: ObjectIdentifier) -> Option<&[u8]> {
        self.inner
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.extn_id == oid)
            .map(|ext| ext.extn_value.as_bytes())
    }
}

/// Extract the RSA public key of a PEM certificate in one step.
pub fn public_key_from_certificate_pem(pem: &str) -> Result<RsaPublicKey> {
    X509Certificate::from_pem(pem)?.rsa_public_key()
}
