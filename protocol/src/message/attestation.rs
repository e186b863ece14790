//! Owner attestation signing and verification.
//!
//! Only the primary owner of a list signs. Its signature over each X.509
//! attestation is `hex(RSA-SHA256(hex(SHA-256(body with every signature
//! blank))))`; see [`MessageBody::attestation_digest`]. Entries of
//! non-primary owners are asserted with an empty signature, but their
//! certificates must still chain to a trusted root.

use tracing::{debug, warn};

use super::body::{MessageBody, Owner, OwnerRole, PkiData};
use super::params::{OwnerParameters, PkiDataParameters};
use super::types::Attestation;
use crate::crypto::signatures::{rsa_sign_with_pem, rsa_verify};
use crate::error::{Bip75Error, Result};
use crate::pki::{public_key_from_certificate_pem, CertificateValidator};

/// Signature produced for one owner attestation.
///
/// Records are produced in owner order and attached positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationSignature {
    pub role: OwnerRole,
    pub owner_index: usize,
    pub pki_index: usize,
    pub attestation: Attestation,
    pub signature: String,
}

/// Check that `owners` has exactly one primary entry.
pub fn validate_owners(owners: &[OwnerParameters], role: OwnerRole) -> Result<()> {
    match owners.iter().filter(|o| o.primary_for_transaction).count() {
        1 => Ok(()),
        0 => Err(Bip75Error::InvalidOwners(format!(
            "no primary owner in {role}"
        ))),
        n => Err(Bip75Error::InvalidOwners(format!(
            "multiple primary owners in {role}: found {n}"
        ))),
    }
}

fn pki_data_from_parameters(params: &PkiDataParameters) -> Result<PkiData> {
    let certificate_pem = match (&params.certificate_pem, params.pki_type.is_signed()) {
        (Some(pem), _) => pem.clone(),
        (None, false) => String::new(),
        (None, true) => {
            return Err(Bip75Error::InvalidCertificate(format!(
                "attestation {} is {} but has no certificate",
                params.attestation, params.pki_type
            )))
        }
    };
    Ok(PkiData {
        attestation: params.attestation,
        certificate_pem,
        pki_type: params.pki_type,
        signature: String::new(),
    })
}

/// Unsigned wire owners for a list of owner parameters.
pub fn owners_from_parameters(owners: &[OwnerParameters]) -> Result<Vec<Owner>> {
    owners
        .iter()
        .map(|owner| {
            Ok(Owner {
                primary_for_transaction: owner.primary_for_transaction,
                pki_data: owner
                    .pki_data_parameters
                    .iter()
                    .map(pki_data_from_parameters)
                    .collect::<Result<_>>()?,
            })
        })
        .collect()
}

/// Produce the signature records for one owner list.
///
/// `digest` is the body's [`MessageBody::attestation_digest`].
pub fn sign_attestations(
    owners: &[OwnerParameters],
    role: OwnerRole,
    digest: &str,
) -> Result<Vec<AttestationSignature>> {
    let mut records = Vec::new();
    for (owner_index, owner) in owners.iter().enumerate() {
        for (pki_index, params) in owner.pki_data_parameters.iter().enumerate() {
            if !params.pki_type.is_signed() {
                continue;
            }
            let signature = if owner.primary_for_transaction {
                let key = params.private_key_pem.as_deref().ok_or_else(|| {
                    Bip75Error::InvalidKey(format!(
                        "primary attestation {} has no private key",
                        params.attestation
                    ))
                })?;
                rsa_sign_with_pem(key, digest.as_bytes())?
            } else {
                String::new()
            };
            records.push(AttestationSignature {
                role,
                owner_index,
                pki_index,
                attestation: params.attestation,
                signature,
            });
        }
    }
    debug!(%role, signatures = records.len(), "attestations signed");
    Ok(records)
}

/// Verify every owner list of `body`, in order. The first failure aborts.
pub fn verify_attestations(body: &MessageBody, validator: &CertificateValidator) -> Result<()> {
    let digest = body.attestation_digest()?;
    for (role, owners) in body.owner_lists() {
        for owner in owners {
            for pki in owner.pki_data.iter().filter(|p| p.pki_type.is_signed()) {
                verify_entry(pki, owner.primary_for_transaction, &digest, validator).map_err(
                    |err| {
                        warn!(%role, attestation = %pki.attestation, error = %err, "attestation rejected");
                        err
                    },
                )?;
            }
        }
    }
    Ok(())
}

fn verify_entry(
    pki: &PkiData,
    primary: bool,
    digest: &str,
    validator: &CertificateValidator,
) -> Result<()> {
    match validator.validate(&pki.certificate_pem) {
        Ok(true) => {}
        Ok(false) => {
            return Err(Bip75Error::InvalidCertificateChain(format!(
                "certificate for attestation {} is not rooted in a trusted chain",
                pki.attestation
            )))
        }
        Err(err) => {
            return Err(Bip75Error::InvalidCertificateChain(format!(
                "certificate for attestation {}: {err}",
                pki.attestation
            )))
        }
    }

    if !primary {
        return Ok(());
    }
    if pki.signature.is_empty() {
        return Err(Bip75Error::InvalidSignature(format!(
            "attestation {} of the primary owner is not signed",
            pki.attestation
        )));
    }
    let key = public_key_from_certificate_pem(&pki.certificate_pem)?;
    rsa_verify(&key, digest.as_bytes(), &pki.signature).map_err(|_| {
        Bip75Error::InvalidSignature(format!(
            "signature for attestation {} does not verify",
            pki.attestation
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::body::InvoiceRequest;
    use crate::test_support::{fixture, trusted_validator};

    fn primary() -> OwnerParameters {
        OwnerParameters {
            primary_for_transaction: true,
            pki_data_parameters: vec![
                PkiDataParameters::x509(
                    Attestation::NaturalPersonFirstName,
                    fixture::ORIGINATOR_CERT,
                    fixture::ORIGINATOR_KEY,
                ),
                PkiDataParameters::x509(
                    Attestation::NaturalPersonLastName,
                    fixture::ORIGINATOR_CERT,
                    fixture::ORIGINATOR_KEY,
                ),
            ],
        }
    }

    fn secondary() -> OwnerParameters {
        OwnerParameters {
            primary_for_transaction: false,
            pki_data_parameters: vec![PkiDataParameters::unsigned(
                Attestation::NaturalPersonFirstName,
            )],
        }
    }

    fn signed_body(owners: &[OwnerParameters]) -> MessageBody {
        let mut body = MessageBody::InvoiceRequest(InvoiceRequest {
            amount: 42,
            originators: owners_from_parameters(owners).unwrap(),
            ..InvoiceRequest::default()
        });
        let digest = body.attestation_digest().unwrap();
        let records = sign_attestations(owners, OwnerRole::Originator, &digest).unwrap();
        body.attach_attestation_signatures(&records).unwrap();
        body
    }

    #[test]
    fn test_exactly_one_primary() {
        assert!(validate_owners(&[primary(), secondary()], OwnerRole::Originator).is_ok());
    }

    #[test]
    fn test_no_primary_fails() {
        let err = validate_owners(&[secondary()], OwnerRole::Beneficiary).unwrap_err();
        assert!(err.to_string().contains("no primary"));
        assert!(validate_owners(&[], OwnerRole::Originator).is_err());
    }

    #[test]
    fn test_multiple_primaries_fail() {
        let err = validate_owners(&[primary(), primary()], OwnerRole::Originator).unwrap_err();
        assert!(matches!(&err, Bip75Error::InvalidOwners(msg) if msg.contains("multiple primary")));
    }

    #[test]
    fn test_only_primary_entries_are_signed() {
        let mut other = secondary();
        other.pki_data_parameters = vec![PkiDataParameters {
            private_key_pem: None,
            ..PkiDataParameters::x509(
                Attestation::NaturalPersonFirstName,
                fixture::BENEFICIARY_CERT,
                "",
            )
        }];
        let records = sign_attestations(&[primary(), other], OwnerRole::Originator, "digest").unwrap();
        assert_eq!(records.len(), 3);
        assert!(!records[0].signature.is_empty());
        assert!(!records[1].signature.is_empty());
        assert_eq!(records[2].owner_index, 1);
        assert!(records[2].signature.is_empty());
    }

    #[test]
    fn test_unsigned_entries_produce_no_records() {
        let records = sign_attestations(&[secondary()], OwnerRole::Originator, "digest").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_primary_without_key_fails() {
        let mut owner = primary();
        owner.pki_data_parameters[0].private_key_pem = None;
        assert!(matches!(
            sign_attestations(&[owner], OwnerRole::Originator, "digest"),
            Err(Bip75Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_signed_attestations_verify() {
        let body = signed_body(&[primary(), secondary()]);
        verify_attestations(&body, &trusted_validator()).unwrap();
    }

    #[test]
    fn test_tampered_body_fails_attestation() {
        let mut body = signed_body(&[primary()]);
        if let MessageBody::InvoiceRequest(req) = &mut body {
            req.amount = 43;
        }
        let err = verify_attestations(&body, &trusted_validator()).unwrap_err();
        assert!(matches!(&err, Bip75Error::InvalidSignature(msg) if msg.contains("NATURAL_PERSON_FIRST_NAME")));
    }

    #[test]
    fn test_missing_primary_signature_fails() {
        let mut body = signed_body(&[primary()]);
        if let MessageBody::InvoiceRequest(req) = &mut body {
            req.originators[0].pki_data[1].signature.clear();
        }
        let err = verify_attestations(&body, &trusted_validator()).unwrap_err();
        assert!(matches!(&err, Bip75Error::InvalidSignature(msg) if msg.contains("NATURAL_PERSON_LAST_NAME")));
    }

    #[test]
    fn test_untrusted_attestation_certificate_fails() {
        let owner = OwnerParameters {
            primary_for_transaction: true,
            pki_data_parameters: vec![PkiDataParameters::x509(
                Attestation::DateOfBirth,
                fixture::UNTRUSTED_CERT,
                fixture::UNTRUSTED_KEY,
            )],
        };
        let body = signed_body(&[owner]);
        let err = verify_attestations(&body, &trusted_validator()).unwrap_err();
        assert!(matches!(&err, Bip75Error::InvalidCertificateChain(msg) if msg.contains("DATE_OF_BIRTH")));
    }

    #[test]
    fn test_x509_entry_without_certificate_fails() {
        let owner = OwnerParameters {
            primary_for_transaction: true,
            pki_data_parameters: vec![PkiDataParameters {
                certificate_pem: None,
                ..PkiDataParameters::x509(Attestation::AccountNumber, "", fixture::ORIGINATOR_KEY)
            }],
        };
        assert!(matches!(
            owners_from_parameters(&[owner]),
            Err(Bip75Error::InvalidCertificate(_))
        ));
    }
}
