//! # Certificate Trust
//!
//! Trusted chains are loaded once from a trust-store directory and held
//! immutably by a [`CertificateValidator`]. Sender certificates, sender EV
//! certificates and every attestation certificate are checked against it.

pub mod certificate;
pub mod chain;
pub mod validator;

pub use certificate::{public_key_from_certificate_pem, X509Certificate};
pub use chain::{load_trust_store, CertificateChain};
pub use validator::CertificateValidator;
