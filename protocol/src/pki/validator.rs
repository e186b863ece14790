//! Certificate path validation against a preloaded trust set.
//!
//! The validator answers one question: can this end-entity certificate be
//! chained, issuer by issuer, up to the root of a trusted chain? For each
//! known chain the trust anchor is the chain's root and the candidate
//! issuers are its intermediates. The first chain that yields a path wins.
//!
//! Each step of a path checks the issuer name, the issuer's signature over
//! the child, both validity windows, and that the issuer is not marked
//! `CA:FALSE`. Revocation is not checked.

use std::path::Path;

use tracing::{debug, info};

use super::certificate::X509Certificate;
use super::chain::{load_trust_store, CertificateChain};
use crate::config::MAX_CERTIFICATE_PATH_DEPTH;
use crate::error::{Bip75Error, Result};

/// Immutable trust set plus path building.
///
/// Safe to share across threads; wrap it in an `Arc` and hand clones to
/// every processor.
#[derive(Clone, Debug)]
pub struct CertificateValidator {
    chains: Vec<CertificateChain>,
}

impl CertificateValidator {
    /// Load every chain file from a trust-store directory.
    ///
    /// # Errors
    ///
    /// [`Bip75Error::InvalidCertificateChain`] if the directory is missing,
    /// empty, or holds a chain that breaks the self-signed invariants.
    pub fn new(trust_store: impl AsRef<Path>) -> Result<Self> {
        let dir = trust_store.as_ref();
        let chains = load_trust_store(dir)?;
        info!(
            trust_store = %dir.display(),
            chains = chains.len(),
            "certificate trust store loaded"
        );
        Ok(Self { chains })
    }

    /// Build a validator from chains already in memory.
    pub fn from_chains(chains: Vec<CertificateChain>) -> Result<Self> {
        if chains.is_empty() {
            return Err(Bip75Error::InvalidCertificateChain(
                "at least one trusted chain is required".to_string(),
            ));
        }
        Ok(Self { chains })
    }

    /// The loaded trust set.
    pub fn chains(&self) -> &[CertificateChain] {
        &self.chains
    }

    /// Validate a PEM certificate against the preloaded trust set.
    ///
    /// Returns `Ok(false)` when no trusted chain yields a path.
    ///
    /// # Errors
    ///
    /// [`Bip75Error::InvalidCertificate`] if the PEM does not parse, and
    /// [`Bip75Error::InvalidCertificateChain`] if the certificate is
    /// self-signed. Both are raised before any path is attempted.
    pub fn validate(&self, client_certificate_pem: &str) -> Result<bool> {
        self.validate_with_chains(client_certificate_pem, &self.chains)
    }

    /// Validate against an explicit, possibly narrower, set of chains.
    pub fn validate_with_chains(
        &self,
        client_certificate_pem: &str,
        chains: &[CertificateChain],
    ) -> Result<bool> {
        let client = X509Certificate::from_pem(client_certificate_pem)?;
        if client.is_self_signed() {
            return Err(Bip75Error::InvalidCertificateChain(format!(
                "client certificate {} is self-signed",
                client.subject()
            )));
        }

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let trusted = chains.iter().any(|chain| build_path(&client, chain, now));
        debug!(subject = %client.subject(), trusted, "certificate path validation");
        Ok(trusted)
    }

    /// `true` if the certificate carries a known extended-validation policy.
    pub fn is_ev_certificate(&self, certificate_pem: &str) -> Result<bool> {
        Ok(X509Certificate::from_pem(certificate_pem)?.is_ev())
    }
}

/// Depth-first search from `client` to `chain.root()` through the chain's
/// intermediates, never reusing an intermediate within one path.
fn build_path(client: &X509Certificate, chain: &CertificateChain, now: u64) -> bool {
    let mut used = vec![false; chain.intermediates().len()];
    extend_path(client, chain, now, &mut used, 0)
}

fn extend_path(
    current: &X509Certificate,
    chain: &CertificateChain,
    now: u64,
    used: &mut [bool],
    depth: usize,
) -> bool {
    if depth > MAX_CERTIFICATE_PATH_DEPTH || !current.is_valid_at(now) {
        return false;
    }

    let anchor = chain.root();
    if anchor.may_issue() && anchor.is_valid_at(now) && current.is_issued_by(anchor) {
        return true;
    }

    for (index, issuer) in chain.intermediates().iter().enumerate() {
        if used[index] || !issuer.may_issue() || !current.is_issued_by(issuer) {
            continue;
        }
        used[index] = true;
        if extend_path(issuer, chain, now, used, depth + 1) {
            return true;
        }
        used[index] = false;
    }
    false
}
