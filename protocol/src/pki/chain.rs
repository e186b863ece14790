//! Trusted certificate chains and the trust-store loader.
//!
//! A trust store is a directory; every regular file in it is one chain in
//! PEM form (root plus intermediates, in any order). The root is the one
//! self-signed certificate in the file.

use std::fs;
use std::path::Path;

use super::certificate::X509Certificate;
use crate::error::{Bip75Error, Result};

/// One trusted chain: a self-signed root and the intermediates below it.
#[derive(Clone, Debug)]
pub struct CertificateChain {
    root: X509Certificate,
    intermediates: Vec<X509Certificate>,
}

impl CertificateChain {
    /// Build a chain, enforcing that the root is self-signed and that no
    /// intermediate is.
    pub fn new(root: X509Certificate, intermediates: Vec<X509Certificate>) -> Result<Self> {
        if !root.is_self_signed() {
            return Err(Bip75Error::InvalidCertificateChain(format!(
                "root certificate {} is not self-signed",
                root.subject()
            )));
        }
        if let Some(bad) = intermediates.iter().find(|c| c.is_self_signed()) {
            return Err(Bip75Error::InvalidCertificateChain(format!(
                "intermediate certificate {} is self-signed",
                bad.subject()
            )));
        }
        Ok(Self {
            root,
            intermediates,
        })
    }

    /// Build a chain from PEM strings.
    pub fn from_pems(root_pem: &str, intermediate_pems: &[&str]) -> Result<Self> {
        let root = X509Certificate::from_pem(root_pem)?;
        let intermediates = intermediate_pems
            .iter()
            .map(|pem| X509Certificate::from_pem(pem))
            .collect::<Result<Vec<_>>>()?;
        Self::new(root, intermediates)
    }

    /// Split a PEM bundle into root and intermediates.
    ///
    /// `source` names the bundle in error messages.
    pub fn from_pem_bundle(bytes: &[u8], source: &str) -> Result<Self> {
        let certs = X509Certificate::bundle_from_pem(bytes).map_err(|e| {
            Bip75Error::InvalidCertificateChain(format!("{source}: {e}"))
        })?;
        if certs.is_empty() {
            return Err(Bip75Error::InvalidCertificateChain(format!(
                "{source}: no certificates found"
            )));
        }

        let (mut roots, intermediates): (Vec<_>, Vec<_>) =
            certs.into_iter().partition(|c| c.is_self_signed());
        match roots.len() {
            0 => Err(Bip75Error::InvalidCertificateChain(format!(
                "{source}: no self-signed root certificate"
            ))),
            1 => Self::new(roots.remove(0), intermediates),
            n => Err(Bip75Error::InvalidCertificateChain(format!(
                "{source}: {n} self-signed certificates, intermediates must not be self-signed"
            ))),
        }
    }

    /// The trust anchor.
    pub fn root(&self) -> &X509Certificate {
        &self.root
    }

    /// Intermediates in file order.
    pub fn intermediates(&self) -> &[X509Certificate] {
        &self.intermediates
    }
}

/// Load every chain file in `dir`.
///
/// Hidden files are skipped. Files are read in name order so that the
/// resulting trust set, and therefore validation order, is stable.
pub fn load_trust_store(dir: &Path) -> Result<Vec<CertificateChain>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Bip75Error::InvalidCertificateChain(format!(
            "cannot read trust store {}: {e}",
            dir.display()
        ))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Bip75Error::InvalidCertificateChain(e.to_string()))?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'));
        if path.is_file() && !hidden {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(Bip75Error::InvalidCertificateChain(format!(
            "trust store {} contains no certificate chains",
            dir.display()
        )));
    }

    paths
        .iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|e| {
                Bip75Error::InvalidCertificateChain(format!("{}: {e}", path.display()))
            })?;
            CertificateChain::from_pem_bundle(&bytes, &path.display().to_string())
        })
        .collect()
}
