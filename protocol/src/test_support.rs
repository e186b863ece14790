//! Shared fixtures for unit tests.

use std::path::PathBuf;
use std::sync::Arc;

use crate::pki::{CertificateChain, CertificateValidator};

/// PEM fixtures under `tests/fixtures/`.
///
/// One RSA hierarchy (root, intermediate, four leaves), an unrelated rogue
/// root with its own leaf, a self-signed leaf, and three secp256k1 key
/// pairs for envelope encryption.
pub mod fixture {
    pub const ROOT_CERT: &str = include_str!("../tests/fixtures/root.pem");
    pub const INTERMEDIATE_CERT: &str = include_str!("../tests/fixtures/intermediate.pem");

    pub const SENDER_CERT: &str = include_str!("../tests/fixtures/sender.pem");
    pub const SENDER_KEY: &str = include_str!("../tests/fixtures/sender.key");
    pub const ORIGINATOR_CERT: &str = include_str!("../tests/fixtures/originator.pem");
    pub const ORIGINATOR_KEY: &str = include_str!("../tests/fixtures/originator.key");
    pub const BENEFICIARY_CERT: &str = include_str!("../tests/fixtures/beneficiary.pem");
    pub const BENEFICIARY_KEY: &str = include_str!("../tests/fixtures/beneficiary.key");
    pub const EV_CERT: &str = include_str!("../tests/fixtures/ev.pem");

    pub const ROGUE_ROOT_CERT: &str = include_str!("../tests/fixtures/rogue_root.pem");
    pub const UNTRUSTED_CERT: &str = include_str!("../tests/fixtures/untrusted.pem");
    pub const UNTRUSTED_KEY: &str = include_str!("../tests/fixtures/untrusted.key");
    pub const SELF_SIGNED_CERT: &str = include_str!("../tests/fixtures/self_signed.pem");

    pub const SENDER_EC_KEY: &str = include_str!("../tests/fixtures/sender_ec.key");
    pub const SENDER_EC_PUB: &str = include_str!("../tests/fixtures/sender_ec_pub.pem");
    pub const RECIPIENT_EC_KEY: &str = include_str!("../tests/fixtures/recipient_ec.key");
    pub const RECIPIENT_EC_PUB: &str = include_str!("../tests/fixtures/recipient_ec_pub.pem");
    pub const OTHER_EC_KEY: &str = include_str!("../tests/fixtures/other_ec.key");
    pub const OTHER_EC_PUB: &str = include_str!("../tests/fixtures/other_ec_pub.pem");
}

/// Directory holding the test root and intermediate as one chain file.
pub fn trust_store_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/trust_store")
}

/// Validator trusting the fixture hierarchy.
pub fn trusted_validator() -> CertificateValidator {
    let chain = CertificateChain::from_pems(fixture::ROOT_CERT, &[fixture::INTERMEDIATE_CERT])
        .expect("fixture chain");
    CertificateValidator::from_chains(vec![chain]).expect("fixture validator")
}

pub fn shared_validator() -> Arc<CertificateValidator> {
    Arc::new(trusted_validator())
}
