//! # Protocol Configuration & Constants
//!
//! Every magic number in the BIP75 engine lives here: the envelope version,
//! the byte layout of the hybrid-encryption payload, and the certificate
//! policy identifiers that mark an extended-validation certificate.
//!
//! Several of these values are fixed by counterparties already speaking the
//! protocol. Changing them breaks interoperability, not just tests.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Envelope version written into every plain `ProtocolMessage`.
pub const PROTOCOL_VERSION: u32 = 1;

/// Status message used when the caller does not provide one.
pub const DEFAULT_STATUS_MESSAGE: &str = "OK";

/// Version of the serialized payment details inside a PaymentRequest.
pub const PAYMENT_DETAILS_VERSION: u32 = 1;

/// Network name carried in PaymentDetails when the caller does not set one.
pub const DEFAULT_NETWORK: &str = "main";

// ---------------------------------------------------------------------------
// Hybrid Encryption Layout
// ---------------------------------------------------------------------------

/// Uncompressed secp256k1 public key length (0x04 || X || Y).
pub const EC_PUBLIC_KEY_LENGTH: usize = 65;

/// HMAC-SHA1 output length.
pub const MAC_LENGTH: usize = 20;

/// AES-256 key length; also the MAC key length (SHA-512 split in half).
pub const AES_KEY_LENGTH: usize = 32;

/// AES block size, and therefore the CBC IV length.
pub const AES_IV_LENGTH: usize = 16;

/// Hex offsets of the three segments in an encrypted payload.
/// Two hex characters per byte.
pub const HEX_PUBLIC_KEY_END: usize = EC_PUBLIC_KEY_LENGTH * 2;
pub const HEX_MAC_END: usize = HEX_PUBLIC_KEY_END + MAC_LENGTH * 2;

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

/// Upper bound on the number of issuers walked while building a path.
/// A chain file rarely holds more than three intermediates.
pub const MAX_CERTIFICATE_PATH_DEPTH: usize = 8;

/// Certificate policy OIDs that identify an extended-validation certificate.
///
/// The first entry is the CA/Browser Forum EV policy. The rest are the
/// vendor-specific EV policies still seen in the wild.
pub const EV_POLICY_OIDS: &[&str] = &[
    "2.23.140.1.1",
    "1.3.6.1.4.1.34697.2.1",
    "1.3.6.1.4.1.6449.1.2.1.5.1",
    "2.16.840.1.114412.2.1",
    "2.16.840.1.114413.1.7.23.3",
    "2.16.840.1.114414.1.7.23.3",
    "1.3.6.1.4.1.14370.1.6",
    "2.16.840.1.113733.1.7.23.6",
    "2.16.840.1.114028.10.1.2",
    "1.3.6.1.4.1.4146.1.1",
];

/// Environment variable consulted by tooling for the trust-store directory.
pub const TRUST_STORE_ENV: &str = "BIP75_TRUST_STORE";

/// Returns `true` if the dotted OID is one of the known EV policy markers.
pub fn is_ev_policy(oid: &str) -> bool {
    EV_POLICY_OIDS.contains(&oid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encryption_offsets_match_layout() {
        assert_eq!(HEX_PUBLIC_KEY_END, 130);
        assert_eq!(HEX_MAC_END, 170);
    }

    #[test]
    fn cab_forum_policy_is_ev() {
        assert!(is_ev_policy("2.23.140.1.1"));
        assert!(!is_ev_policy("2.23.140.1.2.1"));
    }

    #[test]
    fn ev_policy_list_has_no_duplicates() {
        let mut oids = EV_POLICY_OIDS.to_vec();
        oids.sort_unstable();
        oids.dedup();
        assert_eq!(oids.len(), EV_POLICY_OIDS.len());
    }
}
