// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # BIP75 Protocol — Core Library
//!
//! Attested, optionally encrypted payment-protocol messages exchanged
//! between payment counterparties before a transaction settles. Four
//! message kinds are supported: InvoiceRequest, PaymentRequest, Payment and
//! PaymentAck.
//!
//! ## Architecture
//!
//! - **crypto** — SHA-256/512, RSA-SHA256, ECDSA secp256k1 and the hybrid
//!   ECDH + AES-256-CBC + HMAC-SHA1 body encryption.
//! - **pki** — X.509 trust store loading and certificate path validation.
//! - **message** — Wire types, creation parameters, attestation signing and
//!   the envelope codec.
//! - **processor** — Per-kind create / validate / parse pipelines and the
//!   [`Bip75`] facade.
//! - **config** — Protocol constants.
//!
//! ## Design Philosophy
//!
//! 1. Every check fails fast with a named error. `is_valid` never answers
//!    `false` quietly.
//! 2. Algorithms are chosen per call. There is no global provider state.
//! 3. The trust set is loaded once and shared immutably.
//! 4. Bytes in, bytes out: no transport, no queues.

pub mod config;
pub mod crypto;
pub mod error;
pub mod message;
pub mod pki;
pub mod processor;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Bip75Error, Result};
pub use message::{
    AddressCurrency, AddressInformation, AddressInformationError, AddressInformationProvider,
    Attestation, EncryptionParameters, InvoiceRequest, MessageBody, MessageInformation,
    MessageType, Output, Owner, OwnerParameters, Payment, PaymentAck, PaymentDetails,
    PaymentRequest, PkiData, PkiDataParameters, PkiType, ProtocolMessageMetadata,
    RecipientParameters, SenderParameters, StatusCode,
};
pub use pki::{CertificateChain, CertificateValidator};
pub use processor::{
    Bip75, InvoiceRequestParameters, InvoiceRequestProcessor, MessageProcessor, Parsed,
    PaymentAckParameters, PaymentAckProcessor, PaymentParameters, PaymentProcessor,
    PaymentRequestParameters, PaymentRequestProcessor,
};
