//! # Message Module
//!
//! Wire types, creation parameters and the codec for the four BIP75
//! message kinds.
//!
//! ## Architecture
//!
//! ```text
//! types.rs       — Wire enums (PkiType, Attestation, StatusCode, MessageType)
//! params.rs      — Caller-supplied creation parameters, private keys included
//! body.rs        — InvoiceRequest, PaymentRequest, Payment, PaymentAck, MessageBody
//! attestation.rs — Owner invariant, attestation signing and verification
//! envelope.rs    — Plain/encrypted envelope wrap, unwrap, metadata, status change
//! address.rs     — Address-information provider seam
//! ```
//!
//! ## Message Lifecycle
//!
//! 1. **Build** the unsigned body from parameters.
//! 2. **Attest**: primary owners sign the body with all signatures blank.
//! 3. **Sign**: the sender signs the body including owner signatures.
//! 4. **Wrap**: serialize into a plain envelope, encrypted when requested.
//!
//! Reading reverses the steps; any broken invariant is terminal.

pub mod address;
pub mod attestation;
pub mod body;
pub mod envelope;
pub mod params;
pub mod types;

pub use address::{AddressInformation, AddressInformationError, AddressInformationProvider};
pub use attestation::{validate_owners, AttestationSignature};
pub use body::{
    InvoiceRequest, MessageBody, Output, Owner, OwnerRole, Payment, PaymentAck, PaymentDetails,
    PaymentRequest, PkiData,
};
pub use envelope::{
    change_status, extract_metadata, EncryptedProtocolMessage, ProtocolMessage,
    ProtocolMessageMetadata, WireEnvelope,
};
pub use params::{
    EncryptionParameters, MessageInformation, OwnerParameters, PkiDataParameters,
    RecipientParameters, SenderParameters,
};
pub use types::{AddressCurrency, Attestation, MessageType, PkiType, StatusCode};
