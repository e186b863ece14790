//! Core enums shared by every message kind.
//!
//! The wire representation of each enum is fixed by counterparties already
//! speaking the protocol: status codes and message types travel as their
//! numeric codes, PKI types and attestations as their string names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// PkiType
// ---------------------------------------------------------------------------

/// How an attestation or sender is backed by a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PkiType {
    /// Asserted, not signed.
    None,
    /// X.509 certificate, RSA-SHA256 signature.
    X509Sha256,
}

impl PkiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::X509Sha256 => "x509+sha256",
        }
    }

    /// `true` when entries of this type carry a certificate and signature.
    pub fn is_signed(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Default for PkiType {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for PkiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PkiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "x509+sha256" => Ok(Self::X509Sha256),
            other => Err(format!("unknown pki type {other:?}")),
        }
    }
}

impl From<PkiType> for String {
    fn from(value: PkiType) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for PkiType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Attestation
// ---------------------------------------------------------------------------

macro_rules! attestations {
    ($($variant:ident => $wire:literal,)+) => {
        /// Kind of identity claim an owner attests to.
        ///
        /// Each variant travels as its upper-case wire name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub enum Attestation {
            $($variant,)+
        }

        impl Attestation {
            /// Every attestation kind, in declaration order.
            pub const ALL: &'static [Attestation] = &[$(Attestation::$variant,)+];

            /// Wire name of this attestation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl FromStr for Attestation {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(format!("unknown attestation {other:?}")),
                }
            }
        }
    };
}

attestations! {
    AddressDepartment => "ADDRESS_DEPARTMENT",
    AddressSubDepartment => "ADDRESS_SUB_DEPARTMENT",
    AddressStreetName => "ADDRESS_STREET_NAME",
    AddressBuildingNumber => "ADDRESS_BUILDING_NUMBER",
    AddressBuildingName => "ADDRESS_BUILDING_NAME",
    AddressFloor => "ADDRESS_FLOOR",
    AddressPostbox => "ADDRESS_POSTBOX",
    AddressRoom => "ADDRESS_ROOM",
    AddressPostcode => "ADDRESS_POSTCODE",
    AddressTownName => "ADDRESS_TOWN_NAME",
    AddressTownLocationName => "ADDRESS_TOWN_LOCATION_NAME",
    AddressDistrictName => "ADDRESS_DISTRICT_NAME",
    AddressCountrySubDivision => "ADDRESS_COUNTRY_SUB_DIVISION",
    AddressAddressLine => "ADDRESS_ADDRESS_LINE",
    AddressCountry => "ADDRESS_COUNTRY",
    NaturalPersonPrimaryName => "NATURAL_PERSON_PRIMARY_NAME",
    NaturalPersonSecondaryName => "NATURAL_PERSON_SECONDARY_NAME",
    NaturalPersonPhoneticNameIdentifier => "NATURAL_PERSON_PHONETIC_NAME_IDENTIFIER",
    NaturalPersonFirstName => "NATURAL_PERSON_FIRST_NAME",
    NaturalPersonLastName => "NATURAL_PERSON_LAST_NAME",
    LegalPersonPrimaryName => "LEGAL_PERSON_PRIMARY_NAME",
    LegalPersonSecondaryName => "LEGAL_PERSON_SECONDARY_NAME",
    LegalPersonNameIdentifierType => "LEGAL_PERSON_NAME_IDENTIFIER_TYPE",
    LegalPersonPhoneticNameIdentifier => "LEGAL_PERSON_PHONETIC_NAME_IDENTIFIER",
    DateOfBirth => "DATE_OF_BIRTH",
    PlaceOfBirth => "PLACE_OF_BIRTH",
    CountryOfResidence => "COUNTRY_OF_RESIDENCE",
    CountryOfIssue => "COUNTRY_OF_ISSUE",
    CountryOfRegistration => "COUNTRY_OF_REGISTRATION",
    NationalIdentifier => "NATIONAL_IDENTIFIER",
    NationalIdentifierType => "NATIONAL_IDENTIFIER_TYPE",
    AccountNumber => "ACCOUNT_NUMBER",
    CustomerIdentification => "CUSTOMER_IDENTIFICATION",
    RegistrationAuthority => "REGISTRATION_AUTHORITY",
    BeneficiaryPersonFirstName => "BENEFICIARY_PERSON_FIRST_NAME",
    BeneficiaryPersonLastName => "BENEFICIARY_PERSON_LAST_NAME",
}

impl fmt::Display for Attestation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Attestation> for String {
    fn from(value: Attestation) -> Self {
        value.as_str().to_string()
    }
}

impl TryFrom<String> for Attestation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// StatusCode
// ---------------------------------------------------------------------------

/// Processing status a counterparty reports back on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum StatusCode {
    Ok,
    Cancel,
    GeneralUnknownError,
    VersionTooHigh,
    AuthenticationFailed,
    EncryptedMessageRequired,
    AmountTooHigh,
    AmountTooLow,
    AmountInvalid,
    PaymentRequirementsNotMet,
    CertificateRequired,
    CertificateExpired,
    CertificateInvalidForTransaction,
    CertificateRevoked,
    CertificateNotWellRooted,
}

impl StatusCode {
    /// Numeric wire code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Ok => 1,
            Self::Cancel => 2,
            Self::GeneralUnknownError => 100,
            Self::VersionTooHigh => 101,
            Self::AuthenticationFailed => 102,
            Self::EncryptedMessageRequired => 103,
            Self::AmountTooHigh => 200,
            Self::AmountTooLow => 201,
            Self::AmountInvalid => 202,
            Self::PaymentRequirementsNotMet => 203,
            Self::CertificateRequired => 300,
            Self::CertificateExpired => 301,
            Self::CertificateInvalidForTransaction => 302,
            Self::CertificateRevoked => 303,
            Self::CertificateNotWellRooted => 304,
        }
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({})", self.code())
    }
}

impl From<StatusCode> for u32 {
    fn from(value: StatusCode) -> Self {
        value.code()
    }
}

impl TryFrom<u32> for StatusCode {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::Ok,
            2 => Self::Cancel,
            100 => Self::GeneralUnknownError,
            101 => Self::VersionTooHigh,
            102 => Self::AuthenticationFailed,
            103 => Self::EncryptedMessageRequired,
            200 => Self::AmountTooHigh,
            201 => Self::AmountTooLow,
            202 => Self::AmountInvalid,
            203 => Self::PaymentRequirementsNotMet,
            300 => Self::CertificateRequired,
            301 => Self::CertificateExpired,
            302 => Self::CertificateInvalidForTransaction,
            303 => Self::CertificateRevoked,
            304 => Self::CertificateNotWellRooted,
            other => return Err(format!("unknown status code {other}")),
        })
    }
}

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// Kind of body carried by an envelope.
///
/// `Unknown` is what an encrypted envelope reports before it is decrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum MessageType {
    Unknown,
    InvoiceRequest,
    PaymentRequest,
    Payment,
    PaymentAck,
}

impl MessageType {
    pub fn code(&self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::InvoiceRequest => 1,
            Self::PaymentRequest => 2,
            Self::Payment => 3,
            Self::PaymentAck => 4,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::InvoiceRequest => write!(f, "InvoiceRequest"),
            Self::PaymentRequest => write!(f, "PaymentRequest"),
            Self::Payment => write!(f, "Payment"),
            Self::PaymentAck => write!(f, "PaymentAck"),
        }
    }
}

impl From<MessageType> for u32 {
    fn from(value: MessageType) -> Self {
        value.code()
    }
}

impl TryFrom<u32> for MessageType {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::InvoiceRequest),
            2 => Ok(Self::PaymentRequest),
            3 => Ok(Self::Payment),
            4 => Ok(Self::PaymentAck),
            other => Err(format!("unknown message type {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// AddressCurrency
// ---------------------------------------------------------------------------

/// Currency of an output address, used for address-information lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressCurrency {
    Bitcoin,
    Ethereum,
    Litecoin,
    BitcoinCash,
}

impl Default for AddressCurrency {
    fn default() -> Self {
        Self::Bitcoin
    }
}

impl fmt::Display for AddressCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitcoin => write!(f, "BITCOIN"),
            Self::Ethereum => write!(f, "ETHEREUM"),
            Self::Litecoin => write!(f, "LITECOIN"),
            Self::BitcoinCash => write!(f, "BITCOIN_CASH"),
        }
    }
}
