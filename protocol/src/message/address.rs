//! Address-information lookup seam.
//!
//! The engine never resolves addresses itself. A caller that wants
//! compliance metadata on parsed outputs plugs in an
//! [`AddressInformationProvider`]; its errors reach the caller unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::AddressCurrency;

/// Failure reported by an address-information provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressInformationError {
    #[error("address information provider error: {0}")]
    Provider(String),

    #[error("address information provider rejected the credentials: {0}")]
    Unauthorized(String),
}

/// Risk and activity metadata for one address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressInformation {
    pub identifier: String,
    pub alert: bool,
    pub balance: f64,
    pub currency: Option<AddressCurrency>,
    pub currency_verbose: Vec<String>,
    pub earliest_transaction_time: String,
    pub latest_transaction_time: String,
    pub risk_level: i32,
    pub risk_level_verbose: String,
    pub risk_reason: String,
    pub total_incoming_value: String,
    pub total_incoming_value_usd: String,
    pub total_outgoing_value: String,
    pub total_outgoing_value_usd: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Resolves a currency and address to [`AddressInformation`].
///
/// Implementations must be shareable across threads; the engine imposes no
/// timeout and does not retry.
pub trait AddressInformationProvider: Send + Sync {
    fn get_address_information(
        &self,
        currency: AddressCurrency,
        address: &str,
    ) -> Result<AddressInformation, AddressInformationError>;
}
