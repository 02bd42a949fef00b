use crate::value_objects::Address;
use serde::{Deserialize, Serialize};

/// Highest token precision the router accepts.
pub const MAX_DECIMALS: u8 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }

    /// The chain's native asset (18 decimals).
    pub fn native(symbol: impl Into<String>) -> Self {
        Self::new(Address::NATIVE, symbol, 18)
    }

    pub fn is_native(&self) -> bool {
        self.address.is_native()
    }

    pub fn has_supported_decimals(&self) -> bool {
        self.decimals <= MAX_DECIMALS
    }
}
