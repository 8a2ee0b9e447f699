//! Participant address type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParamsError;

/// A 20-byte participant identifier, rendered as `0x`-prefixed hex.
///
/// `Address::ZERO` is the null identifier: it never owns stake, can never be a
/// delegation target, and is what the ledger reports as the representative of
/// a participant it knows nothing about.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// An address with every byte set to `byte`. Handy for fixtures.
    pub fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| ParamsError::InvalidAddress(e.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| ParamsError::InvalidAddress(format!("expected 20 bytes, got {}", v.len())))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_address_is_default() {
        assert!(Address::default().is_zero());
        assert_eq!(Address::default(), Address::ZERO);
        assert!(!Address::repeat_byte(1).is_zero());
    }

    #[test]
    fn display_then_parse() {
        let addr = Address::repeat_byte(0xab);
        let shown = addr.to_string();
        assert!(shown.starts_with("0xabab"));
        assert_eq!(shown.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_without_prefix() {
        let raw = "01".repeat(20);
        assert_eq!(raw.parse::<Address>().unwrap(), Address::repeat_byte(1));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!("0x0102".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
    }
}
