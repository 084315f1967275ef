//! Address normalization: validates wallet address strings and renders them
//! in EIP-55 checksummed form.
//!
//! Accepted input is `0x` followed by exactly 40 hex characters. An
//! all-lowercase or all-uppercase body carries no checksum and is accepted
//! as-is. A mixed-case body is a checksum claim and must match EIP-55.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;

use crate::error::GatewayError;
use crate::Result;

/// Number of hex characters in an address body (20 bytes)
const ADDRESS_HEX_LEN: usize = 40;

/// A validated wallet address.
///
/// Equality and hashing use the underlying 20 bytes, so two inputs that differ
/// only in letter case map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalAddress(Address);

impl CanonicalAddress {
    /// Wrap raw address bytes that are already known to be valid
    pub const fn from_address(address: Address) -> Self {
        Self(address)
    }

    pub fn address(&self) -> Address {
        self.0
    }

    /// EIP-55 checksummed rendering
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl FromStr for CanonicalAddress {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        normalize(s)
    }
}

impl From<CanonicalAddress> for Address {
    fn from(value: CanonicalAddress) -> Self {
        value.0
    }
}

/// Validate and canonicalize a wallet address string.
pub fn normalize(input: &str) -> Result<CanonicalAddress> {
    let trimmed = input.trim();

    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| invalid(trimmed, "missing 0x prefix"))?;

    if body.len() != ADDRESS_HEX_LEN {
        return Err(invalid(
            trimmed,
            &format!("expected {} hex characters, got {}", ADDRESS_HEX_LEN, body.len()),
        ));
    }

    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid(trimmed, "non-hex characters"));
    }

    let address = Address::from_str(body).map_err(|e| invalid(trimmed, &e.to_string()))?;

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        let checksummed = address.to_checksum(None);
        if checksummed[2..] != *body {
            return Err(invalid(trimmed, "checksum mismatch"));
        }
    }

    Ok(CanonicalAddress(address))
}

fn invalid(input: &str, reason: &str) -> GatewayError {
    GatewayError::InvalidAddress(format!("{input:?}: {reason}"))
}
