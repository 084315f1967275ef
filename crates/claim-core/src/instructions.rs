//! Wrap/unwrap action instructions
//!
//! Pure text and calldata generation. Nothing here reads the ledger, signs,
//! or submits; the output is advice for the user's wallet.

use std::fmt;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use serde::Serialize;

use crate::abi::{ILegacyToken, IWrappedToken};
use crate::address::CanonicalAddress;
use crate::constants::{TOKEN_DECIMALS, TOKEN_SYMBOL, WRAPPED_TOKEN_SYMBOL};
use crate::error::GatewayError;
use crate::ledger::TokenContracts;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Wrap,
    Unwrap,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Wrap => write!(f, "wrap"),
            ActionKind::Unwrap => write!(f, "unwrap"),
        }
    }
}

/// One transaction the user's wallet should send, described step by step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInstruction {
    pub kind: ActionKind,
    pub account: CanonicalAddress,
    /// Amount in base units
    pub amount: U256,
    /// Contract the transaction is sent to
    pub target: Address,
    /// ABI-encoded call for `target`
    pub calldata: Bytes,
    pub steps: Vec<String>,
}

/// Parse a user-entered decimal token amount into base units.
///
/// Accepts `digits` or `digits.digits` with at most [`TOKEN_DECIMALS`]
/// fractional digits. Zero is rejected.
pub fn parse_token_amount(input: &str) -> Result<U256> {
    let amount = input.trim();
    let invalid = |reason: &str| GatewayError::InvalidAmount(format!("{amount:?}: {reason}"));

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected a non-negative decimal number"));
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected a non-negative decimal number"));
        }
        if fraction.len() > TOKEN_DECIMALS as usize {
            return Err(invalid(&format!(
                "at most {TOKEN_DECIMALS} decimal places are supported"
            )));
        }
    }

    let mut digits = whole.to_string();
    let fraction = fraction.unwrap_or_default();
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(TOKEN_DECIMALS as usize - fraction.len()));

    let base_units = U256::from_str_radix(&digits, 10).map_err(|e| invalid(&e.to_string()))?;

    if base_units.is_zero() {
        return Err(invalid("amount must be greater than zero"));
    }

    Ok(base_units)
}

/// Builds wrap/unwrap instructions against fixed token contracts
#[derive(Debug, Clone, Copy)]
pub struct InstructionBuilder {
    contracts: TokenContracts,
}

impl InstructionBuilder {
    pub fn new(contracts: TokenContracts) -> Self {
        Self { contracts }
    }

    pub fn contracts(&self) -> TokenContracts {
        self.contracts
    }

    /// Instructions for turning legacy tokens into wrapped tokens.
    ///
    /// Wrapping is a single `approveAndCall(wrapper, amount)` on the legacy
    /// token; the wrapper pulls the tokens in its approval callback.
    pub fn build_wrap(&self, amount: &str, account: CanonicalAddress) -> Result<ActionInstruction> {
        let base_units = parse_token_amount(amount)?;
        let legacy = self.contracts.legacy;
        let wrapped = self.contracts.wrapped;

        let calldata = ILegacyToken::approveAndCallCall {
            spender: wrapped,
            value: base_units,
        }
        .abi_encode();

        let steps = vec![
            format!(
                "Confirm {account} holds at least {base_units} base units ({} {TOKEN_SYMBOL}) of the legacy token at {legacy}",
                amount.trim()
            ),
            format!(
                "Send a transaction to the legacy token {legacy} calling approveAndCall({wrapped}, {base_units})"
            ),
            format!(
                "Wait for confirmation; {account} then holds {base_units} more base units of {WRAPPED_TOKEN_SYMBOL} at {wrapped}"
            ),
        ];

        Ok(ActionInstruction {
            kind: ActionKind::Wrap,
            account,
            amount: base_units,
            target: legacy,
            calldata: calldata.into(),
            steps,
        })
    }

    /// Instructions for turning wrapped tokens back into legacy tokens
    pub fn build_unwrap(
        &self,
        amount: &str,
        account: CanonicalAddress,
    ) -> Result<ActionInstruction> {
        let base_units = parse_token_amount(amount)?;
        let legacy = self.contracts.legacy;
        let wrapped = self.contracts.wrapped;

        let calldata = IWrappedToken::unwrapCall { value: base_units }.abi_encode();

        let steps = vec![
            format!(
                "Confirm {account} holds at least {base_units} base units ({} {WRAPPED_TOKEN_SYMBOL}) at {wrapped}",
                amount.trim()
            ),
            format!("Send a transaction to the wrapped token {wrapped} calling unwrap({base_units})"),
            format!(
                "Wait for confirmation; {account} then holds {base_units} more base units of the legacy token at {legacy}"
            ),
        ];

        Ok(ActionInstruction {
            kind: ActionKind::Unwrap,
            account,
            amount: base_units,
            target: wrapped,
            calldata: calldata.into(),
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::normalize;

    fn builder() -> InstructionBuilder {
        InstructionBuilder::new(TokenContracts {
            legacy: Address::repeat_byte(0x11),
            wrapped: Address::repeat_byte(0x22),
        })
    }

    fn account() -> CanonicalAddress {
        normalize("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap()
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!(parse_token_amount("12.5").unwrap(), U256::from(12_500));
        assert_eq!(parse_token_amount("1").unwrap(), U256::from(1_000));
        assert_eq!(parse_token_amount("0.001").unwrap(), U256::from(1));
        assert_eq!(parse_token_amount(" 42.125 ").unwrap(), U256::from(42_125));
        assert_eq!(parse_token_amount("007.50").unwrap(), U256::from(7_500));
    }

    #[test]
    fn test_rejects_bad_amounts() {
        for input in ["0", "0.000", "-5", "abc", "", ".5", "5.", "1.2345", "1e3", "+1", "1.2.3", "0x10"] {
            assert!(
                matches!(parse_token_amount(input), Err(GatewayError::InvalidAmount(_))),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_wrap_targets_legacy_token() {
        let instruction = builder().build_wrap("12.5", account()).unwrap();

        assert_eq!(instruction.kind, ActionKind::Wrap);
        assert_eq!(instruction.amount, U256::from(12_500));
        assert_eq!(instruction.target, Address::repeat_byte(0x11));
        assert_eq!(instruction.steps.len(), 3);
        assert!(instruction.steps[1].contains("approveAndCall"));
        assert!(instruction.steps[1].contains("12500"));
        assert!(instruction.steps[1].contains(&Address::repeat_byte(0x22).to_string()));

        let call = ILegacyToken::approveAndCallCall::abi_decode(&instruction.calldata).unwrap();
        assert_eq!(call.spender, Address::repeat_byte(0x22));
        assert_eq!(call.value, U256::from(12_500));
    }

    #[test]
    fn test_unwrap_targets_wrapped_token() {
        let instruction = builder().build_unwrap("3", account()).unwrap();

        assert_eq!(instruction.kind, ActionKind::Unwrap);
        assert_eq!(instruction.target, Address::repeat_byte(0x22));
        assert!(instruction.steps[1].contains("unwrap(3000)"));

        let call = IWrappedToken::unwrapCall::abi_decode(&instruction.calldata).unwrap();
        assert_eq!(call.value, U256::from(3_000));
    }

    #[test]
    fn test_builders_reject_invalid_amounts() {
        for input in ["0", "-5", "abc"] {
            assert!(builder().build_wrap(input, account()).is_err());
            assert!(builder().build_unwrap(input, account()).is_err());
        }
    }

    #[test]
    fn test_output_is_deterministic() {
        let a = builder().build_wrap("1.5", account()).unwrap();
        let b = builder().build_wrap("1.5", account()).unwrap();
        assert_eq!(a, b);
    }
}
