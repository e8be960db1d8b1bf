//! ABE <-> neutrino conversion
//!
//! The daemon accounts in neutrinos (10^-7 ABE). User input is parsed as
//! a decimal so amounts like `0.1` convert exactly.

use crate::constants::{ABE_DECIMALS, NEUTRINOS_PER_ABE};
use crate::error::{Result, WalletError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// parse a user-entered ABE amount
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WalletError::Validation("amount is empty".into()));
    }

    let parsed = if trimmed.contains(['e', 'E']) {
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(trimmed)
    };

    parsed.map_err(|e| WalletError::Validation(format!("not a number: {:?} ({})", trimmed, e)))
}

/// ABE to neutrinos, rounding half away from zero
pub fn to_base_units(display: Decimal) -> Result<u64> {
    if display.is_sign_negative() && !display.is_zero() {
        return Err(WalletError::Validation(format!("negative amount: {}", display)));
    }

    let scaled = display
        .checked_mul(Decimal::from(NEUTRINOS_PER_ABE))
        .ok_or_else(|| WalletError::Validation(format!("amount too large: {}", display)))?;

    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| WalletError::Validation(format!("amount out of range: {}", display)))
}

/// neutrinos to ABE
pub fn from_base_units(neutrinos: u64) -> Decimal {
    Decimal::from_i128_with_scale(neutrinos as i128, ABE_DECIMALS).normalize()
}

/// parse and convert in one step
pub fn parse_base_units(input: &str) -> Result<u64> {
    to_base_units(parse_amount(input)?)
}
