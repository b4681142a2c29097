//! Client-side share/asset previews.
//!
//! Every result here is an estimate of what the vault program will compute on
//! execution. The program's own arithmetic is authoritative; these helpers
//! exist to size deposits and withdrawals before submitting them. All integer
//! conversions floor, so a preview never overstates what a holder receives.

use rust_decimal::Decimal;

use crate::error::ArithmeticError;
use crate::state::VaultState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeRate {
    /// Underlying tokens per share.
    Defined(Decimal),
    /// No shares have been issued, so no rate exists.
    Undefined,
}

impl ExchangeRate {
    pub fn defined(self) -> Option<Decimal> {
        match self {
            ExchangeRate::Defined(rate) => Some(rate),
            ExchangeRate::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, ExchangeRate::Defined(_))
    }
}

pub fn rate(token_available: u64, shares_issued: u64) -> ExchangeRate {
    if shares_issued == 0 {
        return ExchangeRate::Undefined;
    }
    Decimal::from(token_available)
        .checked_div(Decimal::from(shares_issued))
        .map_or(ExchangeRate::Undefined, ExchangeRate::Defined)
}

/// `floor(shares * token_available / shares_issued)`.
pub fn shares_to_assets(
    shares: u64,
    token_available: u64,
    shares_issued: u64,
) -> Result<u64, ArithmeticError> {
    if shares_issued == 0 {
        return Err(ArithmeticError::UndefinedRate {
            token_available,
            shares_issued,
        });
    }
    mul_div_floor(shares, token_available, shares_issued)
}

/// `floor(assets * shares_issued / token_available)`.
///
/// Undefined without issued shares. A vault holding no tokens has no share
/// price for a nonzero amount, but zero assets are always zero shares.
pub fn assets_to_shares(
    assets: u64,
    token_available: u64,
    shares_issued: u64,
) -> Result<u64, ArithmeticError> {
    let undefined = ArithmeticError::UndefinedRate {
        token_available,
        shares_issued,
    };
    if shares_issued == 0 {
        return Err(undefined);
    }
    if assets == 0 {
        return Ok(0);
    }
    if token_available == 0 {
        return Err(undefined);
    }
    mul_div_floor(assets, shares_issued, token_available)
}

fn mul_div_floor(value: u64, numerator: u64, denominator: u64) -> Result<u64, ArithmeticError> {
    let product = (value as u128)
        .checked_mul(numerator as u128)
        .ok_or(ArithmeticError::Overflow)?;
    let quotient = product
        .checked_div(denominator as u128)
        .ok_or(ArithmeticError::Overflow)?;
    u64::try_from(quotient).map_err(|_| ArithmeticError::Overflow)
}

/// Scales a raw token amount by its mint decimals.
pub fn to_ui_amount(amount: u64, decimals: u8) -> Result<Decimal, ArithmeticError> {
    let mut ui_amount = Decimal::from(amount);
    ui_amount
        .set_scale(decimals as u32)
        .map_err(|_| ArithmeticError::Overflow)?;
    Ok(ui_amount)
}

/// A holder's shares and their previewed value in the vault's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub shares_held: u64,
    pub underlying_assets_value: u64,
}

impl Position {
    pub fn value(shares_held: u64, vault: &VaultState) -> Result<Self, ArithmeticError> {
        // A holder with nothing is worth nothing, even in an empty vault.
        let underlying_assets_value = if shares_held == 0 {
            0
        } else {
            vault.shares_to_assets(shares_held)?
        };
        Ok(Self {
            shares_held,
            underlying_assets_value,
        })
    }

    pub fn ui_value(&self, vault: &VaultState) -> Result<Decimal, ArithmeticError> {
        to_ui_amount(self.underlying_assets_value, vault.token_mint_decimals)
    }
}

impl VaultState {
    pub fn rate(&self) -> ExchangeRate {
        rate(self.token_available, self.shares_issued)
    }

    pub fn shares_to_assets(&self, shares: u64) -> Result<u64, ArithmeticError> {
        shares_to_assets(shares, self.token_available, self.shares_issued)
    }

    pub fn assets_to_shares(&self, assets: u64) -> Result<u64, ArithmeticError> {
        assets_to_shares(assets, self.token_available, self.shares_issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::sample_vault;
    use std::str::FromStr;

    #[test]
    fn test_rate() {
        assert_eq!(
            rate(5_000_000, 4_000_000),
            ExchangeRate::Defined(Decimal::from_str("1.25").unwrap())
        );
        assert_eq!(rate(0, 10), ExchangeRate::Defined(Decimal::ZERO));
        assert_eq!(rate(10, 0), ExchangeRate::Undefined);
        assert_eq!(rate(0, 0), ExchangeRate::Undefined);
    }

    #[test]
    fn test_floor_rounding() {
        // 10 * 2 / 3 = 6.66..
        assert_eq!(shares_to_assets(10, 2, 3).unwrap(), 6);
        // 7 * 3 / 2 = 10.5
        assert_eq!(assets_to_shares(7, 2, 3).unwrap(), 10);
    }

    #[test]
    fn test_wide_intermediate() {
        assert_eq!(
            shares_to_assets(u64::MAX, u64::MAX, u64::MAX).unwrap(),
            u64::MAX
        );
        assert_eq!(
            shares_to_assets(u64::MAX, u64::MAX, 1),
            Err(ArithmeticError::Overflow)
        );
    }

    #[test]
    fn test_undefined_rate_is_an_error() {
        assert_eq!(
            shares_to_assets(100, 50, 0),
            Err(ArithmeticError::UndefinedRate {
                token_available: 50,
                shares_issued: 0
            })
        );
        assert!(matches!(
            assets_to_shares(100, 0, 50),
            Err(ArithmeticError::UndefinedRate { .. })
        ));
    }

    #[test]
    fn test_zero_rate_is_not_undefined() {
        assert_eq!(shares_to_assets(100, 0, 50), Ok(0));
    }

    #[test]
    fn test_worthless_vault_round_trips_to_zero() {
        let assets = shares_to_assets(5, 0, 10).unwrap();
        assert_eq!(assets, 0);
        assert_eq!(assets_to_shares(assets, 0, 10), Ok(0));
        assert_eq!(
            assets_to_shares(1, 0, 10),
            Err(ArithmeticError::UndefinedRate {
                token_available: 0,
                shares_issued: 10
            })
        );
        assert!(assets_to_shares(0, 0, 0).is_err());
    }

    #[test]
    fn test_to_ui_amount() {
        assert_eq!(
            to_ui_amount(1_234_567, 6).unwrap(),
            Decimal::from_str("1.234567").unwrap()
        );
        assert_eq!(to_ui_amount(5, 0).unwrap(), Decimal::from(5));
        assert_eq!(to_ui_amount(5, 29), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn test_position_value() {
        let vault = sample_vault(&[]);
        let position = Position::value(800_000, &vault).unwrap();
        assert_eq!(position.underlying_assets_value, 1_000_000);
        assert_eq!(position.ui_value(&vault).unwrap(), Decimal::from(1));

        let mut empty = vault.clone();
        empty.shares_issued = 0;
        assert_eq!(Position::value(0, &empty).unwrap().underlying_assets_value, 0);
        assert!(Position::value(1, &empty).is_err());
    }
}
