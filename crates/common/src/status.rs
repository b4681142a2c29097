use solana_program::pubkey::Pubkey;

use crate::error::{CompositionError, ValidationError};

/// Outcome of looking up an account and checking its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Valid,
    NotFound,
    OwnerMismatch { actual: Pubkey },
}

impl AccountStatus {
    /// `owner` is the on-chain owner of the fetched account, `None` if it does not exist.
    pub fn classify(owner: Option<&Pubkey>, expected_owner: &Pubkey) -> Self {
        match owner {
            None => AccountStatus::NotFound,
            Some(actual) if actual == expected_owner => AccountStatus::Valid,
            Some(actual) => AccountStatus::OwnerMismatch { actual: *actual },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, AccountStatus::Valid)
    }

    pub fn into_result(
        self,
        address: &Pubkey,
        expected_owner: &Pubkey,
    ) -> Result<(), ValidationError> {
        match self {
            AccountStatus::Valid => Ok(()),
            AccountStatus::NotFound => Err(ValidationError::NotFound { address: *address }),
            AccountStatus::OwnerMismatch { actual } => Err(ValidationError::OwnerMismatch {
                address: *address,
                expected: *expected_owner,
                actual,
            }),
        }
    }
}

/// A reserve paired with its lending market, or the reason the pair could not
/// be established.
///
/// Only `Resolved` entries may reach the remaining accounts of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveResolution {
    Resolved {
        reserve: Pubkey,
        lending_market: Pubkey,
    },
    Unresolved {
        reserve: Pubkey,
        error: ValidationError,
    },
}

impl ReserveResolution {
    pub fn reserve(&self) -> &Pubkey {
        match self {
            ReserveResolution::Resolved { reserve, .. } => reserve,
            ReserveResolution::Unresolved { reserve, .. } => reserve,
        }
    }

    pub fn into_pair(self) -> Result<(Pubkey, Pubkey), CompositionError> {
        match self {
            ReserveResolution::Resolved {
                reserve,
                lending_market,
            } => Ok((reserve, lending_market)),
            ReserveResolution::Unresolved { reserve, error } => {
                Err(CompositionError::UnresolvedLendingMarket {
                    reserve,
                    source: error,
                })
            }
        }
    }
}
