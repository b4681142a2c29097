use solana_program::pubkey::Pubkey;
use thiserror::Error;

use crate::composer::{AccountRole, ComposerStage, FixedAccount, OperationKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Truncated buffer: {needed} bytes requested at offset {offset}, buffer length {len}")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Truncated buffer: {needed} bytes requested at offset {offset}, buffer length {len}")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("Unexpected owner: expected {expected}, found {actual}")]
    UnexpectedOwner { expected: Pubkey, actual: Pubkey },
    #[error("Unknown discriminator: expected {expected:?}, found {actual:?}")]
    UnknownDiscriminator { expected: [u8; 8], actual: [u8; 8] },
}

impl From<LayoutError> for DecodeError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::TruncatedBuffer {
                offset,
                needed,
                len,
            } => DecodeError::TruncatedBuffer {
                offset,
                needed,
                len,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("Exchange rate undefined: shares issued {shares_issued}, token available {token_available}")]
    UndefinedRate {
        token_available: u64,
        shares_issued: u64,
    },
    #[error("Overflow")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeriveError {
    #[error("No viable bump for program {program_id}")]
    NoViableBump { program_id: Pubkey },
    #[error("Too many seeds: {count}")]
    TooManySeeds { count: usize },
    #[error("Seed {index} is {len} bytes, maximum is 32")]
    SeedTooLong { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Account {address} not found")]
    NotFound { address: Pubkey },
    #[error("Account {address} is owned by {actual}, expected {expected}")]
    OwnerMismatch {
        address: Pubkey,
        expected: Pubkey,
        actual: Pubkey,
    },
    #[error("Account {address} could not be decoded: {source}")]
    Malformed {
        address: Pubkey,
        source: DecodeError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("{kind:?} requires at least one active reserve")]
    MissingActiveReserves { kind: OperationKind },
    #[error("Lending market for reserve {reserve} unresolved: {source}")]
    UnresolvedLendingMarket {
        reserve: Pubkey,
        source: ValidationError,
    },
    #[error("{kind:?} requires farm accounts {missing:?}")]
    MissingFarmAccounts {
        kind: OperationKind,
        missing: Vec<FixedAccount>,
    },
    #[error("{kind:?} assembled {actual} accounts, expected {expected}")]
    AccountCountMismatch {
        kind: OperationKind,
        expected: usize,
        actual: usize,
    },
    #[error("{kind:?} account {index} has role {actual:?}, expected {expected:?}")]
    RoleMismatch {
        kind: OperationKind,
        index: usize,
        expected: AccountRole,
        actual: AccountRole,
    },
    #[error("Step `{step}` is not valid in stage {stage:?}")]
    InvalidTransition {
        stage: ComposerStage,
        step: &'static str,
    },
    #[error("Failed to encode instruction payload: {0}")]
    PayloadEncoding(String),
}
