use solana_program::{pubkey, pubkey::Pubkey};

// External vault program that owns `VaultState` accounts.
pub const KVAULT_PROGRAM_ID: Pubkey = pubkey!("KvauGMspG5k6rtzrqqn7WNn3oZdyKqLKwK2XWQ8FLjd");
// Lending program that owns reserves and lending markets.
pub const KLEND_PROGRAM_ID: Pubkey = pubkey!("KLend2g3cP87fffoy8q1mQqGKjrxjC8boSyAYavgmjD");
pub const FARMS_PROGRAM_ID: Pubkey = pubkey!("FarmsPZpWu9i7Kky8tPN37rs2TpmMrAZrC7S7vJa91Hr");
// Program that CPIs into the vault program with the composed account lists.
pub const INTEGRATION_PROGRAM_ID: Pubkey = pubkey!("9A2JwsP3yrP4TPAoRa2kqmBWwtfKfT73syPqSaSCLPXJ");

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

// Scope price feed used by farms when the caller does not pass one.
pub const DEFAULT_SCOPE_PRICES: Pubkey = pubkey!("HFn8GnPADiny6XqUoWE8uRPPxb29ikn4yTuPa9MF2fWJ");

// Vault program seeds
pub const BASE_VAULT_AUTHORITY_SEED: &[u8] = b"base_vault_authority";
pub const TOKEN_VAULT_SEED: &[u8] = b"token_vault";
// Anchor `#[event_cpi]` authority, same seed for every Anchor program.
pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

// Integration program seeds
pub const VAULT_STATE_SEED: &[u8] = b"vault-state";
pub const VAULT_TREASURY_SEED: &[u8] = b"vault-treasury";

// Farms program seeds
pub const FARM_USER_SEED: &[u8] = b"user";

// Account discriminator names
pub const VAULT_STATE_ACCOUNT: &str = "VaultState";
pub const RESERVE_ACCOUNT: &str = "Reserve";

// Integration program entrypoints
pub const DEPOSIT_ENTRYPOINT: &str = "kamino_deposit";
pub const DEPOSIT_AND_STAKE_ENTRYPOINT: &str = "kamino_deposit_and_stake";
pub const WITHDRAW_ENTRYPOINT: &str = "kamino_withdraw";
pub const UNSTAKE_ENTRYPOINT: &str = "kamino_unstake_and_withdraw";

// Vault program instructions invoked through CPI
pub const VAULT_DEPOSIT_IX: &str = "deposit";
pub const VAULT_WITHDRAW_IX: &str = "withdraw";

pub const MAX_RESERVES: usize = 25;
