use solana_program::pubkey::{Pubkey, MAX_SEEDS, MAX_SEED_LEN};

use crate::constants::{
    BASE_VAULT_AUTHORITY_SEED, EVENT_AUTHORITY_SEED, FARM_USER_SEED, TOKEN_VAULT_SEED,
    VAULT_STATE_SEED, VAULT_TREASURY_SEED,
};
use crate::error::DeriveError;

/// Derives a program address, returning the first off-curve candidate searching
/// bumps from 255 down to 0.
///
/// Same search as `Pubkey::find_program_address`, but seed limits and an
/// exhausted search come back as `DeriveError` instead of a panic.
pub fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), DeriveError> {
    // One slot is reserved for the bump seed.
    if seeds.len() >= MAX_SEEDS {
        return Err(DeriveError::TooManySeeds { count: seeds.len() });
    }
    if let Some((index, seed)) = seeds
        .iter()
        .enumerate()
        .find(|(_, seed)| seed.len() > MAX_SEED_LEN)
    {
        return Err(DeriveError::SeedTooLong {
            index,
            len: seed.len(),
        });
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = seeds.iter().copied().collect();
        with_bump.push(&bump_seed);
        if let Ok(address) = Pubkey::create_program_address(&with_bump, program_id) {
            return Ok((address, bump));
        }
    }

    Err(DeriveError::NoViableBump {
        program_id: *program_id,
    })
}

pub fn get_base_vault_authority(
    vault: &Pubkey,
    vault_program: &Pubkey,
) -> Result<(Pubkey, u8), DeriveError> {
    derive_address(&[BASE_VAULT_AUTHORITY_SEED, vault.as_ref()], vault_program)
}

pub fn get_token_vault(
    vault: &Pubkey,
    vault_program: &Pubkey,
) -> Result<(Pubkey, u8), DeriveError> {
    derive_address(&[TOKEN_VAULT_SEED, vault.as_ref()], vault_program)
}

pub fn get_event_authority(program_id: &Pubkey) -> Result<(Pubkey, u8), DeriveError> {
    derive_address(&[EVENT_AUTHORITY_SEED], program_id)
}

pub fn get_vault_state(
    vault_id: &Pubkey,
    integration_program: &Pubkey,
) -> Result<(Pubkey, u8), DeriveError> {
    derive_address(&[VAULT_STATE_SEED, vault_id.as_ref()], integration_program)
}

pub fn get_vault_treasury(
    vault_id: &Pubkey,
    integration_program: &Pubkey,
) -> Result<(Pubkey, u8), DeriveError> {
    derive_address(&[VAULT_TREASURY_SEED, vault_id.as_ref()], integration_program)
}

pub fn get_associated_token_address(
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
    associated_token_program: &Pubkey,
) -> Result<Pubkey, DeriveError> {
    derive_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        associated_token_program,
    )
    .map(|(address, _)| address)
}

pub fn get_farm_user_state(
    farm_state: &Pubkey,
    owner: &Pubkey,
    farms_program: &Pubkey,
) -> Result<(Pubkey, u8), DeriveError> {
    derive_address(
        &[FARM_USER_SEED, farm_state.as_ref(), owner.as_ref()],
        farms_program,
    )
}
