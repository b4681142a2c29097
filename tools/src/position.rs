use kvault_common::pda::get_associated_token_address;
use kvault_common::{Position, ValidationError, VaultState};
use log::info;
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Account as TokenAccount;

use crate::config::ClusterConfig;
use crate::source::AccountSource;
use crate::validator::validate_account;
use crate::ToolsError;

/// Fetches and decodes a vault account, failing closed on a missing or
/// foreign-owned account.
pub async fn fetch_vault<S>(
    source: &S,
    config: &ClusterConfig,
    vault: &Pubkey,
) -> Result<VaultState, ToolsError>
where
    S: AccountSource + ?Sized,
{
    fetch_vault_account(source, config, vault)
        .await
        .map(|(state, _)| state)
}

/// Like [`fetch_vault`], also returning the raw account data.
pub async fn fetch_vault_account<S>(
    source: &S,
    config: &ClusterConfig,
    vault: &Pubkey,
) -> Result<(VaultState, Vec<u8>), ToolsError>
where
    S: AccountSource + ?Sized,
{
    let vault_program = config.programs.vault_program;
    let account = validate_account(source, vault, &vault_program, config.timeout)
        .await
        .into_account()?;
    let state = VaultState::decode(&account.data, &account.owner, &vault_program)?;
    Ok((state, account.data))
}

/// Reads a token account balance. A missing account holds nothing.
pub async fn fetch_token_balance<S>(
    source: &S,
    config: &ClusterConfig,
    token_account: &Pubkey,
) -> Result<u64, ToolsError>
where
    S: AccountSource + ?Sized,
{
    let account = match tokio::time::timeout(config.timeout, source.get_account(token_account)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ValidationError::NotFound {
                address: *token_account,
            }
            .into())
        }
    };
    let Some(account) = account else {
        return Ok(0);
    };
    if !config.programs.is_token_program(&account.owner) {
        return Err(ValidationError::OwnerMismatch {
            address: *token_account,
            expected: config.programs.token_program,
            actual: account.owner,
        }
        .into());
    }

    // Token-2022 accounts carry extensions after the base layout.
    let base = account
        .data
        .get(..TokenAccount::LEN)
        .ok_or_else(|| ToolsError::TokenAccount(format!("{} is too short", token_account)))?;
    let unpacked =
        TokenAccount::unpack(base).map_err(|e| ToolsError::TokenAccount(e.to_string()))?;
    Ok(unpacked.amount)
}

/// Values `user`'s vault shares at the vault's current rate.
pub async fn fetch_position<S>(
    source: &S,
    config: &ClusterConfig,
    vault: &Pubkey,
    user: &Pubkey,
) -> Result<(VaultState, Position), ToolsError>
where
    S: AccountSource + ?Sized,
{
    let state = fetch_vault(source, config, vault).await?;
    let shares_ata = get_associated_token_address(
        user,
        &state.shares_mint,
        &config.programs.token_program,
        &config.programs.associated_token_program,
    )?;
    let shares_held = fetch_token_balance(source, config, &shares_ata).await?;
    let position = Position::value(shares_held, &state)?;

    info!(
        "Position of {} in vault {}: {} shares worth {} base units",
        user, vault, position.shares_held, position.underlying_assets_value
    );
    Ok((state, position))
}
