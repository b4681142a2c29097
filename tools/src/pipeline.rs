use kvault_common::{
    ArithmeticError, CompositionError, FarmAccounts, InstructionAccountComposer,
    InstructionAccountList, LayoutDiscrepancy, OperationKind, VaultAccounts, VaultState,
};
use log::info;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

use crate::config::ClusterConfig;
use crate::position::fetch_vault_account;
use crate::source::AccountSource;
use crate::validator::resolve_reserves;
use crate::ToolsError;

#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub kind: OperationKind,
    pub vault: Pubkey,
    pub user: Pubkey,
    /// Token amount for deposits, share amount for withdrawals.
    pub amount: u64,
    pub farm: Option<FarmAccounts>,
}

/// Everything needed to sign and submit one operation.
#[derive(Debug, Clone)]
pub struct PreparedOperation {
    pub instruction: Instruction,
    pub accounts: InstructionAccountList,
    pub vault_state: VaultState,
    /// Shares minted by a deposit or tokens returned by a withdrawal, as
    /// estimated client-side. The vault program's own result is authoritative.
    pub preview: Result<u64, ArithmeticError>,
    pub lookup_table: Option<Pubkey>,
    pub layout_discrepancies: Vec<LayoutDiscrepancy>,
}

/// Fetches the vault, resolves every active reserve and composes the
/// integration program instruction for `request`.
///
/// Composition starts only after every reserve and market lookup has
/// completed. Any unresolved reserve aborts the whole operation.
pub async fn prepare_operation<S>(
    source: &S,
    config: &ClusterConfig,
    request: &OperationRequest,
) -> Result<PreparedOperation, ToolsError>
where
    S: AccountSource + ?Sized,
{
    let programs = &config.programs;
    if request.kind.requires_farm() && request.farm.is_none() {
        return Err(CompositionError::MissingFarmAccounts {
            kind: request.kind,
            missing: request.kind.farm_accounts(),
        }
        .into());
    }

    let (state, data) = fetch_vault_account(source, config, &request.vault).await?;
    let mut layout_discrepancies = state.check_layout(&request.vault, &programs.vault_program)?;
    layout_discrepancies.extend(state.check_trailing_region(&data));

    let reserves = state.active_reserves();
    let resolutions = resolve_reserves(source, &reserves, config).await;

    let vault_accounts = VaultAccounts::resolve(&request.vault, &state, &request.user, programs)?;
    let accounts = InstructionAccountComposer::compose(
        request.kind,
        &vault_accounts,
        request.farm.as_ref(),
        resolutions,
    )?;

    let preview = match request.kind {
        OperationKind::Deposit | OperationKind::DepositAndStake => {
            state.assets_to_shares(request.amount)
        }
        OperationKind::Withdraw | OperationKind::Unstake => state.shares_to_assets(request.amount),
    };

    info!(
        "Prepared {:?} of {} on vault {} with {} accounts over {} reserves",
        request.kind,
        request.amount,
        request.vault,
        accounts.len(),
        reserves.len()
    );

    let instruction = accounts
        .clone()
        .into_instruction(&programs.integration_program, request.amount)?;

    Ok(PreparedOperation {
        instruction,
        accounts,
        lookup_table: state.lookup_table(),
        vault_state: state,
        preview,
        layout_discrepancies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::tests::vault_state;
    use crate::source::StaticAccountSource;
    use crate::validator::tests::reserve_data;
    use kvault_common::constants::{KLEND_PROGRAM_ID, KVAULT_PROGRAM_ID};
    use kvault_common::layout::instruction_discriminator;
    use kvault_common::pda::{get_base_vault_authority, get_token_vault};
    use kvault_common::{AccountRole, FixedAccount, ValidationError};
    use std::time::Duration;

    struct Fixture {
        source: StaticAccountSource,
        vault: Pubkey,
        reserves: Vec<Pubkey>,
        markets: Vec<Pubkey>,
    }

    fn fixture(reserve_count: usize) -> Fixture {
        let vault = Pubkey::new_unique();
        let reserves: Vec<Pubkey> = (0..reserve_count).map(|_| Pubkey::new_unique()).collect();
        let markets: Vec<Pubkey> = (0..reserve_count).map(|_| Pubkey::new_unique()).collect();

        let mut state = vault_state(&reserves);
        let (authority, bump) = get_base_vault_authority(&vault, &KVAULT_PROGRAM_ID).unwrap();
        state.base_vault_authority = authority;
        state.base_vault_authority_bump = bump;
        state.token_vault = get_token_vault(&vault, &KVAULT_PROGRAM_ID).unwrap().0;

        let mut source = StaticAccountSource::new();
        source.insert_data(vault, KVAULT_PROGRAM_ID, state.encode());
        for (reserve, market) in reserves.iter().zip(&markets) {
            source
                .insert_data(*reserve, KLEND_PROGRAM_ID, reserve_data(market))
                .insert_data(*market, KLEND_PROGRAM_ID, vec![0; 64]);
        }
        Fixture {
            source,
            vault,
            reserves,
            markets,
        }
    }

    fn config() -> ClusterConfig {
        ClusterConfig::mainnet("http://localhost:8899").with_timeout(Duration::from_millis(200))
    }

    fn request(kind: OperationKind, vault: Pubkey, amount: u64) -> OperationRequest {
        OperationRequest {
            kind,
            vault,
            user: Pubkey::new_unique(),
            amount,
            farm: None,
        }
    }

    #[tokio::test]
    async fn test_prepare_deposit() {
        let _ = env_logger::builder().is_test(true).try_init();
        let f = fixture(2);
        let config = config();
        let prepared = prepare_operation(
            &f.source,
            &config,
            &request(OperationKind::Deposit, f.vault, 1_000_000),
        )
        .await
        .unwrap();

        assert!(prepared.layout_discrepancies.is_empty());
        assert_eq!(prepared.lookup_table, None);
        // 2 tokens per share
        assert_eq!(prepared.preview, Ok(500_000));

        let instruction = &prepared.instruction;
        assert_eq!(instruction.program_id, config.programs.integration_program);
        assert_eq!(instruction.accounts.len(), 13 + 4);
        assert_eq!(
            &instruction.data[..8],
            &instruction_discriminator("kamino_deposit")
        );
        assert_eq!(&instruction.data[8..], &1_000_000u64.to_le_bytes());

        let remaining = prepared.accounts.remaining_accounts();
        assert_eq!(remaining[0].address, f.reserves[0]);
        assert_eq!(remaining[1].address, f.reserves[1]);
        assert_eq!(remaining[2].address, f.markets[0]);
        assert_eq!(remaining[3].address, f.markets[1]);
        assert_eq!(remaining[0].role, AccountRole::Writable);
        assert_eq!(remaining[2].role, AccountRole::ReadOnly);
    }

    #[tokio::test]
    async fn test_prepare_withdraw_previews_assets() {
        let f = fixture(1);
        let prepared = prepare_operation(
            &f.source,
            &config(),
            &request(OperationKind::Withdraw, f.vault, 300),
        )
        .await
        .unwrap();

        assert_eq!(prepared.preview, Ok(600));
        assert_eq!(prepared.accounts.len(), 13 + 2 + 5);
    }

    #[tokio::test]
    async fn test_withdraw_without_reserves_is_rejected() {
        let f = fixture(0);
        let result = prepare_operation(
            &f.source,
            &config(),
            &request(OperationKind::Withdraw, f.vault, 300),
        )
        .await;
        assert!(matches!(
            result,
            Err(ToolsError::Composition(
                CompositionError::MissingActiveReserves { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_foreign_reserve_aborts_operation() {
        let mut f = fixture(3);
        let impostor = Pubkey::new_unique();
        f.source
            .insert_data(f.reserves[1], impostor, reserve_data(&f.markets[1]));

        let result = prepare_operation(
            &f.source,
            &config(),
            &request(OperationKind::Deposit, f.vault, 10),
        )
        .await;
        match result {
            Err(ToolsError::Composition(CompositionError::UnresolvedLendingMarket {
                reserve,
                source,
            })) => {
                assert_eq!(reserve, f.reserves[1]);
                assert_eq!(
                    source,
                    ValidationError::OwnerMismatch {
                        address: f.reserves[1],
                        expected: KLEND_PROGRAM_ID,
                        actual: impostor,
                    }
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stake_requires_farm_accounts() {
        let f = fixture(1);
        let config = config();
        let mut req = request(OperationKind::DepositAndStake, f.vault, 10);
        assert!(matches!(
            prepare_operation(&f.source, &config, &req).await,
            Err(ToolsError::Composition(
                CompositionError::MissingFarmAccounts { .. }
            ))
        ));

        let farm_state = Pubkey::new_unique();
        req.farm = Some(
            FarmAccounts::for_user(&farm_state, &req.user, &Pubkey::new_unique(), &config.programs)
                .unwrap(),
        );
        let prepared = prepare_operation(&f.source, &config, &req).await.unwrap();
        assert_eq!(prepared.accounts.len(), 18 + 2);
        assert!(prepared
            .accounts
            .iter()
            .any(|account| account.address == farm_state));
    }

    #[tokio::test]
    async fn test_unstake_without_farm_names_scope_prices() {
        let f = fixture(1);
        let result = prepare_operation(
            &f.source,
            &config(),
            &request(OperationKind::Unstake, f.vault, 10),
        )
        .await;
        match result {
            Err(ToolsError::Composition(CompositionError::MissingFarmAccounts { kind, missing })) => {
                assert_eq!(kind, OperationKind::Unstake);
                assert_eq!(missing, OperationKind::Unstake.farm_accounts());
                assert!(missing.contains(&FixedAccount::ScopePrices));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_layout_drift_is_reported_not_fatal() {
        let f = fixture(1);
        let mut state = vault_state(&f.reserves);
        state.base_vault_authority_bump = 0;
        let mut source = f.source.clone();
        source.insert_data(f.vault, KVAULT_PROGRAM_ID, state.encode());

        let prepared = prepare_operation(
            &source,
            &config(),
            &request(OperationKind::Deposit, f.vault, 10),
        )
        .await
        .unwrap();
        assert!(!prepared.layout_discrepancies.is_empty());
    }

    #[tokio::test]
    async fn test_trailing_lookup_table_is_surfaced() {
        let f = fixture(1);
        let lut = Pubkey::new_unique();
        let mut state = vault_state(&f.reserves);
        let (authority, bump) = get_base_vault_authority(&f.vault, &KVAULT_PROGRAM_ID).unwrap();
        state.base_vault_authority = authority;
        state.base_vault_authority_bump = bump;
        state.token_vault = get_token_vault(&f.vault, &KVAULT_PROGRAM_ID).unwrap().0;
        let mut data = state.encode();
        data.resize(6592, 0);
        data[6560..6592].copy_from_slice(lut.as_ref());
        let mut source = f.source.clone();
        source.insert_data(f.vault, KVAULT_PROGRAM_ID, data);

        let prepared = prepare_operation(
            &source,
            &config(),
            &request(OperationKind::Deposit, f.vault, 10),
        )
        .await
        .unwrap();
        assert_eq!(prepared.lookup_table, None);
        assert_eq!(
            prepared.layout_discrepancies,
            vec![LayoutDiscrepancy::TrailingRegion {
                offset: 6560,
                found: lut,
                decoded: None
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_vault_deposit_preview_is_undefined() {
        let f = fixture(1);
        let mut state = vault_state(&f.reserves);
        state.token_available = 0;
        state.shares_issued = 0;
        let mut source = f.source.clone();
        source.insert_data(f.vault, KVAULT_PROGRAM_ID, state.encode());

        let prepared = prepare_operation(
            &source,
            &config(),
            &request(OperationKind::Deposit, f.vault, 10),
        )
        .await
        .unwrap();
        assert!(matches!(
            prepared.preview,
            Err(ArithmeticError::UndefinedRate { .. })
        ));
    }
}
