// -----------------------------------------------------------------------------
// Instruction account composition.
//
// The vault program checks the account list of every CPI positionally: the
// fixed accounts of each operation come first, then the remaining accounts
// (every reserve, then every lending market), and for withdrawals a second
// copy of selected accounts. The tables below are the only place the order and
// roles are written down; the composer walks them and then re-checks its output
// against them before handing anything out.
// -----------------------------------------------------------------------------

use anchor_lang::AnchorSerialize;
use log::{debug, error};
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;

use crate::config::ProgramIds;
use crate::constants::{
    DEFAULT_SCOPE_PRICES, DEPOSIT_AND_STAKE_ENTRYPOINT, DEPOSIT_ENTRYPOINT, UNSTAKE_ENTRYPOINT,
    VAULT_DEPOSIT_IX, VAULT_WITHDRAW_IX, WITHDRAW_ENTRYPOINT,
};
use crate::error::{CompositionError, DeriveError};
use crate::layout::{instruction_discriminator, DISCRIMINATOR_LEN};
use crate::pda::{get_associated_token_address, get_event_authority, get_farm_user_state};
use crate::state::VaultState;
use crate::status::ReserveResolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    Writable,
    ReadOnly,
    WritableSigner,
    ReadOnlySigner,
}

impl AccountRole {
    pub fn is_writable(&self) -> bool {
        matches!(self, AccountRole::Writable | AccountRole::WritableSigner)
    }

    pub fn is_signer(&self) -> bool {
        matches!(self, AccountRole::WritableSigner | AccountRole::ReadOnlySigner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTaggedAccount {
    pub address: Pubkey,
    pub role: AccountRole,
}

impl RoleTaggedAccount {
    pub fn new(address: Pubkey, role: AccountRole) -> Self {
        Self { address, role }
    }

    pub fn to_account_meta(&self) -> AccountMeta {
        if self.role.is_writable() {
            AccountMeta::new(self.address, self.role.is_signer())
        } else {
            AccountMeta::new_readonly(self.address, self.role.is_signer())
        }
    }
}

/// Named positions in the fixed part of an account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedAccount {
    User,
    VaultState,
    TokenVault,
    TokenMint,
    BaseVaultAuthority,
    SharesMint,
    UserTokenAta,
    UserSharesAta,
    LendingProgram,
    TokenProgram,
    SharesTokenProgram,
    EventAuthority,
    VaultProgram,
    FarmState,
    UserFarm,
    DelegatedStake,
    ScopePrices,
    FarmsProgram,
    FarmTokenProgram,
}

impl FixedAccount {
    pub fn is_farm_account(&self) -> bool {
        matches!(
            self,
            FixedAccount::FarmState
                | FixedAccount::UserFarm
                | FixedAccount::DelegatedStake
                | FixedAccount::ScopePrices
                | FixedAccount::FarmsProgram
                | FixedAccount::FarmTokenProgram
        )
    }
}

use AccountRole::{ReadOnly as R, Writable as W, WritableSigner as WS};
use FixedAccount as F;

const DEPOSIT_ACCOUNTS: [(FixedAccount, AccountRole); 13] = [
    (F::User, WS),
    (F::VaultState, W),
    (F::TokenVault, W),
    (F::TokenMint, R),
    (F::BaseVaultAuthority, R),
    (F::SharesMint, W),
    (F::UserTokenAta, W),
    (F::UserSharesAta, W),
    (F::LendingProgram, R),
    (F::TokenProgram, R),
    (F::SharesTokenProgram, R),
    (F::EventAuthority, R),
    (F::VaultProgram, R),
];

const DEPOSIT_AND_STAKE_ACCOUNTS: [(FixedAccount, AccountRole); 18] = [
    (F::User, WS),
    (F::VaultState, W),
    (F::TokenVault, W),
    (F::TokenMint, R),
    (F::BaseVaultAuthority, R),
    (F::SharesMint, W),
    (F::UserTokenAta, W),
    (F::UserSharesAta, W),
    (F::LendingProgram, R),
    (F::TokenProgram, R),
    (F::SharesTokenProgram, R),
    (F::EventAuthority, R),
    (F::VaultProgram, R),
    (F::FarmState, W),
    (F::UserFarm, W),
    (F::DelegatedStake, W),
    (F::FarmsProgram, R),
    (F::FarmTokenProgram, R),
];

// The vault's withdraw instruction takes the token mint as writable and
// reorders the user accounts relative to deposit.
const WITHDRAW_ACCOUNTS: [(FixedAccount, AccountRole); 13] = [
    (F::User, WS),
    (F::VaultState, W),
    (F::TokenVault, W),
    (F::BaseVaultAuthority, R),
    (F::UserTokenAta, W),
    (F::TokenMint, W),
    (F::UserSharesAta, W),
    (F::SharesMint, W),
    (F::TokenProgram, R),
    (F::SharesTokenProgram, R),
    (F::LendingProgram, R),
    (F::EventAuthority, R),
    (F::VaultProgram, R),
];

const UNSTAKE_ACCOUNTS: [(FixedAccount, AccountRole); 19] = [
    (F::User, WS),
    (F::VaultState, W),
    (F::TokenVault, W),
    (F::BaseVaultAuthority, R),
    (F::UserTokenAta, W),
    (F::TokenMint, W),
    (F::UserSharesAta, W),
    (F::SharesMint, W),
    (F::TokenProgram, R),
    (F::SharesTokenProgram, R),
    (F::LendingProgram, R),
    (F::EventAuthority, R),
    (F::VaultProgram, R),
    (F::FarmState, W),
    (F::UserFarm, W),
    (F::DelegatedStake, W),
    (F::ScopePrices, R),
    (F::FarmsProgram, R),
    (F::FarmTokenProgram, R),
];

// Repeated after the remaining accounts of withdraw and unstake.
const DUPLICATE_TAIL_FIXED: [(FixedAccount, AccountRole); 3] =
    [(F::VaultState, W), (F::EventAuthority, R), (F::VaultProgram, R)];
pub const DUPLICATE_TAIL_LEN: usize = DUPLICATE_TAIL_FIXED.len() + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Deposit,
    DepositAndStake,
    Withdraw,
    Unstake,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Deposit,
        OperationKind::DepositAndStake,
        OperationKind::Withdraw,
        OperationKind::Unstake,
    ];

    pub fn fixed_layout(&self) -> &'static [(FixedAccount, AccountRole)] {
        match self {
            OperationKind::Deposit => &DEPOSIT_ACCOUNTS,
            OperationKind::DepositAndStake => &DEPOSIT_AND_STAKE_ACCOUNTS,
            OperationKind::Withdraw => &WITHDRAW_ACCOUNTS,
            OperationKind::Unstake => &UNSTAKE_ACCOUNTS,
        }
    }

    pub fn fixed_len(&self) -> usize {
        self.fixed_layout().len()
    }

    pub fn requires_farm(&self) -> bool {
        matches!(self, OperationKind::DepositAndStake | OperationKind::Unstake)
    }

    pub fn has_duplicate_tail(&self) -> bool {
        matches!(self, OperationKind::Withdraw | OperationKind::Unstake)
    }

    /// Withdrawals must name at least one reserve to pull liquidity from.
    pub fn requires_reserves(&self) -> bool {
        self.has_duplicate_tail()
    }

    pub fn expected_len(&self, reserves: usize) -> usize {
        let tail = if self.has_duplicate_tail() {
            DUPLICATE_TAIL_LEN
        } else {
            0
        };
        self.fixed_len() + 2 * reserves + tail
    }

    /// Role of every position for an operation over `reserves` reserves.
    pub fn expected_roles(&self, reserves: usize) -> Vec<AccountRole> {
        let mut roles: Vec<AccountRole> = self.fixed_layout().iter().map(|(_, role)| *role).collect();
        roles.extend(std::iter::repeat(AccountRole::Writable).take(reserves));
        roles.extend(std::iter::repeat(AccountRole::ReadOnly).take(reserves));
        if self.has_duplicate_tail() {
            roles.extend(DUPLICATE_TAIL_FIXED.iter().map(|(_, role)| *role));
            roles.push(AccountRole::Writable);
            roles.push(AccountRole::ReadOnly);
        }
        roles
    }

    /// Farm accounts in this operation's fixed layout, in layout order.
    pub fn farm_accounts(&self) -> Vec<FixedAccount> {
        self.fixed_layout()
            .iter()
            .map(|(account, _)| *account)
            .filter(FixedAccount::is_farm_account)
            .collect()
    }

    pub fn position_of(&self, account: FixedAccount) -> Option<usize> {
        self.fixed_layout().iter().position(|(a, _)| *a == account)
    }

    /// Entrypoint of the integration program handling this operation.
    pub fn entrypoint(&self) -> &'static str {
        match self {
            OperationKind::Deposit => DEPOSIT_ENTRYPOINT,
            OperationKind::DepositAndStake => DEPOSIT_AND_STAKE_ENTRYPOINT,
            OperationKind::Withdraw => WITHDRAW_ENTRYPOINT,
            OperationKind::Unstake => UNSTAKE_ENTRYPOINT,
        }
    }

    /// Discriminator of the vault instruction this operation ends up invoking.
    pub fn vault_discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        match self {
            OperationKind::Deposit | OperationKind::DepositAndStake => {
                instruction_discriminator(VAULT_DEPOSIT_IX)
            }
            OperationKind::Withdraw | OperationKind::Unstake => {
                instruction_discriminator(VAULT_WITHDRAW_IX)
            }
        }
    }
}

/// Addresses of the vault-side fixed accounts for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultAccounts {
    pub user: Pubkey,
    pub vault_state: Pubkey,
    pub token_vault: Pubkey,
    pub token_mint: Pubkey,
    pub base_vault_authority: Pubkey,
    pub shares_mint: Pubkey,
    pub user_token_ata: Pubkey,
    pub user_shares_ata: Pubkey,
    pub lending_program: Pubkey,
    pub token_program: Pubkey,
    pub shares_token_program: Pubkey,
    pub event_authority: Pubkey,
    pub vault_program: Pubkey,
}

impl VaultAccounts {
    /// Fills the fixed accounts from a decoded vault. Shares always live under
    /// the classic token program; the underlying token uses whichever program
    /// the vault records.
    pub fn resolve(
        vault: &Pubkey,
        state: &VaultState,
        user: &Pubkey,
        programs: &ProgramIds,
    ) -> Result<Self, DeriveError> {
        let user_token_ata = get_associated_token_address(
            user,
            &state.token_mint,
            &state.token_program,
            &programs.associated_token_program,
        )?;
        let user_shares_ata = get_associated_token_address(
            user,
            &state.shares_mint,
            &programs.token_program,
            &programs.associated_token_program,
        )?;
        let (event_authority, _) = get_event_authority(&programs.vault_program)?;

        Ok(Self {
            user: *user,
            vault_state: *vault,
            token_vault: state.token_vault,
            token_mint: state.token_mint,
            base_vault_authority: state.base_vault_authority,
            shares_mint: state.shares_mint,
            user_token_ata,
            user_shares_ata,
            lending_program: programs.lending_program,
            token_program: state.token_program,
            shares_token_program: programs.token_program,
            event_authority,
            vault_program: programs.vault_program,
        })
    }

    fn address(&self, account: FixedAccount) -> Option<Pubkey> {
        Some(match account {
            F::User => self.user,
            F::VaultState => self.vault_state,
            F::TokenVault => self.token_vault,
            F::TokenMint => self.token_mint,
            F::BaseVaultAuthority => self.base_vault_authority,
            F::SharesMint => self.shares_mint,
            F::UserTokenAta => self.user_token_ata,
            F::UserSharesAta => self.user_shares_ata,
            F::LendingProgram => self.lending_program,
            F::TokenProgram => self.token_program,
            F::SharesTokenProgram => self.shares_token_program,
            F::EventAuthority => self.event_authority,
            F::VaultProgram => self.vault_program,
            _ => return None,
        })
    }
}

/// Farm accounts needed to stake or unstake vault shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmAccounts {
    pub farm_state: Pubkey,
    pub user_farm: Pubkey,
    pub delegated_stake: Pubkey,
    pub scope_prices: Pubkey,
    pub farms_program: Pubkey,
    pub farm_token_program: Pubkey,
}

impl FarmAccounts {
    pub fn derive_user_farm(
        farm_state: &Pubkey,
        owner: &Pubkey,
        farms_program: &Pubkey,
    ) -> Result<Pubkey, DeriveError> {
        get_farm_user_state(farm_state, owner, farms_program).map(|(address, _)| address)
    }

    /// Derives the user's farm account and defaults the price feed and token program.
    pub fn for_user(
        farm_state: &Pubkey,
        user: &Pubkey,
        delegated_stake: &Pubkey,
        programs: &ProgramIds,
    ) -> Result<Self, DeriveError> {
        Ok(Self {
            farm_state: *farm_state,
            user_farm: Self::derive_user_farm(farm_state, user, &programs.farms_program)?,
            delegated_stake: *delegated_stake,
            scope_prices: DEFAULT_SCOPE_PRICES,
            farms_program: programs.farms_program,
            farm_token_program: programs.token_program,
        })
    }

    pub fn with_scope_prices(mut self, scope_prices: Pubkey) -> Self {
        self.scope_prices = scope_prices;
        self
    }

    fn address(&self, account: FixedAccount) -> Option<Pubkey> {
        Some(match account {
            F::FarmState => self.farm_state,
            F::UserFarm => self.user_farm,
            F::DelegatedStake => self.delegated_stake,
            F::ScopePrices => self.scope_prices,
            F::FarmsProgram => self.farms_program,
            F::FarmTokenProgram => self.farm_token_program,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerStage {
    Idle,
    FixedAccountsBound,
    RemainingAccountsResolved,
    Composed,
    Failed,
}

/// Builds the account list of one operation, one explicit step at a time:
/// `bind_fixed`, `resolve_remaining`, `append_duplicate_tail` (withdraw and
/// unstake only), `finish`.
///
/// Any error moves the composer to [`ComposerStage::Failed`] and is kept; a
/// failed composer refuses every further step.
#[derive(Debug, Clone)]
pub struct InstructionAccountComposer {
    kind: OperationKind,
    stage: ComposerStage,
    fixed: Vec<RoleTaggedAccount>,
    reserves: Vec<Pubkey>,
    remaining: Vec<RoleTaggedAccount>,
    tail_appended: bool,
    failure: Option<CompositionError>,
}

impl InstructionAccountComposer {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            stage: ComposerStage::Idle,
            fixed: Vec::with_capacity(kind.fixed_len()),
            reserves: Vec::new(),
            remaining: Vec::new(),
            tail_appended: false,
            failure: None,
        }
    }

    /// Runs every step for `kind`.
    pub fn compose(
        kind: OperationKind,
        vault: &VaultAccounts,
        farm: Option<&FarmAccounts>,
        resolutions: impl IntoIterator<Item = ReserveResolution>,
    ) -> Result<InstructionAccountList, CompositionError> {
        let mut composer = Self::new(kind);
        composer.bind_fixed(vault, farm)?;
        composer.resolve_remaining(resolutions)?;
        if kind.has_duplicate_tail() {
            composer.append_duplicate_tail()?;
        }
        composer.finish()
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn stage(&self) -> ComposerStage {
        self.stage
    }

    pub fn failure(&self) -> Option<&CompositionError> {
        self.failure.as_ref()
    }

    fn fail(&mut self, err: CompositionError) -> CompositionError {
        debug!("{:?} composer failed in stage {:?}: {}", self.kind, self.stage, err);
        self.stage = ComposerStage::Failed;
        self.failure = Some(err.clone());
        err
    }

    fn expect_stage(&mut self, stage: ComposerStage, step: &'static str) -> Result<(), CompositionError> {
        if self.stage == stage {
            return Ok(());
        }
        let err = CompositionError::InvalidTransition {
            stage: self.stage,
            step,
        };
        // Misuse of a composer that already failed keeps the first failure.
        if self.stage != ComposerStage::Failed {
            return Err(self.fail(err));
        }
        Err(err)
    }

    /// Lays out the fixed accounts for this operation from resolved addresses.
    pub fn bind_fixed(
        &mut self,
        vault: &VaultAccounts,
        farm: Option<&FarmAccounts>,
    ) -> Result<(), CompositionError> {
        self.expect_stage(ComposerStage::Idle, "bind_fixed")?;

        let mut fixed = Vec::with_capacity(self.kind.fixed_len());
        for (account, role) in self.kind.fixed_layout() {
            let address = if account.is_farm_account() {
                farm.and_then(|farm| farm.address(*account))
            } else {
                vault.address(*account)
            };
            match address {
                Some(address) => fixed.push(RoleTaggedAccount::new(address, *role)),
                None => {
                    let err = CompositionError::MissingFarmAccounts {
                        kind: self.kind,
                        missing: self.kind.farm_accounts(),
                    };
                    return Err(self.fail(err));
                }
            }
        }

        self.bind_fixed_accounts(fixed)
    }

    /// Binds an already assembled fixed slice. Nothing is checked until
    /// [`finish`](Self::finish).
    pub fn bind_fixed_accounts(
        &mut self,
        accounts: Vec<RoleTaggedAccount>,
    ) -> Result<(), CompositionError> {
        self.expect_stage(ComposerStage::Idle, "bind_fixed_accounts")?;
        self.fixed = accounts;
        self.stage = ComposerStage::FixedAccountsBound;
        Ok(())
    }

    /// Appends every reserve (writable) followed by every lending market
    /// (read-only), in the order given.
    ///
    /// Fails on the first unresolved reserve; no reserve is ever dropped.
    pub fn resolve_remaining(
        &mut self,
        resolutions: impl IntoIterator<Item = ReserveResolution>,
    ) -> Result<(), CompositionError> {
        self.expect_stage(ComposerStage::FixedAccountsBound, "resolve_remaining")?;

        let mut reserves = Vec::new();
        let mut markets = Vec::new();
        for resolution in resolutions {
            match resolution.into_pair() {
                Ok((reserve, market)) => {
                    reserves.push(reserve);
                    markets.push(market);
                }
                Err(err) => return Err(self.fail(err)),
            }
        }

        if reserves.is_empty() && self.kind.requires_reserves() {
            let err = CompositionError::MissingActiveReserves { kind: self.kind };
            return Err(self.fail(err));
        }

        self.remaining = reserves
            .iter()
            .map(|reserve| RoleTaggedAccount::new(*reserve, AccountRole::Writable))
            .chain(
                markets
                    .iter()
                    .map(|market| RoleTaggedAccount::new(*market, AccountRole::ReadOnly)),
            )
            .collect();
        self.reserves = reserves;
        self.stage = ComposerStage::RemainingAccountsResolved;
        Ok(())
    }

    /// Repeats the vault state, event authority, vault program and the first
    /// reserve/market pair after the remaining accounts.
    pub fn append_duplicate_tail(&mut self) -> Result<(), CompositionError> {
        self.expect_stage(ComposerStage::RemainingAccountsResolved, "append_duplicate_tail")?;
        if !self.kind.has_duplicate_tail() || self.tail_appended {
            let err = CompositionError::InvalidTransition {
                stage: self.stage,
                step: "append_duplicate_tail",
            };
            return Err(self.fail(err));
        }

        let mut tail = Vec::with_capacity(DUPLICATE_TAIL_LEN);
        for (account, role) in DUPLICATE_TAIL_FIXED.iter().copied() {
            let bound = self
                .kind
                .position_of(account)
                .and_then(|index| self.fixed.get(index).copied());
            match bound {
                Some(bound) => tail.push(RoleTaggedAccount::new(bound.address, role)),
                None => {
                    let err = CompositionError::AccountCountMismatch {
                        kind: self.kind,
                        expected: self.kind.fixed_len(),
                        actual: self.fixed.len(),
                    };
                    return Err(self.fail(err));
                }
            }
        }

        let reserve_count = self.reserves.len();
        match (
            self.remaining.first().copied(),
            self.remaining.get(reserve_count).copied(),
        ) {
            (Some(reserve), Some(market)) => {
                tail.push(RoleTaggedAccount::new(reserve.address, AccountRole::Writable));
                tail.push(RoleTaggedAccount::new(market.address, AccountRole::ReadOnly));
            }
            _ => {
                let err = CompositionError::MissingActiveReserves { kind: self.kind };
                return Err(self.fail(err));
            }
        }

        self.remaining.extend(tail);
        self.tail_appended = true;
        Ok(())
    }

    /// Checks the assembled list against the operation's expected count and
    /// roles and yields it.
    pub fn finish(&mut self) -> Result<InstructionAccountList, CompositionError> {
        self.expect_stage(ComposerStage::RemainingAccountsResolved, "finish")?;

        let expected = self.kind.expected_len(self.reserves.len());
        let actual = self.fixed.len() + self.remaining.len();
        if actual != expected {
            error!(
                "{:?} account count mismatch: expected {}, assembled {}; fixed {:?}; remaining {:?}",
                self.kind, expected, actual, self.fixed, self.remaining
            );
            let err = CompositionError::AccountCountMismatch {
                kind: self.kind,
                expected,
                actual,
            };
            return Err(self.fail(err));
        }

        let expected_roles = self.kind.expected_roles(self.reserves.len());
        let mismatch = self
            .fixed
            .iter()
            .chain(self.remaining.iter())
            .zip(expected_roles.iter())
            .enumerate()
            .find(|(_, (account, role))| account.role != **role)
            .map(|(index, (account, role))| (index, *role, account.role));
        if let Some((index, expected, actual)) = mismatch {
            error!(
                "{:?} role mismatch at {}: expected {:?}, found {:?}; fixed {:?}; remaining {:?}",
                self.kind, index, expected, actual, self.fixed, self.remaining
            );
            let err = CompositionError::RoleMismatch {
                kind: self.kind,
                index,
                expected,
                actual,
            };
            return Err(self.fail(err));
        }

        debug!(
            "{:?} composed {} accounts over {} reserves",
            self.kind,
            actual,
            self.reserves.len()
        );
        self.stage = ComposerStage::Composed;
        Ok(InstructionAccountList {
            kind: self.kind,
            fixed_accounts: std::mem::take(&mut self.fixed),
            remaining_accounts: std::mem::take(&mut self.remaining),
        })
    }
}

/// A complete, checked account list for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionAccountList {
    kind: OperationKind,
    fixed_accounts: Vec<RoleTaggedAccount>,
    remaining_accounts: Vec<RoleTaggedAccount>,
}

impl InstructionAccountList {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn fixed_accounts(&self) -> &[RoleTaggedAccount] {
        &self.fixed_accounts
    }

    pub fn remaining_accounts(&self) -> &[RoleTaggedAccount] {
        &self.remaining_accounts
    }

    pub fn len(&self) -> usize {
        self.fixed_accounts.len() + self.remaining_accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleTaggedAccount> {
        self.fixed_accounts.iter().chain(self.remaining_accounts.iter())
    }

    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        self.iter().map(RoleTaggedAccount::to_account_meta).collect()
    }

    /// Builds the integration program instruction carrying this account list.
    /// Data is the entrypoint discriminator followed by the borsh `u64` amount.
    pub fn into_instruction(
        self,
        program_id: &Pubkey,
        amount: u64,
    ) -> Result<Instruction, CompositionError> {
        let mut data = instruction_discriminator(self.kind.entrypoint()).to_vec();
        amount
            .serialize(&mut data)
            .map_err(|e| CompositionError::PayloadEncoding(e.to_string()))?;

        Ok(Instruction {
            program_id: *program_id,
            accounts: self.to_account_metas(),
            data,
        })
    }
}
