use log::{debug, warn};
use solana_program::pubkey::Pubkey;

use crate::constants::{MAX_RESERVES, RESERVE_ACCOUNT, VAULT_STATE_ACCOUNT};
use crate::error::{DecodeError, DeriveError};
use crate::layout::{
    account_discriminator, LayoutReader, LayoutWriter, DISCRIMINATOR_LEN, PUBKEY_LEN,
};
use crate::pda::{get_base_vault_authority, get_token_vault};

// Bumps and decimals are stored as u64 slots; only the low byte is meaningful.
pub const PADDED_U8_LEN: usize = 8;
pub const FEE_BLOCK_LEN: usize = 6 * 8 + 2 * 16;
pub const ALLOCATION_SLOT_LEN: usize = 80;
pub const ALLOCATION_SLOT_PADDING: usize = ALLOCATION_SLOT_LEN - PUBKEY_LEN - 16;
pub const VAULT_NAME_LEN: usize = 32;

pub const ALLOCATION_STRATEGY_OFFSET: usize = DISCRIMINATOR_LEN
    + PUBKEY_LEN * 2
    + PADDED_U8_LEN
    + PUBKEY_LEN
    + PADDED_U8_LEN
    + PUBKEY_LEN * 3
    + PADDED_U8_LEN
    + 8 * 2
    + FEE_BLOCK_LEN;
pub const NAME_OFFSET: usize = ALLOCATION_STRATEGY_OFFSET + ALLOCATION_SLOT_LEN * MAX_RESERVES;
pub const LOOKUP_TABLE_OFFSET: usize = NAME_OFFSET + VAULT_NAME_LEN;
pub const VAULT_STATE_LEN: usize = LOOKUP_TABLE_OFFSET + PUBKEY_LEN;

// A longer layout puts a [u128; 256] padding block, five u64 limits, a pending
// admin and three u128 counters between the allocation array and the name.
// Which of the two layouts live accounts use is unconfirmed, so the longer one
// is only inspected by `check_trailing_region`, never decoded.
pub const TRAILING_PADDING_LEN: usize = 16 * 256;
pub const TRAILING_FIELDS_LEN: usize = 5 * 8 + PUBKEY_LEN + 3 * 16;
pub const TRAILING_LOOKUP_TABLE_OFFSET: usize =
    NAME_OFFSET + TRAILING_PADDING_LEN + TRAILING_FIELDS_LEN + VAULT_NAME_LEN;
// The same layout summed over a fee block one u64 shorter.
pub const SHORT_FEE_BLOCK_LOOKUP_TABLE_OFFSET: usize = TRAILING_LOOKUP_TABLE_OFFSET - 8;
pub const TRAILING_LOOKUP_TABLE_OFFSETS: [usize; 2] = [
    SHORT_FEE_BLOCK_LOOKUP_TABLE_OFFSET,
    TRAILING_LOOKUP_TABLE_OFFSET,
];

// discriminator(8) + version(8) + last_update(16)
pub const RESERVE_LENDING_MARKET_OFFSET: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationSlot {
    pub reserve: Pubkey,
    pub allocation_cap: u128,
}

impl AllocationSlot {
    /// A slot holding the default address is unused.
    pub fn is_active(&self) -> bool {
        self.reserve != Pubkey::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaultFees {
    pub available_crank_funds: u64,
    pub unallocated_weight: u64,
    pub unallocated_tokens_cap: u64,
    pub performance_fee_bps: u64,
    pub management_fee_bps: u64,
    pub last_fee_charge_timestamp: u64,
    pub prev_aum_sf: u128,
    pub pending_fees_sf: u128,
}

/// Decoded snapshot of a vault account.
///
/// Every decode produces a fresh value from the bytes handed in; nothing here
/// is cached or mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultState {
    pub admin_authority: Pubkey,
    pub base_vault_authority: Pubkey,
    pub base_vault_authority_bump: u8,
    pub token_mint: Pubkey,
    pub token_mint_decimals: u8,
    pub token_vault: Pubkey,
    pub token_program: Pubkey,
    pub shares_mint: Pubkey,
    pub shares_mint_decimals: u8,
    pub token_available: u64,
    pub shares_issued: u64,
    pub fees: VaultFees,
    pub allocation_strategy: [AllocationSlot; MAX_RESERVES],
    pub name: [u8; VAULT_NAME_LEN],
    pub vault_lookup_table: Pubkey,
}

impl VaultState {
    pub fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        account_discriminator(VAULT_STATE_ACCOUNT)
    }

    /// Decodes a vault account owned by `owner`, rejecting it unless the owner is
    /// `vault_program` and the leading tag is the vault discriminator.
    ///
    /// Buffers longer than [`VAULT_STATE_LEN`] are accepted; trailing bytes are
    /// ignored.
    pub fn decode(data: &[u8], owner: &Pubkey, vault_program: &Pubkey) -> Result<Self, DecodeError> {
        let mut reader = LayoutReader::new(data);

        let expected = Self::discriminator();
        let actual = reader.read_bytes::<DISCRIMINATOR_LEN>()?;
        if actual != expected {
            return Err(DecodeError::UnknownDiscriminator { expected, actual });
        }
        if owner != vault_program {
            return Err(DecodeError::UnexpectedOwner {
                expected: *vault_program,
                actual: *owner,
            });
        }

        let admin_authority = reader.read_pubkey()?;
        let base_vault_authority = reader.read_pubkey()?;
        let base_vault_authority_bump = reader.read_u8_padded(PADDED_U8_LEN)?;
        let token_mint = reader.read_pubkey()?;
        let token_mint_decimals = reader.read_u8_padded(PADDED_U8_LEN)?;
        let token_vault = reader.read_pubkey()?;
        let token_program = reader.read_pubkey()?;
        let shares_mint = reader.read_pubkey()?;
        let shares_mint_decimals = reader.read_u8_padded(PADDED_U8_LEN)?;
        let token_available = reader.read_u64_le()?;
        let shares_issued = reader.read_u64_le()?;

        let fees = VaultFees {
            available_crank_funds: reader.read_u64_le()?,
            unallocated_weight: reader.read_u64_le()?,
            unallocated_tokens_cap: reader.read_u64_le()?,
            performance_fee_bps: reader.read_u64_le()?,
            management_fee_bps: reader.read_u64_le()?,
            last_fee_charge_timestamp: reader.read_u64_le()?,
            prev_aum_sf: reader.read_u128_le()?,
            pending_fees_sf: reader.read_u128_le()?,
        };

        debug_assert_eq!(reader.offset(), ALLOCATION_STRATEGY_OFFSET);
        let mut allocation_strategy = [AllocationSlot::default(); MAX_RESERVES];
        for slot in allocation_strategy.iter_mut() {
            slot.reserve = reader.read_pubkey()?;
            slot.allocation_cap = reader.read_u128_le()?;
            reader.skip(ALLOCATION_SLOT_PADDING)?;
        }

        let name = reader.read_bytes::<VAULT_NAME_LEN>()?;
        let vault_lookup_table = reader.read_pubkey()?;

        Ok(Self {
            admin_authority,
            base_vault_authority,
            base_vault_authority_bump,
            token_mint,
            token_mint_decimals,
            token_vault,
            token_program,
            shares_mint,
            shares_mint_decimals,
            token_available,
            shares_issued,
            fees,
            allocation_strategy,
            name,
            vault_lookup_table,
        })
    }

    /// Writes the canonical [`VAULT_STATE_LEN`]-byte encoding. Padding is zeroed.
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = LayoutWriter::with_capacity(VAULT_STATE_LEN);
        writer.write_bytes(&Self::discriminator());
        writer.write_pubkey(&self.admin_authority);
        writer.write_pubkey(&self.base_vault_authority);
        writer.write_u8_padded(self.base_vault_authority_bump, PADDED_U8_LEN);
        writer.write_pubkey(&self.token_mint);
        writer.write_u8_padded(self.token_mint_decimals, PADDED_U8_LEN);
        writer.write_pubkey(&self.token_vault);
        writer.write_pubkey(&self.token_program);
        writer.write_pubkey(&self.shares_mint);
        writer.write_u8_padded(self.shares_mint_decimals, PADDED_U8_LEN);
        writer.write_u64_le(self.token_available);
        writer.write_u64_le(self.shares_issued);

        writer.write_u64_le(self.fees.available_crank_funds);
        writer.write_u64_le(self.fees.unallocated_weight);
        writer.write_u64_le(self.fees.unallocated_tokens_cap);
        writer.write_u64_le(self.fees.performance_fee_bps);
        writer.write_u64_le(self.fees.management_fee_bps);
        writer.write_u64_le(self.fees.last_fee_charge_timestamp);
        writer.write_u128_le(self.fees.prev_aum_sf);
        writer.write_u128_le(self.fees.pending_fees_sf);

        for slot in self.allocation_strategy.iter() {
            writer.write_pubkey(&slot.reserve);
            writer.write_u128_le(slot.allocation_cap);
            writer.write_zeros(ALLOCATION_SLOT_PADDING);
        }

        writer.write_bytes(&self.name);
        writer.write_pubkey(&self.vault_lookup_table);
        writer.into_inner()
    }

    /// The vault's address lookup table, or `None` when the slot holds the
    /// default address.
    pub fn lookup_table(&self) -> Option<Pubkey> {
        if self.vault_lookup_table == Pubkey::default() {
            None
        } else {
            Some(self.vault_lookup_table)
        }
    }

    /// Vault name with trailing NUL bytes stripped.
    pub fn name(&self) -> String {
        let end = self
            .name
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Cross-checks fields that can be recomputed from the vault address.
    ///
    /// A disagreement means the assumed offsets have drifted from the live
    /// account. Discrepancies are returned and logged, never corrected.
    pub fn check_layout(
        &self,
        vault: &Pubkey,
        vault_program: &Pubkey,
    ) -> Result<Vec<LayoutDiscrepancy>, DeriveError> {
        let (authority, bump) = get_base_vault_authority(vault, vault_program)?;
        let (token_vault, _) = get_token_vault(vault, vault_program)?;

        let mut found = Vec::new();
        if authority != self.base_vault_authority {
            found.push(LayoutDiscrepancy::BaseVaultAuthority {
                decoded: self.base_vault_authority,
                derived: authority,
            });
        }
        if bump != self.base_vault_authority_bump {
            found.push(LayoutDiscrepancy::BaseVaultAuthorityBump {
                decoded: self.base_vault_authority_bump,
                derived: bump,
            });
        }
        if token_vault != self.token_vault {
            found.push(LayoutDiscrepancy::TokenVault {
                decoded: self.token_vault,
                derived: token_vault,
            });
        }

        for discrepancy in &found {
            warn!("Vault {} layout discrepancy: {:?}", vault, discrepancy);
        }
        if found.is_empty() {
            debug!("Vault {} layout matches derived addresses", vault);
        }
        Ok(found)
    }

    /// Reports lookup table keys found where the longer layout keeps them.
    ///
    /// Only buffers longer than [`VAULT_STATE_LEN`] are inspected. A candidate
    /// that is not the default address and differs from the decoded lookup
    /// table is returned and logged; the decoded value is left as is.
    pub fn check_trailing_region(&self, data: &[u8]) -> Vec<LayoutDiscrepancy> {
        if data.len() <= VAULT_STATE_LEN {
            return Vec::new();
        }
        let found: Vec<LayoutDiscrepancy> = TRAILING_LOOKUP_TABLE_OFFSETS
            .iter()
            .filter_map(|offset| {
                let key = LayoutReader::at(data, *offset).read_pubkey().ok()?;
                (key != Pubkey::default() && key != self.vault_lookup_table).then_some(
                    LayoutDiscrepancy::TrailingRegion {
                        offset: *offset,
                        found: key,
                        decoded: self.lookup_table(),
                    },
                )
            })
            .collect();
        for discrepancy in &found {
            warn!(
                "Vault buffer of {} bytes has a lookup table candidate past the decoded layout: {:?}",
                data.len(),
                discrepancy
            );
        }
        found
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDiscrepancy {
    BaseVaultAuthority { decoded: Pubkey, derived: Pubkey },
    BaseVaultAuthorityBump { decoded: u8, derived: u8 },
    TokenVault { decoded: Pubkey, derived: Pubkey },
    /// A key at `offset` in a buffer longer than the decoded layout.
    TrailingRegion {
        offset: usize,
        found: Pubkey,
        decoded: Option<Pubkey>,
    },
}

/// The part of a lending reserve needed to locate its market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveReference {
    pub lending_market: Pubkey,
}

impl ReserveReference {
    pub fn decode(data: &[u8], owner: &Pubkey, lending_program: &Pubkey) -> Result<Self, DecodeError> {
        let mut reader = LayoutReader::new(data);
        let expected = account_discriminator(RESERVE_ACCOUNT);
        let actual = reader.read_bytes::<DISCRIMINATOR_LEN>()?;
        if actual != expected {
            return Err(DecodeError::UnknownDiscriminator { expected, actual });
        }
        if owner != lending_program {
            return Err(DecodeError::UnexpectedOwner {
                expected: *lending_program,
                actual: *owner,
            });
        }

        let lending_market = LayoutReader::at(data, RESERVE_LENDING_MARKET_OFFSET).read_pubkey()?;
        Ok(Self { lending_market })
    }
}
