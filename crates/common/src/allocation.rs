use std::collections::HashSet;

use log::warn;
use solana_program::pubkey::Pubkey;

use crate::constants::MAX_RESERVES;
use crate::error::LayoutError;
use crate::layout::{LayoutReader, PUBKEY_LEN};
use crate::state::{AllocationSlot, VaultState, ALLOCATION_SLOT_LEN, ALLOCATION_STRATEGY_OFFSET};

const ALLOCATION_ENTRY_LEN: usize = PUBKEY_LEN + 16;

/// Where the allocation strategy sits inside a raw vault buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationRegion {
    /// Fixed-capacity array of `slot_len`-byte slots. Each slot begins with the
    /// reserve address and a u128 cap; the rest is skipped.
    Fixed {
        offset: usize,
        capacity: usize,
        slot_len: usize,
    },
    /// Borsh `Vec`: a u32 count at `offset` followed by `count` packed
    /// (reserve, u128 cap) entries.
    LengthPrefixed { offset: usize },
}

impl AllocationRegion {
    pub const VAULT_STATE: AllocationRegion = AllocationRegion::Fixed {
        offset: ALLOCATION_STRATEGY_OFFSET,
        capacity: MAX_RESERVES,
        slot_len: ALLOCATION_SLOT_LEN,
    };

    pub const LEGACY_VEC: AllocationRegion = AllocationRegion::LengthPrefixed { offset: 440 };

    /// Reads every slot in the region, active or not, in stored order.
    pub fn read_slots(&self, data: &[u8]) -> Result<Vec<AllocationSlot>, LayoutError> {
        match *self {
            AllocationRegion::Fixed {
                offset,
                capacity,
                slot_len,
            } => {
                let mut reader = LayoutReader::at(data, offset);
                let mut slots = Vec::with_capacity(capacity);
                for _ in 0..capacity {
                    slots.push(read_slot(&mut reader)?);
                    reader.skip(slot_len.saturating_sub(ALLOCATION_ENTRY_LEN))?;
                }
                Ok(slots)
            }
            AllocationRegion::LengthPrefixed { offset } => {
                let mut reader = LayoutReader::at(data, offset);
                let count = reader.read_length_prefixed_count()?;
                // The count is untrusted; size the allocation by what the buffer can hold.
                let fits = reader.remaining() / ALLOCATION_ENTRY_LEN;
                let mut slots = Vec::with_capacity(count.min(fits));
                for _ in 0..count {
                    slots.push(read_slot(&mut reader)?);
                }
                Ok(slots)
            }
        }
    }

    pub fn scan(&self, data: &[u8]) -> Result<Vec<AllocationSlot>, LayoutError> {
        Ok(active_allocations(&self.read_slots(data)?))
    }
}

fn read_slot(reader: &mut LayoutReader<'_>) -> Result<AllocationSlot, LayoutError> {
    Ok(AllocationSlot {
        reserve: reader.read_pubkey()?,
        allocation_cap: reader.read_u128_le()?,
    })
}

/// Active slots in stored order.
///
/// Slots holding the default address are skipped. A reserve listed more than
/// once keeps its first slot.
pub fn active_allocations(slots: &[AllocationSlot]) -> Vec<AllocationSlot> {
    let mut seen: HashSet<Pubkey> = HashSet::new();
    slots
        .iter()
        .filter(|slot| slot.is_active())
        .filter(|slot| {
            let first = seen.insert(slot.reserve);
            if !first {
                warn!("Reserve {} listed twice in allocation strategy", slot.reserve);
            }
            first
        })
        .copied()
        .collect()
}

impl VaultState {
    pub fn active_allocations(&self) -> Vec<AllocationSlot> {
        active_allocations(&self.allocation_strategy)
    }

    pub fn active_reserves(&self) -> Vec<Pubkey> {
        self.active_allocations()
            .into_iter()
            .map(|slot| slot.reserve)
            .collect()
    }
}
