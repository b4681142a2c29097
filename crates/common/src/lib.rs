pub mod allocation;
pub mod composer;
pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod math;
pub mod pda;
pub mod state;
pub mod status;

pub use allocation::{active_allocations, AllocationRegion};
pub use composer::{
    AccountRole, ComposerStage, FarmAccounts, FixedAccount, InstructionAccountComposer,
    InstructionAccountList, OperationKind, RoleTaggedAccount, VaultAccounts,
};
pub use config::ProgramIds;
pub use error::{
    ArithmeticError, CompositionError, DecodeError, DeriveError, LayoutError, ValidationError,
};
pub use layout::{LayoutReader, LayoutWriter};
pub use math::{assets_to_shares, rate, shares_to_assets, to_ui_amount, ExchangeRate, Position};
pub use pda::derive_address;
pub use state::{AllocationSlot, LayoutDiscrepancy, ReserveReference, VaultFees, VaultState};
pub use status::{AccountStatus, ReserveResolution};
