use kvault_common::{
    ArithmeticError, CompositionError, DecodeError, DeriveError, ValidationError,
};

pub mod config;
pub mod pipeline;
pub mod position;
pub mod source;
pub mod validator;

pub use config::ClusterConfig;
pub use pipeline::{prepare_operation, OperationRequest, PreparedOperation};
pub use position::{fetch_position, fetch_vault, fetch_vault_account};
pub use source::{AccountSource, RpcAccountSource, SourceError, StaticAccountSource};
pub use validator::{resolve_reserves, validate_account, validate_all, ValidatedAccount};

/// Errors that can occur while preparing a vault operation over RPC
#[derive(Debug, thiserror::Error)]
pub enum ToolsError {
    /// An error occurred while making an RPC request
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),
    /// The account source failed outside of a validated lookup
    #[error("Account source error: {0}")]
    Source(#[from] SourceError),
    /// The vault account could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    /// A required account is missing or owned by the wrong program
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Derivation error: {0}")]
    Derive(#[from] DeriveError),
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
    /// A token account could not be unpacked
    #[error("Invalid token account: {0}")]
    TokenAccount(String),
}
