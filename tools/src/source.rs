use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;

use crate::config::ClusterConfig;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("RPC error: {0}")]
    Rpc(#[from] ClientError),
    #[error("Account source unavailable: {0}")]
    Unavailable(String),
}

/// Where raw accounts come from. `Ok(None)` means the account does not exist.
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, SourceError>;
}

pub struct RpcAccountSource {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcAccountSource {
    pub fn new(client: RpcClient, commitment: CommitmentConfig) -> Self {
        Self { client, commitment }
    }

    pub fn from_config(config: &ClusterConfig) -> Self {
        Self::new(config.rpc_client(), config.commitment)
    }
}

#[async_trait]
impl AccountSource for RpcAccountSource {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, SourceError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await?;
        Ok(response.value)
    }
}

/// Fixed set of accounts held in memory. Useful for replaying captured
/// accounts and for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticAccountSource {
    accounts: HashMap<Pubkey, Account>,
    failing: HashSet<Pubkey>,
    delay: Option<Duration>,
}

impl StaticAccountSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Pubkey, account: Account) -> &mut Self {
        self.accounts.insert(address, account);
        self
    }

    pub fn insert_data(&mut self, address: Pubkey, owner: Pubkey, data: Vec<u8>) -> &mut Self {
        self.insert(
            address,
            Account {
                lamports: 1_000_000,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        )
    }

    /// Lookups of `address` fail as if the endpoint errored.
    pub fn fail_on(&mut self, address: Pubkey) -> &mut Self {
        self.failing.insert(address);
        self
    }

    /// Every lookup sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl AccountSource for StaticAccountSource {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(address) {
            return Err(SourceError::Unavailable(format!("lookup of {} failed", address)));
        }
        Ok(self.accounts.get(address).cloned())
    }
}
