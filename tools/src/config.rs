use std::time::Duration;

use kvault_common::ProgramIds;
use log::info;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;

use crate::ToolsError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything an RPC-side operation needs to know about the cluster it talks
/// to. Passed explicitly into every call.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    /// Upper bound for a single account lookup.
    pub timeout: Duration,
    pub programs: ProgramIds,
}

impl ClusterConfig {
    pub fn new(
        rpc_url: impl Into<String>,
        commitment: CommitmentConfig,
        timeout: Duration,
        programs: ProgramIds,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            commitment,
            timeout,
            programs,
        }
    }

    pub fn mainnet(rpc_url: impl Into<String>) -> Self {
        Self::new(
            rpc_url,
            CommitmentConfig::confirmed(),
            DEFAULT_TIMEOUT,
            ProgramIds::default(),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_programs(mut self, programs: ProgramIds) -> Self {
        self.programs = programs;
        self
    }

    pub fn rpc_client(&self) -> RpcClient {
        RpcClient::new_with_timeout_and_commitment(
            self.rpc_url.clone(),
            self.timeout,
            self.commitment,
        )
    }

    /// Fails fast when the endpoint is unreachable.
    pub async fn check_connection(&self) -> Result<(), ToolsError> {
        let version = self.rpc_client().get_version().await?;
        info!("Connected to {} (solana-core {})", self.rpc_url, version.solana_core);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvault_common::constants::KVAULT_PROGRAM_ID;

    #[test]
    fn test_mainnet_defaults() {
        let config = ClusterConfig::mainnet("https://api.mainnet-beta.solana.com");
        assert_eq!(config.commitment, CommitmentConfig::confirmed());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.programs.vault_program, KVAULT_PROGRAM_ID);
    }

    #[test]
    fn test_builders() {
        let config = ClusterConfig::mainnet("http://localhost:8899")
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.rpc_client().url(), "http://localhost:8899");
    }

    #[tokio::test]
    async fn test_invalid_rpc_url() {
        let config = ClusterConfig::mainnet("http://invalid-url:8899")
            .with_timeout(Duration::from_secs(1));
        assert!(matches!(
            config.check_connection().await,
            Err(ToolsError::Rpc(_))
        ));
    }
}
