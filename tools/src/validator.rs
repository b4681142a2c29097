use std::time::Duration;

use futures::future::join_all;
use kvault_common::{AccountStatus, ReserveReference, ReserveResolution, ValidationError};
use log::{debug, warn};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;

use crate::config::ClusterConfig;
use crate::source::AccountSource;

/// Result of one existence and ownership check. `account` is kept only when
/// the check passed.
#[derive(Debug, Clone)]
pub struct ValidatedAccount {
    pub address: Pubkey,
    pub expected_owner: Pubkey,
    pub status: AccountStatus,
    pub account: Option<Account>,
}

impl ValidatedAccount {
    pub fn into_account(self) -> Result<Account, ValidationError> {
        self.status.into_result(&self.address, &self.expected_owner)?;
        self.account.ok_or(ValidationError::NotFound {
            address: self.address,
        })
    }
}

/// Looks up `address` and checks its owner.
///
/// A lookup that errors or exceeds `timeout` is reported as `NotFound`; it is
/// never retried here.
pub async fn validate_account<S>(
    source: &S,
    address: &Pubkey,
    expected_owner: &Pubkey,
    timeout: Duration,
) -> ValidatedAccount
where
    S: AccountSource + ?Sized,
{
    let fetched = match tokio::time::timeout(timeout, source.get_account(address)).await {
        Ok(Ok(account)) => account,
        Ok(Err(e)) => {
            warn!("Lookup of {} failed, treating as not found: {}", address, e);
            None
        }
        Err(_) => {
            warn!("Lookup of {} timed out after {:?}, treating as not found", address, timeout);
            None
        }
    };

    let status = AccountStatus::classify(fetched.as_ref().map(|a| &a.owner), expected_owner);
    debug!("Account {} status {:?}", address, status);
    ValidatedAccount {
        address: *address,
        expected_owner: *expected_owner,
        status,
        account: if status.is_valid() { fetched } else { None },
    }
}

/// Validates every address concurrently; results keep the input order.
pub async fn validate_all<S>(
    source: &S,
    addresses: &[Pubkey],
    expected_owner: &Pubkey,
    timeout: Duration,
) -> Vec<ValidatedAccount>
where
    S: AccountSource + ?Sized,
{
    join_all(
        addresses
            .iter()
            .map(|address| validate_account(source, address, expected_owner, timeout)),
    )
    .await
}

/// Pairs every reserve with its lending market.
///
/// All reserves are fetched and validated together, then all of their
/// markets. Nothing is returned until both rounds have completed.
pub async fn resolve_reserves<S>(
    source: &S,
    reserves: &[Pubkey],
    config: &ClusterConfig,
) -> Vec<ReserveResolution>
where
    S: AccountSource + ?Sized,
{
    let lending_program = config.programs.lending_program;

    let validated = validate_all(source, reserves, &lending_program, config.timeout).await;
    let markets: Vec<Result<Pubkey, ValidationError>> = validated
        .into_iter()
        .map(|reserve| {
            let address = reserve.address;
            let account = reserve.into_account()?;
            ReserveReference::decode(&account.data, &account.owner, &lending_program)
                .map(|reference| reference.lending_market)
                .map_err(|source| ValidationError::Malformed { address, source })
        })
        .collect();

    let to_check: Vec<Pubkey> = markets
        .iter()
        .filter_map(|market| market.as_ref().ok().copied())
        .collect();
    let mut checked = validate_all(source, &to_check, &lending_program, config.timeout)
        .await
        .into_iter();

    reserves
        .iter()
        .zip(markets)
        .map(|(reserve, market)| {
            let resolved = market.and_then(|market| match checked.next() {
                Some(validated) => validated
                    .status
                    .into_result(&market, &lending_program)
                    .map(|_| market),
                None => Err(ValidationError::NotFound { address: market }),
            });
            match resolved {
                Ok(lending_market) => ReserveResolution::Resolved {
                    reserve: *reserve,
                    lending_market,
                },
                Err(error) => {
                    warn!("Reserve {} unresolved: {}", reserve, error);
                    ReserveResolution::Unresolved {
                        reserve: *reserve,
                        error,
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::StaticAccountSource;
    use kvault_common::constants::{KLEND_PROGRAM_ID, RESERVE_ACCOUNT};
    use kvault_common::layout::account_discriminator;
    use kvault_common::state::RESERVE_LENDING_MARKET_OFFSET;

    pub(crate) fn reserve_data(market: &Pubkey) -> Vec<u8> {
        let mut data = vec![0u8; 8624];
        data[..8].copy_from_slice(&account_discriminator(RESERVE_ACCOUNT));
        data[RESERVE_LENDING_MARKET_OFFSET..RESERVE_LENDING_MARKET_OFFSET + 32]
            .copy_from_slice(market.as_ref());
        data
    }

    fn config() -> ClusterConfig {
        ClusterConfig::mainnet("http://localhost:8899").with_timeout(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_validate_account_statuses() {
        let owned = Pubkey::new_unique();
        let foreign = Pubkey::new_unique();
        let other_program = Pubkey::new_unique();
        let mut source = StaticAccountSource::new();
        source
            .insert_data(owned, KLEND_PROGRAM_ID, vec![0; 8])
            .insert_data(foreign, other_program, vec![0; 8]);

        let timeout = Duration::from_millis(200);
        let valid = validate_account(&source, &owned, &KLEND_PROGRAM_ID, timeout).await;
        assert_eq!(valid.status, AccountStatus::Valid);
        assert!(valid.account.is_some());

        let mismatch = validate_account(&source, &foreign, &KLEND_PROGRAM_ID, timeout).await;
        assert_eq!(
            mismatch.status,
            AccountStatus::OwnerMismatch {
                actual: other_program
            }
        );
        assert!(mismatch.account.is_none());

        let missing =
            validate_account(&source, &Pubkey::new_unique(), &KLEND_PROGRAM_ID, timeout).await;
        assert_eq!(missing.status, AccountStatus::NotFound);
    }

    #[tokio::test]
    async fn test_timeout_and_errors_fail_closed() {
        let address = Pubkey::new_unique();
        let mut slow = StaticAccountSource::new();
        slow.insert_data(address, KLEND_PROGRAM_ID, vec![]);
        let slow = slow.with_delay(Duration::from_millis(500));
        let timed_out =
            validate_account(&slow, &address, &KLEND_PROGRAM_ID, Duration::from_millis(20)).await;
        assert_eq!(timed_out.status, AccountStatus::NotFound);

        let mut broken = StaticAccountSource::new();
        broken
            .insert_data(address, KLEND_PROGRAM_ID, vec![])
            .fail_on(address);
        let errored =
            validate_account(&broken, &address, &KLEND_PROGRAM_ID, Duration::from_millis(20)).await;
        assert_eq!(errored.status, AccountStatus::NotFound);
    }

    #[tokio::test]
    async fn test_validate_all_keeps_order() {
        let addresses: Vec<Pubkey> = (0..5).map(|_| Pubkey::new_unique()).collect();
        let mut source = StaticAccountSource::new();
        for address in addresses.iter().step_by(2) {
            source.insert_data(*address, KLEND_PROGRAM_ID, vec![]);
        }
        let results =
            validate_all(&source, &addresses, &KLEND_PROGRAM_ID, Duration::from_millis(200)).await;
        let statuses: Vec<bool> = results.iter().map(|r| r.status.is_valid()).collect();
        assert_eq!(statuses, vec![true, false, true, false, true]);
        assert!(results.iter().zip(&addresses).all(|(r, a)| r.address == *a));
    }

    #[tokio::test]
    async fn test_resolve_reserves() {
        let good = Pubkey::new_unique();
        let good_market = Pubkey::new_unique();
        let no_market = Pubkey::new_unique();
        let missing_market = Pubkey::new_unique();
        let foreign = Pubkey::new_unique();
        let impostor = Pubkey::new_unique();
        let foreign_market_reserve = Pubkey::new_unique();
        let foreign_market = Pubkey::new_unique();

        let mut source = StaticAccountSource::new();
        source
            .insert_data(good, KLEND_PROGRAM_ID, reserve_data(&good_market))
            .insert_data(good_market, KLEND_PROGRAM_ID, vec![0; 64])
            .insert_data(no_market, KLEND_PROGRAM_ID, reserve_data(&missing_market))
            .insert_data(foreign, impostor, reserve_data(&good_market))
            .insert_data(
                foreign_market_reserve,
                KLEND_PROGRAM_ID,
                reserve_data(&foreign_market),
            )
            .insert_data(foreign_market, impostor, vec![0; 64]);

        let resolutions = resolve_reserves(
            &source,
            &[good, no_market, foreign, foreign_market_reserve],
            &config(),
        )
        .await;
        assert_eq!(
            resolutions,
            vec![
                ReserveResolution::Resolved {
                    reserve: good,
                    lending_market: good_market
                },
                ReserveResolution::Unresolved {
                    reserve: no_market,
                    error: ValidationError::NotFound {
                        address: missing_market
                    }
                },
                ReserveResolution::Unresolved {
                    reserve: foreign,
                    error: ValidationError::OwnerMismatch {
                        address: foreign,
                        expected: KLEND_PROGRAM_ID,
                        actual: impostor
                    }
                },
                ReserveResolution::Unresolved {
                    reserve: foreign_market_reserve,
                    error: ValidationError::OwnerMismatch {
                        address: foreign_market,
                        expected: KLEND_PROGRAM_ID,
                        actual: impostor
                    }
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_reserve() {
        let reserve = Pubkey::new_unique();
        let mut source = StaticAccountSource::new();
        source.insert_data(reserve, KLEND_PROGRAM_ID, vec![0; 16]);

        let resolutions = resolve_reserves(&source, &[reserve], &config()).await;
        assert!(matches!(
            &resolutions[0],
            ReserveResolution::Unresolved {
                error: ValidationError::Malformed { .. },
                ..
            }
        ));
    }
}
