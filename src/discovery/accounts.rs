//! One-shot custodial account discovery.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::schema::CustodialConfig;
use crate::credentials::custodial::{
    AccountSet, CustodialClient, CustodialCredentials, CustodialError,
};
use crate::observability::metrics;

/// How long a driver waits for a spawned discovery once its own work is done.
pub const DISCOVERY_JOIN_WAIT: Duration = Duration::from_secs(5);

/// Terminal state of a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Discovered(AccountSet),
    DiscoveryFailed(CustodialError),
}

impl DiscoveryOutcome {
    pub fn is_discovered(&self) -> bool {
        matches!(self, DiscoveryOutcome::Discovered(_))
    }

    pub fn accounts(&self) -> Option<&AccountSet> {
        match self {
            DiscoveryOutcome::Discovered(accounts) => Some(accounts),
            DiscoveryOutcome::DiscoveryFailed(_) => None,
        }
    }
}

/// A configured, not yet started, discovery run.
#[derive(Debug, Clone)]
pub struct AccountDiscovery {
    base_url: String,
    credentials: Result<CustodialCredentials, CustodialError>,
    timeout: Option<Duration>,
}

impl AccountDiscovery {
    pub fn new(
        base_url: impl Into<String>,
        credentials: CustodialCredentials,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: Ok(credentials),
            timeout,
        }
    }

    /// Discovery against the configured service with credentials from the
    /// environment. Missing credentials surface as a failed run, not here.
    pub fn from_config(config: &CustodialConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            credentials: CustodialCredentials::from_env(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Connect, list accounts once, and report the result.
    ///
    /// Never fails: errors are logged and returned as `DiscoveryFailed`.
    pub async fn run(self) -> DiscoveryOutcome {
        let outcome = match self.discover().await {
            Ok(accounts) => {
                tracing::info!(
                    base_url = %self.base_url,
                    count = accounts.len(),
                    accounts = ?accounts,
                    "Custodial accounts discovered"
                );
                DiscoveryOutcome::Discovered(accounts)
            }
            Err(e) => {
                tracing::warn!(
                    base_url = %self.base_url,
                    error = %e,
                    "Custodial account discovery failed; continuing without it"
                );
                DiscoveryOutcome::DiscoveryFailed(e)
            }
        };

        metrics::record_discovery(
            outcome.is_discovered(),
            outcome.accounts().map_or(0, AccountSet::len),
        );
        outcome
    }

    /// Run on the tokio runtime, independently of provider construction.
    pub fn spawn(self) -> JoinHandle<DiscoveryOutcome> {
        tokio::spawn(self.run())
    }

    async fn discover(&self) -> Result<AccountSet, CustodialError> {
        let credentials = self.credentials.clone()?;
        let client = CustodialClient::connect(&self.base_url, credentials, self.timeout).await?;
        client.list_accounts().await
    }
}

/// Wait at most `wait` for a spawned discovery, then abandon it.
///
/// Returns `None` if the run was still pending (it is aborted) or panicked.
pub async fn join_discovery(
    handle: JoinHandle<DiscoveryOutcome>,
    wait: Duration,
) -> Option<DiscoveryOutcome> {
    let abort = handle.abort_handle();
    match tokio::time::timeout(wait, handle).await {
        Ok(Ok(outcome)) => Some(outcome),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Account discovery task aborted");
            None
        }
        Err(_) => {
            abort.abort();
            tracing::warn!(
                wait_ms = wait.as_millis() as u64,
                "Account discovery still pending; abandoning it"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_service_is_reported() {
        let discovery = AccountDiscovery::new(
            "http://127.0.0.1:1",
            CustodialCredentials::new("key", "secret"),
            Some(Duration::from_secs(2)),
        );

        let outcome = discovery.run().await;
        assert!(matches!(
            outcome,
            DiscoveryOutcome::DiscoveryFailed(CustodialError::ServiceUnreachable(_))
        ));
        assert!(outcome.accounts().is_none());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_the_run() {
        let discovery = AccountDiscovery {
            base_url: "http://127.0.0.1:1".to_string(),
            credentials: Err(CustodialError::CredentialsMissing("not set".to_string())),
            timeout: None,
        };

        let outcome = discovery.spawn().await.unwrap();
        assert_eq!(
            outcome,
            DiscoveryOutcome::DiscoveryFailed(CustodialError::CredentialsMissing(
                "not set".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_join_abandons_hung_discovery() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let handle = AccountDiscovery::new(
            format!("http://{}", addr),
            CustodialCredentials::new("key", "secret"),
            None,
        )
        .spawn();

        let started = std::time::Instant::now();
        let outcome = join_discovery(handle, Duration::from_millis(200)).await;
        assert!(outcome.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_join_returns_finished_outcome() {
        let handle = AccountDiscovery {
            base_url: "http://127.0.0.1:1".to_string(),
            credentials: Err(CustodialError::CredentialsMissing("not set".to_string())),
            timeout: None,
        }
        .spawn();

        let outcome = join_discovery(handle, DISCOVERY_JOIN_WAIT).await;
        assert!(matches!(
            outcome,
            Some(DiscoveryOutcome::DiscoveryFailed(CustodialError::CredentialsMissing(_)))
        ));
    }
}
