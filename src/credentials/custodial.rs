//! Custodial wallet service client.
//!
//! The service holds keys on the user's behalf and only exposes account
//! listing. Requests are authenticated with an API key and an HMAC-SHA256
//! signature over `timestamp + METHOD + path + body`.
//!
//! # Security
//! - API secrets are loaded from environment variables or passed in directly
//! - Secrets are never logged; `Debug` output redacts them

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use alloy::primitives::hex;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the custodial API key.
pub const API_KEY_ENV_VAR: &str = "DEPLOY_CUSTODIAL_API_KEY";

/// Environment variable holding the custodial API secret.
pub const API_SECRET_ENV_VAR: &str = "DEPLOY_CUSTODIAL_API_SECRET";

const USER_PATH: &str = "/v2/user";
const ACCOUNTS_PATH: &str = "/v2/accounts";

/// Errors on the custodial path. None of these are fatal to a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodialError {
    /// API key or secret not supplied.
    #[error("Custodial credentials missing: {0}")]
    CredentialsMissing(String),

    /// The service rejected the credentials.
    #[error("Custodial authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The service could not be reached (connect error, timeout, bad URL).
    #[error("Custodial service unreachable: {0}")]
    ServiceUnreachable(String),

    /// The service answered with an unexpected status.
    #[error("Custodial service returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Malformed custodial response: {0}")]
    MalformedResponse(String),
}

/// Result type for custodial operations.
pub type CustodialResult<T> = Result<T, CustodialError>;

/// API key/secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct CustodialCredentials {
    api_key: String,
    api_secret: String,
}

impl CustodialCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Load credentials from `DEPLOY_CUSTODIAL_API_KEY` / `DEPLOY_CUSTODIAL_API_SECRET`.
    pub fn from_env() -> CustodialResult<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    CustodialError::CredentialsMissing(format!(
                        "Environment variable {} not set",
                        name
                    ))
                })
        };
        Ok(Self::new(read(API_KEY_ENV_VAR)?, read(API_SECRET_ENV_VAR)?))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Hex HMAC-SHA256 of `timestamp + method + path + body` keyed by the secret.
    pub fn sign(
        &self,
        timestamp: &str,
        method: &str,
        path: &str,
        body: &str,
    ) -> CustodialResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| CustodialError::AuthenticationFailed(format!("Invalid API secret: {}", e)))?;
        mac.update(timestamp.as_bytes());
        mac.update(method.as_bytes());
        mac.update(path.as_bytes());
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for CustodialCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustodialCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Ordered account addresses controlled through the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccountSet(Vec<String>);

impl AccountSet {
    pub fn new(accounts: Vec<String>) -> Self {
        Self(accounts)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct AccountsPage {
    #[serde(default)]
    data: Vec<AccountEntry>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// Entries without an address are reported by id.
#[derive(Debug, Deserialize)]
struct AccountEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    next_uri: Option<String>,
}

/// Authenticated client for the custodial service.
#[derive(Clone)]
pub struct CustodialClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: CustodialCredentials,
}

impl CustodialClient {
    /// Connect and verify the credentials against the service.
    ///
    /// `timeout` bounds every request; `None` leaves calls unbounded.
    pub async fn connect(
        base_url: &str,
        credentials: CustodialCredentials,
        timeout: Option<Duration>,
    ) -> CustodialResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            CustodialError::ServiceUnreachable(format!("Invalid base URL '{}': {}", base_url, e))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| CustodialError::ServiceUnreachable(e.to_string()))?;

        let client = Self {
            http,
            base_url,
            credentials,
        };

        client.get::<serde_json::Value>(USER_PATH).await?;

        tracing::info!(
            base_url = %client.base_url,
            "Connected to custodial service"
        );

        Ok(client)
    }

    /// List every account, following pagination.
    pub async fn list_accounts(&self) -> CustodialResult<AccountSet> {
        let mut accounts = Vec::new();
        let mut path = ACCOUNTS_PATH.to_string();
        let mut visited = HashSet::new();

        loop {
            let page: AccountsPage = self.get(&path).await?;
            accounts.extend(
                page.data
                    .into_iter()
                    .map(|entry| entry.address.unwrap_or(entry.id))
                    .filter(|account| !account.is_empty()),
            );

            visited.insert(path);
            match page.pagination.and_then(|p| p.next_uri) {
                Some(next) if next.is_empty() => break,
                Some(next) if visited.contains(&next) => {
                    tracing::warn!(next_uri = %next, "Custodial pagination revisits a page; stopping");
                    break;
                }
                Some(next) => path = next,
                None => break,
            }
        }

        tracing::debug!(count = accounts.len(), "Custodial accounts listed");
        Ok(AccountSet::new(accounts))
    }

    async fn get<T: DeserializeOwned>(&self, path_and_query: &str) -> CustodialResult<T> {
        let url = self.base_url.join(path_and_query).map_err(|e| {
            CustodialError::ServiceUnreachable(format!("Invalid request path '{}': {}", path_and_query, e))
        })?;

        let request_path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string();
        let signature = self.credentials.sign(&timestamp, "GET", &request_path, "")?;

        let response = self
            .http
            .get(url)
            .header("CB-ACCESS-KEY", self.credentials.api_key())
            .header("CB-ACCESS-SIGN", signature)
            .header("CB-ACCESS-TIMESTAMP", timestamp)
            .send()
            .await
            .map_err(|e| CustodialError::ServiceUnreachable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(CustodialError::AuthenticationFailed(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CustodialError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CustodialError::MalformedResponse(e.to_string()))
    }
}

impl fmt::Debug for CustodialClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustodialClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_deterministic() {
        let creds = CustodialCredentials::new("key", "secret");
        let a = creds.sign("1700000000", "GET", "/v2/accounts", "").unwrap();
        let b = creds.sign("1700000000", "GET", "/v2/accounts", "").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, creds.sign("1700000001", "GET", "/v2/accounts", "").unwrap());
    }

    #[test]
    fn test_signature_known_answer() {
        // RFC 4231 test case 2, split across the signed fields.
        let creds = CustodialCredentials::new("key", "Jefe");
        assert_eq!(
            creds.sign("what do ya ", "want ", "for nothing?", "").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );

        let creds = CustodialCredentials::new("test-key", "test-secret");
        assert_eq!(
            creds
                .sign("1700000000", "GET", "/v2/accounts?starting_after=a2", "")
                .unwrap(),
            "d6446f445fa11d52ddd7241fd383229b9f407c319539089190d16fdb6aabd3ba"
        );
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let a = CustodialCredentials::new("key", "secret-a").sign("1", "GET", "/", "").unwrap();
        let b = CustodialCredentials::new("key", "secret-b").sign("1", "GET", "/", "").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = CustodialCredentials::new("key", "very-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("key"));
    }

    #[test]
    fn test_accounts_page_falls_back_to_id() {
        let page: AccountsPage = serde_json::from_str(
            r#"{"data":[{"id":"a1","address":"0xabc"},{"id":"a2"}],"pagination":{"next_uri":null}}"#,
        )
        .unwrap();
        let accounts: Vec<_> = page
            .data
            .into_iter()
            .map(|entry| entry.address.unwrap_or(entry.id))
            .collect();
        assert_eq!(accounts, vec!["0xabc", "a2"]);
    }

    #[tokio::test]
    async fn test_connect_invalid_base_url() {
        let result =
            CustodialClient::connect("not a url", CustodialCredentials::new("k", "s"), None).await;
        assert!(matches!(result, Err(CustodialError::ServiceUnreachable(_))));
    }
}
