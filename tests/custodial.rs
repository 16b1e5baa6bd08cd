//! Custodial client and account discovery against a mock service.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use deploy_resolver::credentials::{CustodialClient, CustodialCredentials, CustodialError};
use deploy_resolver::discovery::{AccountDiscovery, DiscoveryOutcome};

mod common;

use common::MockRequest;

fn credentials() -> CustodialCredentials {
    CustodialCredentials::new("test-key", "test-secret")
}

/// Recompute the signature the service expects for `req`.
fn signature_matches(req: &MockRequest) -> bool {
    let (Some(timestamp), Some(signature)) = (
        req.headers.get("cb-access-timestamp"),
        req.headers.get("cb-access-sign"),
    ) else {
        return false;
    };
    credentials()
        .sign(timestamp, "GET", &req.path, "")
        .map(|expected| &expected == signature)
        .unwrap_or(false)
}

/// Service accepting `test-key`, serving two pages of accounts.
async fn start_service() -> String {
    let addr = common::start_programmable_backend(|req: MockRequest| async move {
        if req.headers.get("cb-access-key").map(String::as_str) != Some("test-key") {
            return (401, r#"{"errors":[{"id":"authentication_error"}]}"#.to_string());
        }
        if !signature_matches(&req) {
            return (401, r#"{"errors":[{"id":"invalid_signature"}]}"#.to_string());
        }

        match req.path.as_str() {
            "/v2/user" => (200, r#"{"data":{"id":"user-1"}}"#.to_string()),
            "/v2/accounts" => (
                200,
                r#"{"data":[{"id":"a1","address":"0x1111111111111111111111111111111111111111"},{"id":"a2","address":"0x2222222222222222222222222222222222222222"}],
                    "pagination":{"next_uri":"/v2/accounts?starting_after=a2"}}"#
                    .to_string(),
            ),
            "/v2/accounts?starting_after=a2" => (
                200,
                r#"{"data":[{"id":"a3"}],"pagination":{"next_uri":null}}"#.to_string(),
            ),
            _ => (404, r#"{"errors":[{"id":"not_found"}]}"#.to_string()),
        }
    })
    .await;
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_connect_and_list_accounts() {
    let base_url = start_service().await;

    let client = CustodialClient::connect(&base_url, credentials(), Some(Duration::from_secs(5)))
        .await
        .unwrap();
    let accounts = client.list_accounts().await.unwrap();

    assert_eq!(
        accounts.iter().collect::<Vec<_>>(),
        vec![
            "0x1111111111111111111111111111111111111111",
            "0x2222222222222222222222222222222222222222",
            "a3",
        ]
    );
}

#[tokio::test]
async fn test_wrong_secret_is_rejected() {
    let base_url = start_service().await;

    let result = CustodialClient::connect(
        &base_url,
        CustodialCredentials::new("test-key", "other-secret"),
        None,
    )
    .await;
    assert!(matches!(result, Err(CustodialError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn test_pagination_cycle_terminates() {
    let addr = common::start_programmable_backend(|req: MockRequest| async move {
        match req.path.as_str() {
            "/v2/user" => (200, "{}".to_string()),
            "/v2/accounts" => (
                200,
                r#"{"data":[{"id":"a1"}],"pagination":{"next_uri":"/v2/accounts?page=2"}}"#.to_string(),
            ),
            "/v2/accounts?page=2" => (
                200,
                r#"{"data":[{"id":"a2"}],"pagination":{"next_uri":"/v2/accounts"}}"#.to_string(),
            ),
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let client = CustodialClient::connect(
        &format!("http://{}", addr),
        credentials(),
        Some(Duration::from_secs(5)),
    )
    .await
    .unwrap();
    let accounts = tokio::time::timeout(Duration::from_secs(10), client.list_accounts())
        .await
        .expect("pagination loop did not terminate")
        .unwrap();

    assert_eq!(accounts.iter().collect::<Vec<_>>(), vec!["a1", "a2"]);
}

#[tokio::test]
async fn test_bad_credentials() {
    let base_url = start_service().await;

    let result = CustodialClient::connect(
        &base_url,
        CustodialCredentials::new("wrong-key", "test-secret"),
        None,
    )
    .await;
    assert!(matches!(result, Err(CustodialError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn test_server_error_status() {
    let addr = common::start_programmable_backend(|_req: MockRequest| async move {
        (503, "maintenance".to_string())
    })
    .await;

    let result =
        CustodialClient::connect(&format!("http://{}", addr), credentials(), None).await;
    assert_eq!(
        result.unwrap_err(),
        CustodialError::UnexpectedStatus {
            status: 503,
            body: "maintenance".to_string(),
        }
    );
}

#[tokio::test]
async fn test_malformed_accounts_response() {
    let addr = common::start_programmable_backend(|req: MockRequest| async move {
        match req.path.as_str() {
            "/v2/user" => (200, "{}".to_string()),
            _ => (200, "not json".to_string()),
        }
    })
    .await;

    let client = CustodialClient::connect(&format!("http://{}", addr), credentials(), None)
        .await
        .unwrap();
    assert!(matches!(
        client.list_accounts().await,
        Err(CustodialError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_discovery_is_one_shot() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let addr = common::start_programmable_backend(move |_req: MockRequest| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (500, "boom".to_string())
        }
    })
    .await;

    let outcome = AccountDiscovery::new(format!("http://{}", addr), credentials(), None)
        .spawn()
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        DiscoveryOutcome::DiscoveryFailed(CustodialError::UnexpectedStatus { status: 500, .. })
    ));
    // No retry after the failed probe.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_discovery_reports_accounts() {
    let base_url = start_service().await;

    let outcome = AccountDiscovery::new(base_url, credentials(), Some(Duration::from_secs(5)))
        .run()
        .await;

    let accounts = outcome.accounts().unwrap();
    assert_eq!(accounts.len(), 3);
}
