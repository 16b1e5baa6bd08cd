//! Metrics collection.
//!
//! # Metrics
//! - `deploy_provider_builds_total` (counter): provider builds by kind, outcome
//! - `deploy_account_discovery_total` (counter): discovery runs by outcome
//! - `deploy_custodial_accounts` (gauge): accounts seen by the last discovery
//!
//! No exporter is installed here; without a recorder the calls are no-ops.

use crate::config::schema::ProviderKind;

/// Record one provider build.
pub fn record_provider_build(kind: ProviderKind, success: bool) {
    metrics::counter!(
        "deploy_provider_builds_total",
        "kind" => kind.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
}

/// Record one account discovery run.
pub fn record_discovery(success: bool, accounts: usize) {
    metrics::counter!("deploy_account_discovery_total", "outcome" => outcome(success)).increment(1);
    if success {
        metrics::gauge!("deploy_custodial_accounts").set(accounts as f64);
    }
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
