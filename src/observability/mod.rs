//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / factory / discovery produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//! ```
//!
//! # Design Decisions
//! - Structured logging with network name as a field on every event
//! - Metrics are cheap and recorder-agnostic

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
