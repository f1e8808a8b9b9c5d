//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Executor / transport / config store produce:
//!     → tracing events (structured fields, request and connection IDs)
//!     → metrics.rs (per-call counters and latency histogram)
//!
//! Consumers:
//!     → logging.rs subscriber installed by the binary
//!     → whatever `metrics` recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder itself
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
