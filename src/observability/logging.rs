//! Structured logging.
//!
//! # Responsibilities
//! - Install the `tracing` subscriber for the command-line binary
//! - Honour `RUST_LOG`, falling back to a crate-level default
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Output goes to stderr so response bodies on stdout stay pipeable

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "rest_pipeline=info";

/// Install a global fmt subscriber. A second call is a no-op.
pub fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into());

    // try_init fails only when a subscriber is already set.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
