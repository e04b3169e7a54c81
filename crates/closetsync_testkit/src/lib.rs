//! # ClosetSync Testkit
//!
//! Shared fixtures and test bootstrap for the ClosetSync crates.
//!
//! Fixtures are deterministic: the same call always builds the same
//! entity, so assertions can compare whole values.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod fixtures;

pub use fixtures::{chat_exchange, profile, wardrobe, wardrobe_item};

use std::sync::Once;

static TRACING: Once = Once::new();

/// Initializes a `tracing` subscriber for tests, once per process.
///
/// Honors `RUST_LOG`; silent by default. Safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
