//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! External dependencies (the ledger, its clock) are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests. The daemon's
//! `--simulate` mode runs the whole API against [`NullLedger`].

pub mod clock;
pub mod ledger;

pub use clock::NullClock;
pub use ledger::{NullLedger, NullLedgerConfig, DEFAULT_PAGE_SIZE};
