//! Shared utilities for the staking indexer.

pub mod logging;

pub use logging::init_tracing;
