//! Event reducer for the staking indexer.
//!
//! Consumes the ordered on-chain event stream and maintains the derived
//! wallet/stake ledger:
//! - stake creation (get-or-create wallet, append stake record)
//! - burn allocation (newest-stake-first consumption of a partial burn)
//! - claim reconciliation (authoritative overwrite from contract totals)
//!
//! Processing is strictly sequential: one event runs to completion, with all
//! its writes committed, before the next is applied. Replaying the same log
//! from empty storage always produces identical tables.

pub mod config;
pub mod error;
pub mod reducer;
pub mod replay;

pub use config::{IndexerConfig, UnknownWalletBurns};
pub use error::ReduceError;
pub use reducer::EventReducer;
pub use replay::{replay, replay_log, ReplayError, ReplayStats};
