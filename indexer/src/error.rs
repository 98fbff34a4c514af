//! Reducer errors.
//!
//! Only infrastructure failures surface here. The defensive conditions of
//! the event stream (zero-amount burns, claims for unknown wallets) are
//! logged inside the handlers and never propagate.

use stakeindex_store::StoreError;
use stakeindex_types::TxHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("amount overflow while applying transaction {tx}")]
    Overflow { tx: TxHash },
}
