//! Abstract storage traits for the staking indexer.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The reducer and the read API depend only on the traits, so unit
//! tests can swap in an in-memory fake.

pub mod error;
pub mod meta;
pub mod stake;
pub mod wallet;

pub use error::StoreError;
pub use meta::MetaStore;
pub use stake::{StakeRecord, StakeStore};
pub use wallet::{WalletRecord, WalletStore};
