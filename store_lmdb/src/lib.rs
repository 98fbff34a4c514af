//! LMDB storage backend for the staking indexer.
//!
//! Implements the `stakeindex-store` traits using the `heed` LMDB bindings.
//! One environment holds four databases: wallets, stakes, a wallet-to-stake
//! composite-key index, and metadata. Every trait call is a single LMDB
//! transaction, so each `put` is durably committed before it returns.

pub mod environment;
pub mod error;
pub mod meta;
pub mod stake;
pub mod wallet;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
pub use stake::LmdbStakeStore;
pub use wallet::LmdbWalletStore;
