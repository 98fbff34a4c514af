//! Fundamental types for the staking indexer.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: addresses, transaction hashes, token amounts, and timestamps.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod time;

pub use address::WalletAddress;
pub use amount::TokenAmount;
pub use error::TypeError;
pub use hash::TxHash;
pub use time::Timestamp;
