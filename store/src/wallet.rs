//! Wallet storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use stakeindex_types::{TokenAmount, WalletAddress};

/// Per-wallet aggregate record derived from the event stream.
///
/// `total_staked` tracks the sum of the wallet's stake amounts, except
/// immediately after a claim, which overwrites it with the contract's
/// authoritative value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub address: WalletAddress,
    pub total_staked: TokenAmount,
    /// Set only by the claim reconciler; zero until then.
    pub klima_allocation: TokenAmount,
    /// Set only by the claim reconciler; zero until then.
    pub klimax_allocation: TokenAmount,
}

impl WalletRecord {
    /// A fresh zero-valued wallet, not yet persisted.
    pub fn empty(address: WalletAddress) -> Self {
        Self {
            address,
            total_staked: TokenAmount::ZERO,
            klima_allocation: TokenAmount::ZERO,
            klimax_allocation: TokenAmount::ZERO,
        }
    }
}

/// Trait for wallet storage operations.
pub trait WalletStore {
    /// Strict lookup; `Ok(None)` when the wallet has never been persisted.
    fn get_wallet(&self, address: &WalletAddress) -> Result<Option<WalletRecord>, StoreError>;
    /// Upsert keyed by address.
    fn put_wallet(&self, record: &WalletRecord) -> Result<(), StoreError>;
    fn wallet_count(&self) -> Result<u64, StoreError>;
}
