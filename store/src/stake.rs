//! Stake storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use stakeindex_types::{Timestamp, TokenAmount, TxHash, WalletAddress};

/// One staking position, created by exactly one `StakeCreated` event.
///
/// Only `amount` is mutable (burns decrement it, possibly to zero); records
/// are never deleted. `wallet` is a plain foreign key; ownership stays with
/// the store, and the reverse lookup is [`StakeStore::stakes_for_wallet`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// The creating transaction's hash.
    pub id: TxHash,
    pub wallet: WalletAddress,
    pub amount: TokenAmount,
    pub multiplier: u64,
    /// Sort key for newest-first burn consumption.
    pub start_timestamp: Timestamp,
    /// Redundant copy of `id`, kept for parity with the on-chain schema.
    pub stake_creation_hash: TxHash,
}

/// Trait for stake storage operations.
pub trait StakeStore {
    fn get_stake(&self, id: &TxHash) -> Result<Option<StakeRecord>, StoreError>;
    /// Upsert keyed by the creating transaction hash.
    fn put_stake(&self, record: &StakeRecord) -> Result<(), StoreError>;
    /// All stakes owned by a wallet, in unspecified but stable order.
    fn stakes_for_wallet(&self, address: &WalletAddress) -> Result<Vec<StakeRecord>, StoreError>;
    fn stake_count(&self) -> Result<u64, StoreError>;

    /// Paged variant for the read API. Returns up to `limit` stakes starting
    /// at `offset` within this wallet's stable order.
    fn stakes_for_wallet_paged(
        &self,
        address: &WalletAddress,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<StakeRecord>, StoreError> {
        let all = self.stakes_for_wallet(address)?;
        Ok(all.into_iter().skip(offset as usize).take(limit).collect())
    }
}
