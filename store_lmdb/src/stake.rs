//! LMDB implementation of StakeStore.
//!
//! Two databases:
//! - `stakes_db`: `stake_id(32)` → bincode(StakeRecord).
//! - `stake_index_db`: composite key `wallet(20) ++ stake_id(32)` → empty.
//!   Enables a prefix range-scan for all stakes owned by a wallet; index
//!   entries sort by stake id, so the per-wallet order is stable.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use stakeindex_store::stake::{StakeRecord, StakeStore};
use stakeindex_store::StoreError;
use stakeindex_types::{TxHash, WalletAddress};

use crate::LmdbError;

pub struct LmdbStakeStore {
    pub(crate) env: Arc<Env>,
    pub(crate) stakes_db: Database<Bytes, Bytes>,
    pub(crate) stake_index_db: Database<Bytes, Bytes>,
}

/// Build the 52-byte composite key `wallet ++ stake_id` for `stake_index_db`.
fn index_key(wallet: &WalletAddress, stake_id: &TxHash) -> [u8; 52] {
    let mut key = [0u8; 52];
    key[..20].copy_from_slice(wallet.as_bytes());
    key[20..].copy_from_slice(stake_id.as_bytes());
    key
}

/// Exclusive upper bound for a prefix range scan; `None` when the prefix is
/// all 0xff bytes and the scan must run to the end of the keyspace.
fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.last_mut() {
        if *last < 0xff {
            *last += 1;
            return Some(upper);
        }
        upper.pop();
    }
    None
}

impl LmdbStakeStore {
    fn get_stake_txn(
        &self,
        rtxn: &heed::RoTxn,
        id: &TxHash,
    ) -> Result<Option<StakeRecord>, LmdbError> {
        match self.stakes_db.get(rtxn, id.as_bytes().as_slice())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }
}

impl StakeStore for LmdbStakeStore {
    fn get_stake(&self, id: &TxHash) -> Result<Option<StakeRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.get_stake_txn(&rtxn, id)?)
    }

    fn put_stake(&self, record: &StakeRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.stakes_db
            .put(&mut wtxn, record.id.as_bytes().as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        let key = index_key(&record.wallet, &record.id);
        self.stake_index_db
            .put(&mut wtxn, &key[..], &[])
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn stakes_for_wallet(&self, address: &WalletAddress) -> Result<Vec<StakeRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = address.as_bytes();
        let upper = prefix_upper_bound(prefix);

        let bounds = (
            Bound::Included(prefix.as_slice()),
            match upper.as_deref() {
                Some(u) => Bound::Excluded(u),
                None => Bound::Unbounded,
            },
        );
        let iter = self
            .stake_index_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(LmdbError::from)?;
            if key.len() != 52 {
                continue;
            }
            let mut arr = [0u8; 32];
            arr.copy_from_slice(&key[20..]);
            let id = TxHash::new(arr);
            match self.get_stake_txn(&rtxn, &id)? {
                Some(record) => results.push(record),
                None => {
                    return Err(StoreError::Corruption(format!(
                        "stake index references missing stake {id}"
                    )))
                }
            }
        }
        Ok(results)
    }

    fn stake_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.stakes_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
