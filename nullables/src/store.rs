//! Nullable store: thread-safe in-memory storage for testing.

use stakeindex_store::meta::MetaStore;
use stakeindex_store::stake::{StakeRecord, StakeStore};
use stakeindex_store::wallet::{WalletRecord, WalletStore};
use stakeindex_store::StoreError;
use stakeindex_types::{TxHash, WalletAddress};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory wallet + stake + meta store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    wallets: Mutex<HashMap<WalletAddress, WalletRecord>>,
    stakes: Mutex<HashMap<TxHash, StakeRecord>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            wallets: Mutex::new(HashMap::new()),
            stakes: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }

    /// All wallets sorted by address, a canonical table dump for
    /// replay-identity assertions.
    pub fn dump_wallets(&self) -> Vec<WalletRecord> {
        let mut all: Vec<_> = self.wallets.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|w| *w.address.as_bytes());
        all
    }

    /// All stakes sorted by id, a canonical table dump.
    pub fn dump_stakes(&self) -> Vec<StakeRecord> {
        let mut all: Vec<_> = self.stakes.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|s| *s.id.as_bytes());
        all
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletStore for NullStore {
    fn get_wallet(&self, address: &WalletAddress) -> Result<Option<WalletRecord>, StoreError> {
        Ok(self.wallets.lock().unwrap().get(address).cloned())
    }

    fn put_wallet(&self, record: &WalletRecord) -> Result<(), StoreError> {
        self.wallets
            .lock()
            .unwrap()
            .insert(record.address, record.clone());
        Ok(())
    }

    fn wallet_count(&self) -> Result<u64, StoreError> {
        Ok(self.wallets.lock().unwrap().len() as u64)
    }
}

impl StakeStore for NullStore {
    fn get_stake(&self, id: &TxHash) -> Result<Option<StakeRecord>, StoreError> {
        Ok(self.stakes.lock().unwrap().get(id).cloned())
    }

    fn put_stake(&self, record: &StakeRecord) -> Result<(), StoreError> {
        self.stakes.lock().unwrap().insert(record.id, record.clone());
        Ok(())
    }

    fn stakes_for_wallet(&self, address: &WalletAddress) -> Result<Vec<StakeRecord>, StoreError> {
        // Sorted by id so the per-wallet order is stable, matching the LMDB
        // index order.
        let mut found: Vec<_> = self
            .stakes
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.wallet == *address)
            .cloned()
            .collect();
        found.sort_by_key(|s| *s.id.as_bytes());
        Ok(found)
    }

    fn stake_count(&self) -> Result<u64, StoreError> {
        Ok(self.stakes.lock().unwrap().len() as u64)
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().unwrap().get(key).cloned())
    }

    fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
        self.meta.lock().unwrap().remove(key);
        Ok(())
    }
}
