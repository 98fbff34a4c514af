//! LMDB implementation of WalletStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use stakeindex_store::wallet::{WalletRecord, WalletStore};
use stakeindex_store::StoreError;
use stakeindex_types::WalletAddress;

use crate::LmdbError;

pub struct LmdbWalletStore {
    pub(crate) env: Arc<Env>,
    pub(crate) wallets_db: Database<Bytes, Bytes>,
}

impl WalletStore for LmdbWalletStore {
    fn get_wallet(&self, address: &WalletAddress) -> Result<Option<WalletRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .wallets_db
            .get(&rtxn, address.as_bytes().as_slice())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let record = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn put_wallet(&self, record: &WalletRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.wallets_db
            .put(&mut wtxn, record.address.as_bytes().as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn wallet_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.wallets_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use stakeindex_types::TokenAmount;

    fn open_env(dir: &std::path::Path) -> LmdbEnvironment {
        LmdbEnvironment::open(dir, 10 * 1024 * 1024).unwrap()
    }

    #[test]
    fn put_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let env = open_env(dir.path());
        let store = env.wallet_store();

        let addr = WalletAddress::new([3; 20]);
        assert!(store.get_wallet(&addr).unwrap().is_none());

        let mut record = WalletRecord::empty(addr);
        record.total_staked = TokenAmount::new(1234);
        store.put_wallet(&record).unwrap();

        let loaded = store.get_wallet(&addr).unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(store.wallet_count().unwrap(), 1);
    }

    #[test]
    fn put_is_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let env = open_env(dir.path());
        let store = env.wallet_store();

        let addr = WalletAddress::new([4; 20]);
        let mut record = WalletRecord::empty(addr);
        store.put_wallet(&record).unwrap();
        record.total_staked = TokenAmount::new(99);
        store.put_wallet(&record).unwrap();

        assert_eq!(store.wallet_count().unwrap(), 1);
        assert_eq!(
            store.get_wallet(&addr).unwrap().unwrap().total_staked,
            TokenAmount::new(99)
        );
    }
}
