//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::meta::LmdbMetaStore;
use crate::stake::LmdbStakeStore;
use crate::wallet::LmdbWalletStore;
use crate::LmdbError;

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    wallets_db: Database<Bytes, Bytes>,
    stakes_db: Database<Bytes, Bytes>,
    /// Composite key `wallet(20) ++ stake_id(32)` → empty; prefix scans give
    /// all stakes of a wallet.
    stake_index_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|e| LmdbError::Heed(e.to_string()))?;
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };
        let mut wtxn = env.write_txn()?;
        let wallets_db = env.create_database(&mut wtxn, Some("wallets"))?;
        let stakes_db = env.create_database(&mut wtxn, Some("stakes"))?;
        let stake_index_db = env.create_database(&mut wtxn, Some("stake_index"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;
        Ok(Self {
            env: Arc::new(env),
            wallets_db,
            stakes_db,
            stake_index_db,
            meta_db,
        })
    }

    pub fn wallet_store(&self) -> LmdbWalletStore {
        LmdbWalletStore {
            env: Arc::clone(&self.env),
            wallets_db: self.wallets_db,
        }
    }

    pub fn stake_store(&self) -> LmdbStakeStore {
        LmdbStakeStore {
            env: Arc::clone(&self.env),
            stakes_db: self.stakes_db,
            stake_index_db: self.stake_index_db,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }
}
