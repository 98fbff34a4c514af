//! Sequential replay of the event log, with checkpointing.
//!
//! Events are applied strictly in log order, one at a time. After each
//! event's writes are committed, its `(block_number, log_index)` position is
//! recorded in the meta store; a restart skips everything at or before the
//! checkpoint, which is how a partially-written crash is recovered (the
//! interrupted event replays in full).

use crate::error::ReduceError;
use crate::reducer::EventReducer;
use stakeindex_events::{EventLogError, EventRecord, StakingEvent};
use stakeindex_store::meta::MetaStore;
use stakeindex_store::StoreError;
use thiserror::Error;
use tracing::{info, trace};

/// Meta key holding the last fully-applied event position.
pub const CHECKPOINT_KEY: &str = "replay_checkpoint";

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Reduce(#[from] ReduceError),

    #[error(transparent)]
    Log(#[from] EventLogError),
}

impl From<StoreError> for ReplayError {
    fn from(e: StoreError) -> Self {
        ReplayError::Reduce(ReduceError::Store(e))
    }
}

/// Counters from one replay run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: u64,
    pub skipped: u64,
    pub created: u64,
    pub burned: u64,
    pub claimed: u64,
}

fn encode_checkpoint(position: (u64, u64)) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&position.0.to_be_bytes());
    bytes[8..].copy_from_slice(&position.1.to_be_bytes());
    bytes
}

fn decode_checkpoint(bytes: &[u8]) -> Result<(u64, u64), StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::Corruption(format!(
            "replay checkpoint has {} bytes, expected 16",
            bytes.len()
        )));
    }
    let block = u64::from_be_bytes(bytes[..8].try_into().expect("checked length"));
    let log = u64::from_be_bytes(bytes[8..].try_into().expect("checked length"));
    Ok((block, log))
}

/// Load the stored checkpoint, if any.
pub fn load_checkpoint(meta: &dyn MetaStore) -> Result<Option<(u64, u64)>, StoreError> {
    match meta.get_meta(CHECKPOINT_KEY)? {
        Some(bytes) => Ok(Some(decode_checkpoint(&bytes)?)),
        None => Ok(None),
    }
}

/// Replay an already-decoded, in-order sequence of events. No checkpointing.
pub fn replay<I>(reducer: &EventReducer, records: I) -> Result<ReplayStats, ReduceError>
where
    I: IntoIterator<Item = EventRecord>,
{
    match replay_inner(reducer, None, records.into_iter().map(Ok)) {
        Ok(stats) => Ok(stats),
        Err(ReplayError::Reduce(e)) => Err(e),
        Err(ReplayError::Log(_)) => unreachable!("infallible source"),
    }
}

/// Replay a fallible event-log stream, resuming from and maintaining the
/// checkpoint in `meta`.
pub fn replay_log<I>(
    reducer: &EventReducer,
    meta: &dyn MetaStore,
    records: I,
) -> Result<ReplayStats, ReplayError>
where
    I: IntoIterator<Item = Result<EventRecord, EventLogError>>,
{
    replay_inner(reducer, Some(meta), records.into_iter())
}

fn replay_inner<I>(
    reducer: &EventReducer,
    meta: Option<&dyn MetaStore>,
    records: I,
) -> Result<ReplayStats, ReplayError>
where
    I: Iterator<Item = Result<EventRecord, EventLogError>>,
{
    let checkpoint = match meta {
        Some(meta) => load_checkpoint(meta)?,
        None => None,
    };
    if let Some(position) = checkpoint {
        info!(block = position.0, log_index = position.1, "resuming from checkpoint");
    }

    let mut stats = ReplayStats::default();
    for record in records {
        let record = record?;
        let position = record.context.position();
        if let Some(done) = checkpoint {
            if position <= done {
                stats.skipped += 1;
                continue;
            }
        }

        reducer.apply(&record)?;
        trace!(
            kind = record.event.kind(),
            user = %record.event.user(),
            block = position.0,
            log_index = position.1,
            "event applied"
        );
        match &record.event {
            StakingEvent::StakeCreated { .. } => stats.created += 1,
            StakingEvent::StakeBurned { .. } => stats.burned += 1,
            StakingEvent::StakeClaimed { .. } => stats.claimed += 1,
        }
        stats.applied += 1;

        if let Some(meta) = meta {
            meta.put_meta(CHECKPOINT_KEY, &encode_checkpoint(position))?;
        }
    }

    info!(
        applied = stats.applied,
        skipped = stats.skipped,
        created = stats.created,
        burned = stats.burned,
        claimed = stats.claimed,
        "replay complete"
    );
    Ok(stats)
}
