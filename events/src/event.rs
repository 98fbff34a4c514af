//! The staking event sum type.

use serde::{Deserialize, Serialize};
use stakeindex_types::{Timestamp, TokenAmount, TxHash, WalletAddress};

/// Transaction context attached to every event by the upstream log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    /// Hash of the transaction that emitted the event. Unique per
    /// `StakeCreated` event and reused as the stake id.
    pub transaction_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Position of the log within the block; with `block_number` this gives
    /// every event a total order, used for replay checkpointing.
    pub log_index: u64,
}

impl EventContext {
    /// Position of this event in the chain's total order.
    pub fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}

/// One decoded staking-contract event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StakingEvent {
    /// A new staking position was opened.
    StakeCreated {
        user: WalletAddress,
        amount: TokenAmount,
        multiplier: u64,
        start_timestamp: Timestamp,
    },
    /// Staked balance was burned (e.g. an early-unstake penalty).
    StakeBurned {
        user: WalletAddress,
        burn_amount: TokenAmount,
    },
    /// Terminal claim carrying the contract's authoritative totals.
    StakeClaimed {
        user: WalletAddress,
        total_user_staked: TokenAmount,
        klima_allocation: TokenAmount,
        klimax_allocation: TokenAmount,
    },
}

impl StakingEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            StakingEvent::StakeCreated { .. } => "stake_created",
            StakingEvent::StakeBurned { .. } => "stake_burned",
            StakingEvent::StakeClaimed { .. } => "stake_claimed",
        }
    }

    /// The wallet the event concerns.
    pub fn user(&self) -> &WalletAddress {
        match self {
            StakingEvent::StakeCreated { user, .. }
            | StakingEvent::StakeBurned { user, .. }
            | StakingEvent::StakeClaimed { user, .. } => user,
        }
    }
}

/// An event paired with its transaction context: one line of the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub context: EventContext,
    pub event: StakingEvent,
}
