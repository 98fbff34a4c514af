//! Typed staking events and the event-log codec.
//!
//! Loosely-typed on-chain log parameters are decoded exactly once, at this
//! boundary, into a closed sum type. Everything past this crate works with
//! strongly-typed fields.

pub mod codec;
pub mod event;

pub use codec::{EventLogError, EventLogReader};
pub use event::{EventContext, EventRecord, StakingEvent};
