//! HTTP read API for the staking indexer.
//!
//! A thin query surface over the derived tables, consumed by the front-end:
//! - wallet aggregate (total staked, claimed allocations)
//! - a wallet's stakes, offset-paginated
//! - table summary counts
//!
//! The API never writes; replay owns all mutations.

pub mod error;
pub mod handlers;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use server::{ReadState, RpcServer};
