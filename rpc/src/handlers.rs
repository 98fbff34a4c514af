//! RPC request handlers and response shapes.
//!
//! Amounts are serialized as decimal strings: JSON numbers lose precision
//! past 2^53 and these values are raw token units.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use stakeindex_store::stake::StakeRecord;
use stakeindex_store::wallet::WalletRecord;
use stakeindex_types::WalletAddress;

use crate::error::RpcError;
use crate::pagination::{next_offset, PaginationMeta, PaginationParams};
use crate::server::ReadState;

// ── Wallet ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub address: String,
    pub total_staked: String,
    pub klima_allocation: String,
    pub klimax_allocation: String,
}

impl From<WalletRecord> for WalletResponse {
    fn from(record: WalletRecord) -> Self {
        Self {
            address: record.address.to_string(),
            total_staked: record.total_staked.to_string(),
            klima_allocation: record.klima_allocation.to_string(),
            klimax_allocation: record.klimax_allocation.to_string(),
        }
    }
}

fn parse_address(raw: &str) -> Result<WalletAddress, RpcError> {
    WalletAddress::parse(raw).map_err(|e| RpcError::InvalidRequest(e.to_string()))
}

pub async fn get_wallet(
    State(state): State<Arc<ReadState>>,
    Path(address): Path<String>,
) -> Result<Json<WalletResponse>, RpcError> {
    let address = parse_address(&address)?;
    match state.wallets.get_wallet(&address)? {
        Some(record) => Ok(Json(record.into())),
        None => Err(RpcError::WalletNotFound(address.to_string())),
    }
}

// ── Stakes ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StakeSummary {
    pub id: String,
    pub amount: String,
    pub multiplier: u64,
    pub start_timestamp: u64,
}

impl From<StakeRecord> for StakeSummary {
    fn from(record: StakeRecord) -> Self {
        Self {
            id: record.id.to_string(),
            amount: record.amount.to_string(),
            multiplier: record.multiplier,
            start_timestamp: record.start_timestamp.as_secs(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StakesResponse {
    pub stakes: Vec<StakeSummary>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

pub async fn get_wallet_stakes(
    State(state): State<Arc<ReadState>>,
    Path(address): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<StakesResponse>, RpcError> {
    let address = parse_address(&address)?;
    let offset = params.offset();
    let count = params.effective_count();

    let page = state
        .stakes
        .stakes_for_wallet_paged(&address, offset, count as usize)?;
    let pagination = PaginationMeta {
        next_offset: next_offset(offset, page.len(), count),
    };
    Ok(Json(StakesResponse {
        stakes: page.into_iter().map(StakeSummary::from).collect(),
        pagination,
    }))
}

// ── Summary ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub wallet_count: u64,
    pub stake_count: u64,
}

pub async fn get_summary(
    State(state): State<Arc<ReadState>>,
) -> Result<Json<SummaryResponse>, RpcError> {
    Ok(Json(SummaryResponse {
        wallet_count: state.wallets.wallet_count()?,
        stake_count: state.stakes.stake_count()?,
    }))
}
