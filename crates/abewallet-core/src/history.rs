//! transaction history listing

use crate::error::Result;
use crate::rpc::{RawTransaction, WalletRpc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Confirmed,
    Unknown,
}

/// a transaction row as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxSummary {
    pub txid: String,
    pub timestamp: u64, // unix seconds
    pub fee: f64,       // ABE
    pub status: TxStatus,
}

impl From<RawTransaction> for TxSummary {
    fn from(tx: RawTransaction) -> Self {
        let status = if tx.blockhash.as_deref().is_some_and(|h| !h.is_empty()) {
            TxStatus::Confirmed
        } else {
            TxStatus::Unknown
        };
        Self {
            txid: tx.txid,
            timestamp: tx.time.unwrap_or(0),
            fee: tx.fee.unwrap_or(0.0),
            status,
        }
    }
}

pub struct TxHistory<R: ?Sized> {
    rpc: Arc<R>,
    concurrency: usize,
}

impl<R: WalletRpc + ?Sized> TxHistory<R> {
    pub fn new(rpc: Arc<R>, concurrency: usize) -> Self {
        Self {
            rpc,
            concurrency: concurrency.max(1),
        }
    }

    /// confirmed transactions, newest first
    ///
    /// Details are fetched at most `concurrency` at a time. A failed
    /// look-up drops that row instead of failing the listing.
    pub async fn confirmed(&self) -> Result<Vec<TxSummary>> {
        let txids = self.rpc.list_confirmed_txs().await?;
        let total = txids.len();
        let rpc = &self.rpc;

        let fetched: Vec<Option<TxSummary>> = stream::iter(txids)
            .map(|txid| async move {
                match rpc.get_raw_transaction(&txid).await {
                    Ok(tx) => Some(TxSummary::from(tx)),
                    Err(e) => {
                        warn!("failed to fetch transaction {}: {}", txid, e);
                        None
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summaries: Vec<TxSummary> = fetched.into_iter().flatten().collect();
        // buffer_unordered doesn't preserve order
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.txid.cmp(&b.txid)));

        info!("loaded {}/{} confirmed transactions", summaries.len(), total);
        Ok(summaries)
    }

    /// unconfirmed transaction ids
    pub async fn pending(&self) -> Result<Vec<String>> {
        self.rpc.list_unconfirmed_txs().await
    }
}
