//! background wallet lock poll
//!
//! Polls `walletislocked` on a fixed interval and publishes changes on a
//! watch channel. Each poll takes the same [`SingleFlight`] guard as the
//! transfer pipeline; a tick that finds a transfer in flight is skipped.

use crate::rpc::WalletRpc;
use crate::transfer::SingleFlight;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Unknown,
    Locked,
    Unlocked,
}

pub struct LockMonitor<R: ?Sized> {
    rpc: Arc<R>,
    guard: SingleFlight,
    interval: Duration,
}

impl<R: WalletRpc + ?Sized + 'static> LockMonitor<R> {
    pub fn new(rpc: Arc<R>, guard: SingleFlight, interval: Duration) -> Self {
        Self { rpc, guard, interval }
    }

    /// one poll; `None` if skipped or the daemon could not be reached
    pub async fn poll_once(&self) -> Option<LockStatus> {
        let Some(_flight) = self.guard.try_acquire() else {
            debug!("transfer in flight, skipping lock poll");
            return None;
        };

        match self.rpc.wallet_is_locked().await {
            Ok(true) => Some(LockStatus::Locked),
            Ok(false) => Some(LockStatus::Unlocked),
            Err(e) => {
                warn!("lock poll failed: {}", e);
                None
            }
        }
    }

    /// run until every receiver is dropped
    pub fn spawn(self) -> (JoinHandle<()>, watch::Receiver<LockStatus>) {
        let (tx, rx) = watch::channel(LockStatus::Unknown);

        let handle = tokio::spawn(async move {
            info!("starting lock monitor ({}s interval)", self.interval.as_secs());
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }

                if let Some(status) = self.poll_once().await {
                    tx.send_if_modified(|current| {
                        if *current == status {
                            return false;
                        }
                        info!("wallet lock status: {:?} -> {:?}", *current, status);
                        *current = status;
                        true
                    });
                }
            }

            debug!("lock monitor stopped");
        });

        (handle, rx)
    }
}
