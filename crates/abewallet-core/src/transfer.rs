//! transfer pipeline: resolve -> convert -> ensure unlocked -> submit
//!
//! A run either completes every step or sends nothing. There are no
//! retries; a failed transfer is re-run from the start by the caller.

use crate::address::{abbreviate, classify, AddressKind};
use crate::error::{Result, WalletError};
use crate::registry::{AddressConverter, NameRegistry};
use crate::rpc::{Balances, WalletRpc};
use crate::session::{unlock_wallet, WalletSession};
use crate::units;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// one output of `sendtoaddressesabe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// long-form destination
    pub address: String,
    /// neutrinos
    pub amount: u64,
}

impl TransferRequest {
    /// `address` must be long form. A zero `amount` is rejected as
    /// `Validation`, so inputs that round below one neutrino never reach
    /// the daemon.
    pub fn new(address: String, amount: u64) -> Result<Self> {
        if classify(&address) != AddressKind::Long {
            return Err(WalletError::Format(format!(
                "transfer destination {} is not a long address",
                abbreviate(&address)
            )));
        }
        if amount == 0 {
            return Err(WalletError::Validation("amount rounds to zero neutrinos".into()));
        }
        Ok(Self { address, amount })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Idle,
    ResolvingAddress,
    ConvertingAmount,
    CheckingLock,
    Unlocking,
    Submitting,
    Done,
    Failed,
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferState::Idle => "idle",
            TransferState::ResolvingAddress => "resolving address",
            TransferState::ConvertingAmount => "converting amount",
            TransferState::CheckingLock => "checking lock",
            TransferState::Unlocking => "unlocking",
            TransferState::Submitting => "submitting",
            TransferState::Done => "done",
            TransferState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// the stage a transfer stopped at and why
#[derive(Debug, Error)]
#[error("transfer failed while {stage}: {error}")]
pub struct TransferFailure {
    pub stage: TransferState,
    #[source]
    pub error: WalletError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub request: TransferRequest,
    pub txid: Option<String>,
    /// whether this run had to unlock the wallet
    pub unlocked: bool,
    /// balances after submission, `None` if the refresh failed
    pub balances: Option<Balances>,
}

/// mutual exclusion between transfers and the background lock poll
#[derive(Clone, Default)]
pub struct SingleFlight(Arc<Mutex<()>>);

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> OwnedMutexGuard<()> {
        self.0.clone().lock_owned().await
    }

    pub fn try_acquire(&self) -> Option<OwnedMutexGuard<()>> {
        self.0.clone().try_lock_owned().ok()
    }
}

pub struct TransferCoordinator<R: ?Sized, N: ?Sized> {
    rpc: Arc<R>,
    converter: AddressConverter<N>,
    guard: SingleFlight,
}

fn failed(stage: TransferState) -> impl FnOnce(WalletError) -> TransferFailure {
    move |error| {
        warn!("transfer failed while {}: {}", stage, error);
        TransferFailure { stage, error }
    }
}

impl<R, N> TransferCoordinator<R, N>
where
    R: WalletRpc + ?Sized,
    N: NameRegistry + ?Sized,
{
    pub fn new(rpc: Arc<R>, converter: AddressConverter<N>, guard: SingleFlight) -> Self {
        Self { rpc, converter, guard }
    }

    pub fn guard(&self) -> SingleFlight {
        self.guard.clone()
    }

    /// send `amount` ABE to `recipient` (long or short form)
    pub async fn transfer(
        &self,
        session: &WalletSession,
        recipient: &str,
        amount: &str,
    ) -> std::result::Result<TransferReceipt, TransferFailure> {
        let recipient = recipient.trim();
        info!("transfer of {} ABE to {}", amount.trim(), abbreviate(recipient));

        debug!("state: {}", TransferState::ResolvingAddress);
        let address = self
            .converter
            .to_long(recipient)
            .await
            .map_err(failed(TransferState::ResolvingAddress))?;

        debug!("state: {}", TransferState::ConvertingAmount);
        let request = units::parse_base_units(amount)
            .and_then(|neutrinos| TransferRequest::new(address, neutrinos))
            .map_err(failed(TransferState::ConvertingAmount))?;

        // held until submission resolves so the lock poll cannot interleave
        let flight = self.guard.acquire().await;

        debug!("state: {}", TransferState::CheckingLock);
        let locked = self
            .rpc
            .wallet_is_locked()
            .await
            .map_err(failed(TransferState::CheckingLock))?;

        if locked {
            debug!("state: {}", TransferState::Unlocking);
            let credential = session.get().await.ok_or_else(|| {
                failed(TransferState::Unlocking)(WalletError::Lock(
                    "wallet is locked and no credential is cached".into(),
                ))
            })?;
            unlock_wallet(self.rpc.as_ref(), &credential)
                .await
                .map_err(failed(TransferState::Unlocking))?;
        }

        debug!("state: {}", TransferState::Submitting);
        let receipt = self
            .rpc
            .send_to_addresses(std::slice::from_ref(&request))
            .await
            .map_err(failed(TransferState::Submitting))?;
        drop(flight);

        info!(
            "transfer submitted: {} neutrinos, txid {}",
            request.amount,
            receipt.txid.as_deref().unwrap_or("<none>")
        );

        let balances = match self.rpc.get_balances().await {
            Ok(b) => Some(b),
            Err(e) => {
                warn!("balance refresh after transfer failed: {}", e);
                None
            }
        };

        Ok(TransferReceipt {
            request,
            txid: receipt.txid,
            unlocked: locked,
            balances,
        })
    }
}
