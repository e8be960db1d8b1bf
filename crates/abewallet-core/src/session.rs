//! session-scoped unlock credential
//!
//! Holds the wallet password for the lifetime of the process so the
//! transfer flow can re-unlock the daemon when it reports locked. The
//! daemon tracks the authoritative expiry; the client never refreshes or
//! re-validates the credential on its own.

use crate::constants::UNLOCK_TIMEOUT_SECS;
use crate::error::{Result, WalletError};
use crate::rpc::WalletRpc;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// wallet unlock password, wiped on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// single credential slot, last write wins
///
/// Clones share the same slot.
#[derive(Clone, Default)]
pub struct WalletSession {
    slot: Arc<RwLock<Option<Credential>>>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// validity window the client asks for on every unlock
    pub fn assumed_expiry(&self) -> Duration {
        Duration::from_secs(UNLOCK_TIMEOUT_SECS)
    }

    pub async fn store(&self, credential: Credential) {
        *self.slot.write().await = Some(credential);
        debug!("session credential stored");
    }

    pub async fn get(&self) -> Option<Credential> {
        self.slot.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.slot.read().await.is_some()
    }

    pub async fn clear(&self) {
        // dropping the old value zeroizes it
        self.slot.write().await.take();
        debug!("session credential cleared");
    }

    /// unlock the daemon with `password` and keep it on success
    pub async fn authenticate<R>(&self, rpc: &R, password: Credential) -> Result<()>
    where
        R: WalletRpc + ?Sized,
    {
        unlock_wallet(rpc, &password).await?;
        self.store(password).await;
        info!("wallet unlocked, credential cached for this session");
        Ok(())
    }
}

/// `walletunlock` with the fixed validity window; any refusal is a lock error
pub(crate) async fn unlock_wallet<R>(rpc: &R, credential: &Credential) -> Result<()>
where
    R: WalletRpc + ?Sized,
{
    match rpc.wallet_unlock(credential, UNLOCK_TIMEOUT_SECS).await {
        Ok(Some(false)) => Err(WalletError::Lock("daemon rejected the credential".into())),
        Ok(_) => Ok(()),
        Err(e) => Err(WalletError::Lock(e.to_string())),
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession").finish_non_exhaustive()
    }
}
