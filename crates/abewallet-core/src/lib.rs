//! abewallet core
//!
//! Client logic for a remote Abelian wallet daemon:
//! - address classification and long/short conversion via ANS
//! - ABE <-> neutrino amount conversion
//! - session-scoped unlock credential
//! - typed JSON-RPC gateway to abewallet
//! - transfer pipeline with a single-flight guard shared with the lock poll
//! - bounded-concurrency transaction history

pub mod address;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod monitor;
pub mod registry;
pub mod rpc;
pub mod session;
pub mod transfer;
pub mod units;

pub use address::{classify, AddressKind, Network};
pub use config::{RegistryConfig, RpcConfig, WalletConfig};
pub use error::{Result, WalletError};
pub use history::{TxHistory, TxStatus, TxSummary};
pub use monitor::{LockMonitor, LockStatus};
pub use registry::{AddressConverter, AnsClient, NameRegistry};
pub use rpc::{AbewalletClient, Balances, WalletRpc};
pub use session::{Credential, WalletSession};
pub use transfer::{
    SingleFlight, TransferCoordinator, TransferFailure, TransferReceipt, TransferRequest,
    TransferState,
};
