//! Abelian network constants
//!
//! Address encodings and accounting facts the daemon and the naming
//! registry agree on. These never change at runtime.

/// long (full) address length in hex characters
pub const LONG_ADDRESS_LEN: usize = 462;

/// legacy short address length in hex characters
pub const SHORT_LEGACY_LEN: usize = 134;

/// MLP short address length in hex characters
pub const SHORT_MLP_LEN: usize = 136;

/// legacy short address tag
pub const SHORT_LEGACY_PREFIX: &str = "abe3";

/// MLP short address network tag (mainnet)
pub const MAINNET_PREFIX: &str = "abe010";

/// MLP short address network tag (testnet)
pub const TESTNET_PREFIX: &str = "abe012";

/// neutrinos per ABE
pub const NEUTRINOS_PER_ABE: u64 = 10_000_000;

/// decimal places of one ABE expressed in neutrinos
pub const ABE_DECIMALS: u32 = 7;

/// validity window requested from `walletunlock`, in seconds
pub const UNLOCK_TIMEOUT_SECS: u64 = 600;

/// `listunspent` confirmation bounds
pub const UNSPENT_MIN_CONF: u32 = 1;
pub const UNSPENT_MAX_CONF: u32 = 9_999_999;

/// `getbalance` minimum confirmations
pub const BALANCE_MIN_CONF: u32 = 1;

/// default daemon RPC endpoint
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:18665";

/// default naming registry (testnet ANS)
pub const DEFAULT_REGISTRY_URL: &str = "https://testnet-ans.abelian.info";

/// default cap on parallel `getrawtransaction` look-ups
pub const DEFAULT_HISTORY_CONCURRENCY: usize = 8;

/// default lock poll interval, in seconds
pub const DEFAULT_LOCK_POLL_SECS: u64 = 10;

/// default HTTP timeout for both backends, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
