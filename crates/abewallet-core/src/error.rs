//! error types for abewallet

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    /// address matches none of the known encodings
    #[error("invalid address format: {0}")]
    Format(String),

    /// naming registry unreachable, rejected the call or returned a bad payload
    #[error("address conversion failed: {0}")]
    Conversion(String),

    #[error("invalid amount: {0}")]
    Validation(String),

    #[error("wallet unlock failed: {0}")]
    Lock(String),

    /// daemon answered with an error envelope
    #[error("wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    /// daemon result did not match the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WalletError>;

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        WalletError::Transport(err.to_string())
    }
}
