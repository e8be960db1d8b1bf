//! abewallet JSON-RPC client

use crate::config::RpcConfig;
use crate::constants::{BALANCE_MIN_CONF, UNSPENT_MAX_CONF, UNSPENT_MIN_CONF};
use crate::error::{Result, WalletError};
use crate::session::Credential;
use crate::transfer::TransferRequest;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

/// typed view of the wallet daemon, one method per RPC
#[async_trait]
pub trait WalletRpc: Send + Sync {
    async fn get_wallet_info(&self) -> Result<WalletInfo>;

    async fn get_balances(&self) -> Result<Balances>;

    async fn wallet_is_locked(&self) -> Result<bool>;

    /// `Some(false)` means the daemon refused; `None` and `Some(true)` mean unlocked
    async fn wallet_unlock(
        &self,
        password: &Credential,
        timeout_secs: u64,
    ) -> Result<Option<bool>>;

    async fn list_unconfirmed_txs(&self) -> Result<Vec<String>>;

    async fn list_confirmed_txs(&self) -> Result<Vec<String>>;

    async fn generate_address(&self) -> Result<Vec<GeneratedAddress>>;

    async fn list_aut_coins(&self) -> Result<Value>;

    async fn list_unspent(&self, address: &str) -> Result<Vec<UnspentOutput>>;

    async fn list_address_transactions(&self, addresses: &[String]) -> Result<Value>;

    async fn get_balance(&self) -> Result<f64>;

    async fn send_to_addresses(&self, outputs: &[TransferRequest]) -> Result<SubmitReceipt>;

    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransaction>;

    /// generate one new address and return it
    async fn new_address(&self) -> Result<String> {
        self.generate_address()
            .await?
            .into_iter()
            .next()
            .map(|g| g.addr)
            .ok_or_else(|| WalletError::Decode("generateaddressabe: empty result".into()))
    }
}

#[derive(Clone)]
pub struct AbewalletClient {
    url: String,
    username: String,
    password: Credential,
    client: Client,
}

impl AbewalletClient {
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        Ok(Self {
            url: config.url.clone(),
            username: config.username.clone(),
            password: Credential::new(config.password.clone()),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let payload = json!({
            "jsonrpc": "1.0",
            "method": method,
            "params": params,
            "id": "1",
        });
        debug!("rpc {}", method);

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(self.password.expose()))
            .json(&payload)
            .send()
            .await
            .map_err(|e| WalletError::Transport(format!("{}: {}", method, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WalletError::Transport(format!("{}: {}", method, e)))?;

        // some daemons send error envelopes with a 500, keep the rpc error when present
        let envelope = serde_json::from_str::<RpcResponse>(&body);
        if !status.is_success() {
            if let Ok(RpcResponse { error: Some(error), .. }) = envelope {
                return Err(error.into());
            }
            return Err(WalletError::Transport(format!("{}: HTTP status {}", method, status)));
        }

        let envelope = envelope.map_err(|e| WalletError::Decode(format!("{}: {}", method, e)))?;
        decode_result(method, envelope)
    }
}

fn decode_result<T: DeserializeOwned>(method: &str, envelope: RpcResponse) -> Result<T> {
    if let Some(error) = envelope.error {
        return Err(error.into());
    }
    let result = envelope.result.unwrap_or(Value::Null);
    serde_json::from_value(result).map_err(|e| WalletError::Decode(format!("{}: {}", method, e)))
}

#[async_trait]
impl WalletRpc for AbewalletClient {
    async fn get_wallet_info(&self) -> Result<WalletInfo> {
        self.call("getwalletinfo", vec![]).await
    }

    async fn get_balances(&self) -> Result<Balances> {
        self.call("getbalancesabe", vec![]).await
    }

    async fn wallet_is_locked(&self) -> Result<bool> {
        self.call("walletislocked", vec![]).await
    }

    async fn wallet_unlock(
        &self,
        password: &Credential,
        timeout_secs: u64,
    ) -> Result<Option<bool>> {
        self.call("walletunlock", vec![json!(password.expose()), json!(timeout_secs)])
            .await
    }

    async fn list_unconfirmed_txs(&self) -> Result<Vec<String>> {
        let ids: Option<Vec<String>> = self.call("listunconfirmedtxs", vec![]).await?;
        Ok(ids.unwrap_or_default())
    }

    async fn list_confirmed_txs(&self) -> Result<Vec<String>> {
        let ids: Option<Vec<String>> = self.call("listconfirmedtxs", vec![]).await?;
        Ok(ids.unwrap_or_default())
    }

    async fn generate_address(&self) -> Result<Vec<GeneratedAddress>> {
        self.call("generateaddressabe", vec![json!(1)]).await
    }

    async fn list_aut_coins(&self) -> Result<Value> {
        self.call("listautcoins", vec![]).await
    }

    async fn list_unspent(&self, address: &str) -> Result<Vec<UnspentOutput>> {
        self.call(
            "listunspent",
            vec![json!(UNSPENT_MIN_CONF), json!(UNSPENT_MAX_CONF), json!([address])],
        )
        .await
    }

    async fn list_address_transactions(&self, addresses: &[String]) -> Result<Value> {
        self.call("listaddresstransactions", vec![json!(addresses)]).await
    }

    async fn get_balance(&self) -> Result<f64> {
        self.call("getbalance", vec![json!(""), json!(BALANCE_MIN_CONF)]).await
    }

    async fn send_to_addresses(&self, outputs: &[TransferRequest]) -> Result<SubmitReceipt> {
        let result: Value = self.call("sendtoaddressesabe", vec![json!(outputs)]).await?;
        Ok(SubmitReceipt::from_result(result))
    }

    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransaction> {
        self.call("getrawtransaction", vec![json!(txid), json!(1)]).await
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl From<RpcErrorObject> for WalletError {
    fn from(err: RpcErrorObject) -> Self {
        WalletError::Rpc {
            code: err.code,
            message: err.message,
        }
    }
}

/// `getwalletinfo`, fields vary across daemon versions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletInfo(pub Map<String, Value>);

impl WalletInfo {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// `getbalancesabe`, in ABE
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    #[serde(default)]
    pub total_balance: f64,
    #[serde(default)]
    pub spendable_balance: f64,
    #[serde(default)]
    pub unconfirmed_balance: f64,
}

/// one entry of `generateaddressabe`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAddress {
    pub addr: String,
}

/// one entry of `listunspent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: Option<String>,
    pub address: Option<String>,
    pub amount: Option<f64>,
    pub confirmations: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// verbose `getrawtransaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: String,
    /// unix timestamp, absent for mempool entries
    pub time: Option<u64>,
    pub fee: Option<f64>,
    /// only present once mined
    pub blockhash: Option<String>,
    pub confirmations: Option<u64>,
}

/// result of `sendtoaddressesabe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub txid: Option<String>,
}

impl SubmitReceipt {
    fn from_result(result: Value) -> Self {
        let txid = match result {
            Value::String(s) => Some(s),
            Value::Object(map) => map.get("txid").and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
        Self { txid }
    }
}
