//! in-memory daemon and registry stubs with call counters

#![allow(dead_code)]

use abewallet_core::rpc::{
    GeneratedAddress, RawTransaction, SubmitReceipt, UnspentOutput, WalletInfo,
};
use abewallet_core::{
    Balances, Credential, NameRegistry, Result, TransferRequest, WalletError, WalletRpc,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn long_address(seed: u8) -> String {
    format!("{:02x}", seed).repeat(231)
}

pub fn short_for(long: &str) -> String {
    format!("abe012{}", &long[..130])
}

pub struct StubWallet {
    pub locked: AtomicBool,
    pub unlock_result: Mutex<Result<Option<bool>>>,
    pub submit_result: Mutex<Result<SubmitReceipt>>,
    pub balances_result: Mutex<Result<Balances>>,
    pub transactions: Mutex<HashMap<String, RawTransaction>>,
    pub detail_delay: Duration,
    /// when set, `send_to_addresses` parks until notified
    submit_gate: Option<Arc<Notify>>,
    pub submit_entered: Notify,

    pub lock_checks: AtomicUsize,
    pub unlock_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub unlock_passwords: Mutex<Vec<String>>,
    pub submitted: Mutex<Vec<TransferRequest>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl StubWallet {
    pub fn new(locked: bool) -> Self {
        Self {
            locked: AtomicBool::new(locked),
            unlock_result: Mutex::new(Ok(None)),
            submit_result: Mutex::new(Ok(SubmitReceipt { txid: Some("tx-1".into()) })),
            balances_result: Mutex::new(Ok(Balances {
                total_balance: 5.0,
                spendable_balance: 4.0,
                unconfirmed_balance: 1.0,
            })),
            transactions: Mutex::new(HashMap::new()),
            detail_delay: Duration::from_millis(5),
            submit_gate: None,
            submit_entered: Notify::new(),
            lock_checks: AtomicUsize::new(0),
            unlock_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            unlock_passwords: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_unlock_result(self, result: Result<Option<bool>>) -> Self {
        *self.unlock_result.lock().unwrap() = result;
        self
    }

    pub fn with_submit_result(self, result: Result<SubmitReceipt>) -> Self {
        *self.submit_result.lock().unwrap() = result;
        self
    }

    pub fn with_balances_result(self, result: Result<Balances>) -> Self {
        *self.balances_result.lock().unwrap() = result;
        self
    }

    pub fn with_submit_gate(mut self, gate: Arc<Notify>) -> Self {
        self.submit_gate = Some(gate);
        self
    }

    pub fn add_transaction(&self, txid: &str, time: u64, blockhash: Option<&str>) {
        self.transactions.lock().unwrap().insert(
            txid.to_string(),
            RawTransaction {
                txid: txid.to_string(),
                time: Some(time),
                fee: Some(0.001),
                blockhash: blockhash.map(str::to_string),
                confirmations: None,
            },
        );
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletRpc for StubWallet {
    async fn get_wallet_info(&self) -> Result<WalletInfo> {
        let map = json!({"version": 1}).as_object().cloned().unwrap_or_default();
        Ok(WalletInfo(map))
    }

    async fn get_balances(&self) -> Result<Balances> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balances_result.lock().unwrap().clone()
    }

    async fn wallet_is_locked(&self) -> Result<bool> {
        self.lock_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.locked.load(Ordering::SeqCst))
    }

    async fn wallet_unlock(
        &self,
        password: &Credential,
        timeout_secs: u64,
    ) -> Result<Option<bool>> {
        assert_eq!(timeout_secs, 600);
        self.unlock_calls.fetch_add(1, Ordering::SeqCst);
        self.unlock_passwords.lock().unwrap().push(password.expose().to_string());
        let result = self.unlock_result.lock().unwrap().clone();
        if matches!(result, Ok(None) | Ok(Some(true))) {
            self.locked.store(false, Ordering::SeqCst);
        }
        result
    }

    async fn list_unconfirmed_txs(&self) -> Result<Vec<String>> {
        Ok(vec!["pending-1".into()])
    }

    async fn list_confirmed_txs(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.transactions.lock().unwrap().keys().cloned().collect();
        ids.push("missing".into());
        ids.sort();
        Ok(ids)
    }

    async fn generate_address(&self) -> Result<Vec<GeneratedAddress>> {
        Ok(vec![GeneratedAddress { addr: long_address(0xab) }])
    }

    async fn list_aut_coins(&self) -> Result<Value> {
        Ok(json!([]))
    }

    async fn list_unspent(&self, _address: &str) -> Result<Vec<UnspentOutput>> {
        Ok(vec![])
    }

    async fn list_address_transactions(&self, _addresses: &[String]) -> Result<Value> {
        Ok(json!([]))
    }

    async fn get_balance(&self) -> Result<f64> {
        Ok(5.0)
    }

    async fn send_to_addresses(&self, outputs: &[TransferRequest]) -> Result<SubmitReceipt> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.submit_gate {
            self.submit_entered.notify_one();
            gate.notified().await;
        }
        self.submitted.lock().unwrap().extend_from_slice(outputs);
        self.submit_result.lock().unwrap().clone()
    }

    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransaction> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.detail_delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.transactions
            .lock()
            .unwrap()
            .get(txid)
            .cloned()
            .ok_or(WalletError::Rpc {
                code: -5,
                message: "No information available about transaction".into(),
            })
    }
}

/// deterministic registry: short = testnet tag + first 130 chars of the long form
#[derive(Default)]
pub struct StubRegistry {
    pub known: Mutex<HashMap<String, String>>,
    pub register_calls: AtomicUsize,
    pub resolve_calls: AtomicUsize,
    pub malformed: AtomicBool,
    pub unreachable: AtomicBool,
}

impl StubRegistry {
    pub fn calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst) + self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn insert(&self, short: &str, long: &str) {
        self.known.lock().unwrap().insert(short.to_string(), long.to_string());
    }
}

#[async_trait]
impl NameRegistry for StubRegistry {
    async fn register(&self, long_address: &str) -> Result<String> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(WalletError::Transport("connection refused".into()));
        }
        if self.malformed.load(Ordering::SeqCst) {
            return Ok("not-an-address".into());
        }
        let short = short_for(long_address);
        self.insert(&short, long_address);
        Ok(short)
    }

    async fn resolve(&self, short_address: &str) -> Result<String> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(WalletError::Transport("connection refused".into()));
        }
        if self.malformed.load(Ordering::SeqCst) {
            return Ok("abe3".into());
        }
        self.known
            .lock()
            .unwrap()
            .get(short_address)
            .cloned()
            .ok_or_else(|| WalletError::Conversion("unknown short address".into()))
    }
}
