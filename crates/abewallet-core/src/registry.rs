//! long <-> short address conversion via the Abelian naming service (ANS)

use crate::address::{abbreviate, classify, AddressKind};
use crate::config::RegistryConfig;
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// naming registry mapping long addresses to short aliases
#[async_trait]
pub trait NameRegistry: Send + Sync {
    /// register a long address, returns its short alias
    async fn register(&self, long_address: &str) -> Result<String>;

    /// look up the long address behind a short alias
    async fn resolve(&self, short_address: &str) -> Result<String>;
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    abel_address: &'a str,
}

#[derive(Deserialize)]
struct RegisterResponse {
    payload: RegisterPayload,
}

#[derive(Deserialize)]
struct RegisterPayload {
    short_address: String,
}

#[derive(Deserialize)]
struct ResolveResponse {
    payload: String,
}

/// HTTP client for the ANS v1 API
#[derive(Clone)]
pub struct AnsClient {
    base_url: String,
    client: Client,
}

impl AnsClient {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/ans/v1/{}", self.base_url, path)
    }
}

fn conversion(context: &str, err: impl std::fmt::Display) -> WalletError {
    WalletError::Conversion(format!("{}: {}", context, err))
}

#[async_trait]
impl NameRegistry for AnsClient {
    async fn register(&self, long_address: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("register"))
            .json(&RegisterRequest { abel_address: long_address })
            .send()
            .await
            .map_err(|e| conversion("register", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(conversion("register", format!("HTTP status {}", status)));
        }

        let body: RegisterResponse = response.json().await.map_err(|e| conversion("register", e))?;
        Ok(body.payload.short_address)
    }

    async fn resolve(&self, short_address: &str) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint(short_address))
            .send()
            .await
            .map_err(|e| conversion("resolve", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(conversion("resolve", format!("HTTP status {}", status)));
        }

        let body: ResolveResponse = response.json().await.map_err(|e| conversion("resolve", e))?;
        Ok(body.payload)
    }
}

fn as_conversion(err: WalletError) -> WalletError {
    match err {
        WalletError::Conversion(_) => err,
        other => WalletError::Conversion(other.to_string()),
    }
}

fn invalid(address: &str) -> WalletError {
    WalletError::Format(format!(
        "{} ({} chars) is not a recognized long or short address",
        abbreviate(address),
        address.len()
    ))
}

/// resolves any accepted address form to the one a caller needs
pub struct AddressConverter<N: ?Sized> {
    registry: Arc<N>,
}

impl<N: ?Sized> Clone for AddressConverter<N> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<N: NameRegistry + ?Sized> AddressConverter<N> {
    pub fn new(registry: Arc<N>) -> Self {
        Self { registry }
    }

    /// long form, resolving short aliases through the registry
    pub async fn to_long(&self, address: &str) -> Result<String> {
        match classify(address) {
            AddressKind::Long => Ok(address.to_string()),
            AddressKind::ShortLegacy | AddressKind::ShortMlp => {
                let long = self.registry.resolve(address).await.map_err(as_conversion)?;
                if classify(&long) != AddressKind::Long {
                    return Err(WalletError::Conversion(format!(
                        "registry returned a malformed long address for {}",
                        abbreviate(address)
                    )));
                }
                debug!("resolved {} -> {}", abbreviate(address), abbreviate(&long));
                Ok(long)
            }
            AddressKind::Invalid => Err(invalid(address)),
        }
    }

    /// short form, registering long addresses with the registry
    ///
    /// The registry's answer is taken as authoritative on every call.
    pub async fn to_short(&self, address: &str) -> Result<String> {
        match classify(address) {
            AddressKind::ShortLegacy | AddressKind::ShortMlp => Ok(address.to_string()),
            AddressKind::Long => {
                let short = self.registry.register(address).await.map_err(as_conversion)?;
                if !classify(&short).is_short() {
                    return Err(WalletError::Conversion(format!(
                        "registry returned a malformed short address for {}",
                        abbreviate(address)
                    )));
                }
                debug!("registered {} -> {}", abbreviate(address), abbreviate(&short));
                Ok(short)
            }
            AddressKind::Invalid => Err(invalid(address)),
        }
    }
}
