use abewallet_core::address::{abbreviate, classify};
use abewallet_core::constants::DEFAULT_RPC_URL;
use abewallet_core::units::from_base_units;
use abewallet_core::{
    AbewalletClient, AddressConverter, AnsClient, Credential, LockMonitor, RegistryConfig,
    RpcConfig, SingleFlight, TransferCoordinator, TxHistory, WalletConfig, WalletRpc,
    WalletSession,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "abewallet")]
#[command(about = "client for a remote abewallet daemon", long_about = None)]
struct Args {
    /// TOML config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// abewallet RPC endpoint, overrides the config file
    #[arg(long, env = "ABEWALLET_RPC_URL")]
    rpc_url: Option<String>,

    /// abewallet RPC username
    #[arg(long, env = "ABEWALLET_RPC_USER")]
    rpc_user: Option<String>,

    /// abewallet RPC password
    #[arg(long, env = "ABEWALLET_RPC_PASS", hide_env_values = true)]
    rpc_pass: Option<String>,

    /// ANS endpoint, overrides the config file
    #[arg(long)]
    registry_url: Option<String>,

    /// wallet unlock password
    #[arg(long, env = "ABEWALLET_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// daemon wallet info
    Info,
    /// total, spendable and unconfirmed balances
    Balances,
    /// confirmed balance
    Balance,
    /// whether the wallet is locked
    Locked,
    /// unlock the wallet for 600s
    Unlock,
    /// generate a new receiving address
    GenerateAddress {
        /// also print the ANS short alias
        #[arg(long)]
        short: bool,
    },
    /// register a long address and print its short alias
    ToShort { address: String },
    /// resolve a short alias to its long address
    ToLong { address: String },
    /// print the format of an address
    Classify { address: String },
    /// unspent outputs of an address
    Unspent { address: String },
    /// transactions touching the given addresses
    AddressTxs {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// AUT coins held by the wallet
    Autcoins,
    /// confirmed transactions, newest first
    History,
    /// unconfirmed transaction ids
    Pending,
    /// send ABE to a long or short address
    Transfer { recipient: String, amount: String },
    /// poll the lock status and print each change
    Watch,
}

#[derive(Serialize)]
struct TransferOutput {
    txid: Option<String>,
    address: String,
    neutrinos: u64,
    abe: String,
    unlocked: bool,
    spendable_balance: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abewallet=info,abewallet_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match &args.command {
        Command::Classify { address } => {
            let kind = classify(address.trim());
            match kind.network(address.trim()) {
                Some(network) => println!("{} ({:?})", kind, network),
                None => println!("{}", kind),
            }
        }
        Command::ToShort { address } => {
            let converter = converter(&registry_config(&args)?)?;
            println!("{}", converter.to_short(address.trim()).await?);
        }
        Command::ToLong { address } => {
            let converter = converter(&registry_config(&args)?)?;
            println!("{}", converter.to_long(address.trim()).await?);
        }
        command => {
            let config = wallet_config(&args)?;
            run_wallet(config, args.password.as_deref(), command).await?;
        }
    }

    Ok(())
}

/// commands that talk to the daemon
async fn run_wallet(config: WalletConfig, password: Option<&str>, command: &Command) -> Result<()> {
    info!("abewallet RPC: {}", config.rpc.url);
    debug!("ANS: {}", config.registry.url);

    let rpc = Arc::new(AbewalletClient::new(&config.rpc)?);
    let session = WalletSession::new();
    if let Some(password) = password {
        session.store(Credential::new(password)).await;
    }

    match command {
        Command::Info => print_json(&rpc.get_wallet_info().await?)?,
        Command::Balances => print_json(&rpc.get_balances().await?)?,
        Command::Balance => println!("{}", rpc.get_balance().await?),
        Command::Locked => println!("{}", rpc.wallet_is_locked().await?),
        Command::Unlock => {
            let password = session
                .get()
                .await
                .context("unlock needs --password or ABEWALLET_PASSWORD")?;
            session.authenticate(rpc.as_ref(), password).await?;
            println!("unlocked for {}s", session.assumed_expiry().as_secs());
        }
        Command::GenerateAddress { short } => {
            let address = rpc.new_address().await?;
            println!("{}", address);
            if *short {
                let converter = converter(&config.registry)?;
                println!("{}", converter.to_short(&address).await?);
            }
        }
        Command::Unspent { address } => print_json(&rpc.list_unspent(address.trim()).await?)?,
        Command::AddressTxs { addresses } => {
            print_json(&rpc.list_address_transactions(addresses).await?)?
        }
        Command::Autcoins => print_json(&rpc.list_aut_coins().await?)?,
        Command::History => {
            let history = TxHistory::new(rpc.clone(), config.history.concurrency);
            print_json(&history.confirmed().await?)?
        }
        Command::Pending => {
            let history = TxHistory::new(rpc.clone(), config.history.concurrency);
            for txid in history.pending().await? {
                println!("{}", txid);
            }
        }
        Command::Transfer { recipient, amount } => {
            let coordinator = TransferCoordinator::new(
                rpc.clone(),
                converter(&config.registry)?,
                SingleFlight::new(),
            );
            let receipt = coordinator.transfer(&session, recipient, amount).await?;
            print_json(&TransferOutput {
                txid: receipt.txid,
                address: abbreviate(&receipt.request.address),
                neutrinos: receipt.request.amount,
                abe: from_base_units(receipt.request.amount).to_string(),
                unlocked: receipt.unlocked,
                spendable_balance: receipt.balances.map(|b| b.spendable_balance),
            })?
        }
        Command::Watch => watch(rpc, config.monitor.poll_interval()).await?,
        Command::Classify { .. } | Command::ToShort { .. } | Command::ToLong { .. } => {
            bail!("command does not use the wallet daemon")
        }
    }

    Ok(())
}

async fn watch(rpc: Arc<AbewalletClient>, interval: std::time::Duration) -> Result<()> {
    let monitor = LockMonitor::new(rpc, SingleFlight::new(), interval);
    let (handle, mut status) = monitor.spawn();

    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("{:?}", *status.borrow_and_update());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    drop(status);
    handle.abort();
    Ok(())
}

fn converter(config: &RegistryConfig) -> Result<AddressConverter<AnsClient>> {
    Ok(AddressConverter::new(Arc::new(AnsClient::new(config)?)))
}

fn registry_config(args: &Args) -> Result<RegistryConfig> {
    let mut registry = match &args.config {
        Some(path) => WalletConfig::load(path)?.registry,
        None => RegistryConfig::default(),
    };
    if let Some(url) = &args.registry_url {
        registry.url = url.clone();
    }
    Ok(registry)
}

fn wallet_config(args: &Args) -> Result<WalletConfig> {
    let mut config = match &args.config {
        Some(path) => WalletConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let (Some(user), Some(pass)) = (&args.rpc_user, &args.rpc_pass) else {
                bail!("no config file given and --rpc-user/--rpc-pass are not set");
            };
            let url = args
                .rpc_url
                .clone()
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
            WalletConfig::from_rpc(RpcConfig::new(url, user.as_str(), pass.as_str()))
        }
    };

    if let Some(url) = &args.rpc_url {
        config.rpc.url = url.clone();
    }
    if let Some(url) = &args.registry_url {
        config.registry.url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
