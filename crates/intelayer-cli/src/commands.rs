//! Command-line surface and command execution.

use std::io::Read;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use intelayer_core::{
    Action, ActionValue, ApproveAgent, CandleSnapshotRequest, ConnectAction, InfoRequest, Network,
};
use intelayer_signer::{
    parse_vault_address, ActionSigner, CanonicalAction, LocalIdentity, MonotonicNonces,
    NonceSource, RequestEnvelope, SigningInput, SigningPayload, SigningScheme, SystemClock,
};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::gateway::GatewayClient;

/// Sign exchange actions and talk to the gateway.
#[derive(Parser, Debug)]
#[command(name = "intelayer", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (can also be set via INTELAYER_CONFIG env var)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the configured network (mainnet or testnet)
    #[arg(long, global = true)]
    pub network: Option<Network>,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every signing command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOpts {
    /// Nonce in ms (default: next monotonic timestamp)
    #[arg(long)]
    pub nonce: Option<u64>,

    /// Vault address to act for (overrides vault_address in config)
    #[arg(long)]
    pub vault: Option<String>,

    /// Timestamp (ms) after which the exchange must reject the request
    #[arg(long)]
    pub expires_after: Option<u64>,

    /// Post the signed request to the gateway
    #[arg(long)]
    pub submit: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign an action given as JSON (file path, or - for stdin)
    Sign {
        #[arg(long)]
        action: String,
        #[command(flatten)]
        opts: SignOpts,
    },

    /// Create a named sub-account
    CreateSubAccount {
        name: String,
        #[command(flatten)]
        opts: SignOpts,
    },

    /// Move USD between the master account and a sub-account
    SubAccountTransfer {
        /// Sub-account address
        #[arg(long)]
        sub_account: String,
        /// Amount in USD, at most 6 decimals
        #[arg(long)]
        usd: Decimal,
        /// Move funds out of the sub-account instead of into it
        #[arg(long)]
        withdraw: bool,
        #[command(flatten)]
        opts: SignOpts,
    },

    /// Approve an agent key
    Connect {
        /// Agent address
        #[arg(long)]
        agent: Address,
        /// Named agent slot
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        opts: SignOpts,
    },

    /// Approve an agent key with an `approveAgent` action
    ApproveAgent {
        /// Agent address
        #[arg(long)]
        agent: Address,
        /// Named agent slot
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        opts: SignOpts,
    },

    /// Print the EIP-712 typed data an action would be signed as
    TypedData {
        #[arg(long)]
        action: String,
        #[arg(long)]
        nonce: Option<u64>,
        #[arg(long)]
        vault: Option<String>,
        #[arg(long)]
        expires_after: Option<u64>,
    },

    /// Query account and market data
    Info {
        #[command(subcommand)]
        query: InfoQuery,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum InfoQuery {
    /// Sub-accounts of a user
    SubAccounts {
        #[arg(long)]
        user: String,
    },
    /// Order history of a user
    HistoricalOrders {
        #[arg(long)]
        user: String,
    },
    /// Fee schedule of a user
    UserFees {
        #[arg(long)]
        user: String,
    },
    /// Spot token and pair metadata
    SpotMeta,
    /// Candles for a coin over a time range (ms)
    Candles {
        #[arg(long)]
        coin: String,
        #[arg(long)]
        interval: String,
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
    },
}

impl InfoQuery {
    pub fn to_request(&self, exchange: &str) -> AppResult<InfoRequest> {
        Ok(match self {
            InfoQuery::SubAccounts { user } => InfoRequest::sub_accounts(exchange, user.as_str()),
            InfoQuery::HistoricalOrders { user } => {
                InfoRequest::historical_orders(exchange, user.as_str())
            }
            InfoQuery::UserFees { user } => InfoRequest::user_fees(exchange, user.as_str()),
            InfoQuery::SpotMeta => InfoRequest::spot_meta(exchange),
            InfoQuery::Candles {
                coin,
                interval,
                start,
                end,
            } => {
                if start > end {
                    return Err(AppError::Input(format!(
                        "candle range start {start} is after end {end}"
                    )));
                }
                InfoRequest::candle_snapshot(
                    exchange,
                    &CandleSnapshotRequest {
                        coin: coin.clone(),
                        interval: interval.clone(),
                        start_time: *start,
                        end_time: *end,
                    },
                )
            }
        })
    }
}

/// Read a JSON action from a file, or stdin when `path` is `-`.
pub fn read_action(path: &str) -> AppResult<ActionValue> {
    let content = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_action(&content)
}

/// Parse a JSON action, keeping its key order.
pub fn parse_action(content: &str) -> AppResult<ActionValue> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if value.get("type").and_then(|t| t.as_str()).is_none() {
        return Err(AppError::Input("action must be an object with a string \"type\"".to_string()));
    }
    Ok(ActionValue::from_json(&value)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Executes commands against one configuration.
pub struct Runner {
    config: AppConfig,
    signer: ActionSigner,
    nonces: MonotonicNonces<SystemClock>,
}

impl Runner {
    /// Build a runner, loading the signing key if one is configured.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let signer = match &config.key {
            Some(source) => {
                let identity = LocalIdentity::load(source, None)?;
                ActionSigner::new(Arc::new(identity), config.network)
            }
            None => ActionSigner::unconfigured(config.network),
        };
        if let Some(address) = signer.address() {
            info!(%address, network = %config.network, "Signing identity loaded");
        }

        Ok(Self {
            config,
            signer,
            nonces: MonotonicNonces::with_system_clock(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// `nonce`, or the next monotonic one. Explicit nonces advance the counter.
    pub fn resolve_nonce(&self, nonce: Option<u64>) -> u64 {
        match nonce {
            Some(nonce) => {
                self.nonces.observe(nonce);
                nonce
            }
            None => self.nonces.next_nonce(),
        }
    }

    /// Assemble the signing input, falling back to the configured vault and
    /// the next monotonic nonce.
    pub fn input<A>(
        &self,
        action: A,
        nonce: Option<u64>,
        vault: Option<&str>,
        expires_after: Option<u64>,
    ) -> AppResult<SigningInput<A>> {
        let nonce = self.resolve_nonce(nonce);
        let vault_address = match vault {
            Some(vault) => Some(parse_vault_address(vault)?),
            None => self.config.vault()?,
        };
        Ok(SigningInput::new(action, nonce)
            .with_vault(vault_address)
            .with_expiry(expires_after))
    }

    /// [`Runner::input`] for an action about to be signed.
    ///
    /// The configured vault only applies to hashed actions; an explicit
    /// `vault` is always passed through.
    fn signing_input<A: CanonicalAction>(
        &self,
        action: A,
        nonce: Option<u64>,
        vault: Option<&str>,
        expires_after: Option<u64>,
    ) -> AppResult<SigningInput<A>> {
        let mut input = self.input(action, nonce, vault, expires_after)?;
        if vault.is_none() && !matches!(input.action.signing_scheme(), SigningScheme::Hashed) {
            input.vault_address = None;
        }
        Ok(input)
    }

    /// Sign `action` into a request envelope.
    pub async fn sign<A: CanonicalAction>(
        &self,
        action: A,
        opts: &SignOpts,
    ) -> AppResult<RequestEnvelope<A>> {
        let input = self.signing_input(
            action,
            opts.nonce,
            opts.vault.as_deref(),
            opts.expires_after,
        )?;
        Ok(self.signer.sign_request(&self.config.exchange_id, input).await?)
    }

    /// The typed data `action` would be signed as; needs no key.
    pub fn typed_data<A: CanonicalAction>(
        &self,
        action: A,
        nonce: Option<u64>,
        vault: Option<&str>,
        expires_after: Option<u64>,
    ) -> AppResult<SigningPayload> {
        let input = self.signing_input(action, nonce, vault, expires_after)?;
        Ok(self.signer.typed_data(&input)?)
    }

    /// Build and sign an `approveAgent`; its nonce is signed twice, so it is
    /// fixed before the action is built.
    pub async fn approve_agent(
        &self,
        agent: Address,
        name: Option<&str>,
        opts: &SignOpts,
    ) -> AppResult<RequestEnvelope<Action>> {
        let nonce = self.resolve_nonce(opts.nonce);
        let action = ApproveAgent::new(self.config.network, agent, name, nonce);
        let opts = SignOpts {
            nonce: Some(nonce),
            ..opts.clone()
        };
        self.sign(Action::ApproveAgent(action), &opts).await
    }

    fn gateway(&self) -> AppResult<GatewayClient> {
        let url = self.config.gateway_url.as_deref().ok_or_else(|| {
            AppError::Config("gateway_url is required for this command".to_string())
        })?;
        GatewayClient::new(url, self.config.request_timeout())
    }

    async fn sign_and_emit<A: CanonicalAction>(&self, action: A, opts: &SignOpts) -> AppResult<()> {
        let envelope = self.sign(action, opts).await?;
        self.emit(&envelope, opts).await
    }

    async fn emit<A: CanonicalAction>(
        &self,
        envelope: &RequestEnvelope<A>,
        opts: &SignOpts,
    ) -> AppResult<()> {
        debug!(nonce = envelope.nonce, "Request signed");
        print_json(&envelope)?;

        if opts.submit {
            let data = self.gateway()?.submit(envelope).await?;
            print_json(&data)?;
        }
        Ok(())
    }

    pub async fn run(&self, command: Command) -> AppResult<()> {
        match command {
            Command::Sign { action, opts } => {
                self.sign_and_emit(read_action(&action)?, &opts).await
            }
            Command::CreateSubAccount { name, opts } => {
                self.sign_and_emit(Action::create_sub_account(name), &opts).await
            }
            Command::SubAccountTransfer {
                sub_account,
                usd,
                withdraw,
                opts,
            } => {
                let action = Action::sub_account_transfer(sub_account, !withdraw, usd)?;
                self.sign_and_emit(action, &opts).await
            }
            Command::Connect { agent, name, opts } => {
                let action = ConnectAction::new(self.config.network, agent, name.as_deref());
                self.sign_and_emit(Action::Connect(action), &opts).await
            }
            Command::ApproveAgent { agent, name, opts } => {
                let envelope = self.approve_agent(agent, name.as_deref(), &opts).await?;
                self.emit(&envelope, &opts).await
            }
            Command::TypedData {
                action,
                nonce,
                vault,
                expires_after,
            } => {
                let envelope =
                    self.typed_data(read_action(&action)?, nonce, vault.as_deref(), expires_after)?;
                print_json(&envelope)
            }
            Command::Info { query } => {
                let request = query.to_request(&self.config.exchange_id)?;
                let data = self.gateway()?.info(&request).await?;
                print_json(&data)
            }
            Command::Config => {
                print!("{}", self.config.to_toml()?);
                Ok(())
            }
        }
    }
}
