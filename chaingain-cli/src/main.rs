//! `chaingain` command line front end.
//!
//! # Usage
//!
//! ```bash
//! # Quiz with the built-in deck against a local backend
//! chaingain --environment local quiz
//!
//! # Quiz with a custom deck, translating into Spanish
//! chaingain --language es quiz --deck words.json
//!
//! # Check that an account holds a certificate serial
//! chaingain cert check --cert-id 0.0.9001 --serial 3
//! ```

mod quiz;
mod store;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chaingain_core::{
    ChainGain, ClientConfig, Deck, Environment, Language, PrivateKeySink, ProvisionedKey,
};
use clap::{Parser, Subcommand};
use eyre::{eyre, WrapErr};
use secrecy::ExposeSecret;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::store::FileStore;

/// Learn vocabulary and collect micro-certificates on the ledger
#[derive(Parser, Debug)]
#[command(name = "chaingain", version)]
struct Cli {
    /// Backend deployment (local, staging, production)
    #[arg(
        long,
        global = true,
        env = "CHAINGAIN_ENVIRONMENT",
        default_value = "production"
    )]
    environment: Environment,

    /// Backend base URL, overriding the environment's default
    #[arg(long, global = true, env = "CHAINGAIN_BASE_URL")]
    base_url: Option<String>,

    /// Accept a plain `http` base URL
    #[arg(long, global = true)]
    allow_insecure: bool,

    /// Language to translate into (fr, de, es)
    #[arg(long, global = true, env = "CHAINGAIN_LANGUAGE")]
    language: Option<Language>,

    /// Identity store file [default: <data dir>/chaingain/identity.json]
    #[arg(long, global = true, env = "CHAINGAIN_STORE")]
    store: Option<PathBuf>,

    /// Print the private key of a newly created account to stderr, once
    #[arg(long, global = true)]
    reveal_private_key: bool,

    /// Log level used when `RUST_LOG` is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a deck card by card
    Quiz {
        /// JSON deck: `[{"word": ..., "translation": ...}]`
        #[arg(long)]
        deck: Option<PathBuf>,
    },
    /// Inspect or manage the local identity
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Certificate tools
    Cert {
        #[command(subcommand)]
        command: CertCommand,
    },
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Print the stored account
    Show,
    /// Create an account unless one is stored
    Ensure,
    /// Delete the stored identity
    Reset,
}

#[derive(Subcommand, Debug)]
enum CertCommand {
    /// Ask the backend whether an account holds a certificate serial
    Check {
        /// Account to check [default: the stored account]
        #[arg(long)]
        acc_id: Option<String>,
        /// Certificate token id
        #[arg(long)]
        cert_id: String,
        /// Serial number within the token
        #[arg(long)]
        serial: String,
    },
    /// Print the public link of a certificate
    Url {
        /// Certificate content id
        id: String,
    },
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_environment(self.environment);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if self.allow_insecure {
            config = config.with_allow_insecure(true);
        }
        if let Some(language) = self.language {
            config = config.with_language(language);
        }
        config
    }

    fn store_path(&self) -> eyre::Result<PathBuf> {
        self.store
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("chaingain").join("identity.json")))
            .ok_or_else(|| eyre!("no data directory on this system, pass --store"))
    }
}

/// Shows the one-time private key on stderr.
struct StderrKeySink;

impl PrivateKeySink for StderrKeySink {
    fn receive(&self, key: &ProvisionedKey) {
        eprintln!(
            "Private key for account {} (shown once, it is not stored):\n{}",
            key.account.account_id,
            key.private_key.expose_secret()
        );
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let store = Arc::new(FileStore::new(cli.store_path()?));
    tracing::debug!(path = %store.path().display(), "using identity store");

    let config = cli.client_config();
    let client = if cli.reveal_private_key {
        ChainGain::with_private_key_sink(config, store.clone(), Arc::new(StderrKeySink))
    } else {
        ChainGain::new(config, store.clone())
    }
    .wrap_err("invalid configuration")?;

    match cli.command {
        Command::Quiz { deck } => {
            let deck = match deck {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .wrap_err_with(|| format!("reading {}", path.display()))?;
                    Deck::from_json(&json)?
                }
                None => quiz::starter_deck()?,
            };
            client
                .init()
                .await
                .wrap_err("could not set up an account, try again later")?;
            quiz::run(&client, &deck, std::io::stdin().lock(), std::io::stdout()).await?;
        }
        Command::Account { command } => match command {
            AccountCommand::Show => match client.account()? {
                Some(account) => {
                    println!("account:    {}", account.account_id);
                    println!("public key: {}", account.public_key);
                    println!("store:      {}", store.path().display());
                }
                None => println!("no account yet, run `chaingain account ensure`"),
            },
            AccountCommand::Ensure => {
                let account = client.init().await?;
                println!("{}", account.account_id);
            }
            AccountCommand::Reset => {
                client.provisioner().forget_account()?;
                println!("identity removed from {}", store.path().display());
            }
        },
        Command::Cert { command } => match command {
            CertCommand::Check {
                acc_id,
                cert_id,
                serial,
            } => {
                let stored = client.account()?.map(|account| account.account_id);
                let account_id = acc_id
                    .or(stored)
                    .ok_or_else(|| eyre!("no stored account, pass --acc-id"))?;
                let valid = client
                    .certificates()
                    .check(&account_id, &cert_id, &serial)
                    .await?;
                println!("{}", if valid { "valid" } else { "not valid" });
            }
            CertCommand::Url { id } => println!("{}", client.certificate_url(&id)),
        },
    }

    Ok(())
}
