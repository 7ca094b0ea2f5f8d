//! Command-line client for the VoiceMode endpoints.
//!
//! ```bash
//! VOICEMODE_API_TOKEN=... voicemode --base-url http://localhost:8080 config
//! voicemode token --identity alice --room lobby
//! RUST_LOG=debug voicemode join --identity alice --room lobby
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;

use voicemode_client::config::{BASE_URL_ENV, DEFAULT_BASE_URL};
use voicemode_client::{APIClient, ClientConfig};

#[derive(Debug, Parser)]
#[command(name = "voicemode", about = "Query the VoiceMode endpoints of a web UI server")]
struct Cli {
    /// Web UI server base url
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Bearer credential sent as `Authorization: Bearer <token>`
    #[arg(long, env = "VOICEMODE_API_TOKEN", hide_env_values = true)]
    token: String,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the server's VoiceMode configuration
    Config,
    /// Request a LiveKit token
    Token(SessionArgs),
    /// Check the configuration, then request a token
    Join(SessionArgs),
}

#[derive(Debug, clap::Args)]
struct SessionArgs {
    #[arg(long)]
    identity: String,
    #[arg(long)]
    room: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn init_logger(level: LevelFilter) {
    // RUST_LOG still applies per module; --log-level sets the floor
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .filter_module("reqwest", LevelFilter::Info)
        .filter_module("hyper", LevelFilter::Info)
        .init();
}

/// Build the client config around the base url clap already resolved
/// (flag, then `WEBUI_BASE_URL`, then default), so a bad env value cannot
/// override the flag. Other settings still come from `lookup`.
fn client_config<F>(base_url: &str, lookup: F) -> voicemode_client::Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    ClientConfig::from_lookup(|key| {
        if key == BASE_URL_ENV {
            Some(base_url.to_string())
        } else {
            lookup(key)
        }
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logger(cli.log_level.into());

    let config = client_config(&cli.base_url, |key| std::env::var(key).ok())
        .context("reading client configuration")?;
    let client = APIClient::from_config(&config).context("building API client")?;

    match cli.command {
        Command::Config => {
            let config = client
                .get_voicemode_config(&cli.token)
                .await
                .context("fetching VoiceMode config")?;
            print_json(&config)
        }
        Command::Token(args) => {
            let token = client
                .get_livekit_token(&cli.token, args.identity, args.room)
                .await
                .context("fetching LiveKit token")?;
            print_json(&token)
        }
        Command::Join(args) => {
            let creds = client
                .join_session(&cli.token, args.identity, args.room)
                .await
                .context("joining VoiceMode session")?;
            print_json(&creds)
        }
    }
}
