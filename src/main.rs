// CodeTrack sync - command line entry point
// Fetch, aggregate and sync coding-platform stats from a terminal or a scheduler

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codetrack::api::firebase::FirebaseClient;
use codetrack::api::http::ReqwestTransport;
use codetrack::models::PlatformId;
use codetrack::utils::config::{Config, API_USER_AGENT};
use codetrack::{FetchContext, PlatformAggregator, PlatformFetchers, PlatformSyncService, StatsFetcher};

#[derive(Parser)]
#[command(name = "codetrack", version, about = "Coding-platform stats fetching and sync")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch stats for one account and print them
    Fetch {
        platform: String,
        username: String,
        /// Profile base URL for custom platforms
        #[arg(long)]
        url: Option<String>,
    },
    /// Fetch several accounts and print the aggregate
    Aggregate {
        /// Accounts as platform=username
        #[arg(required = true, value_parser = parse_account)]
        accounts: Vec<(String, String)>,
    },
    /// Refresh every linked platform of a user
    Sync { user_id: String },
    /// Link a platform account to a user, then sync
    Link {
        user_id: String,
        platform: String,
        username: String,
        #[arg(long)]
        url: Option<String>,
    },
    /// Remove a linked platform from a user
    Unlink { user_id: String, platform: String },
}

fn parse_account(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(p, u)| (p.trim().to_string(), u.trim().to_string()))
        .filter(|(p, u)| !p.is_empty() && !u.is_empty())
        .ok_or_else(|| format!("expected platform=username, got '{}'", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let http_client = reqwest::Client::builder()
        .user_agent(API_USER_AGENT)
        .cookie_store(true)
        .build()
        .context("Failed to create HTTP client")?;

    let ctx = FetchContext::new(Arc::new(ReqwestTransport::new(http_client.clone())))
        .with_github_token(config.github_token.clone());
    let fetchers = Arc::new(PlatformFetchers::new(ctx));

    let store = || -> Result<Arc<FirebaseClient>> {
        let firebase = FirebaseClient::from_file(http_client.clone(), &config.firebase_key_path)
            .with_context(|| format!("Failed to load Firebase credentials from {}", config.firebase_key_path))?;
        info!("Firebase client initialized");
        Ok(Arc::new(firebase))
    };

    let run = async {
        match cli.command {
            Command::Fetch { platform, username, url } => {
                let resolved = PlatformId::resolve(&platform);
                let stats = match resolved {
                    Some(id) => fetchers.fetch(id, &username).await?,
                    None => fetchers.fetch_custom(&platform, &username, url.as_deref()).await?,
                };
                let label = resolved.map_or(platform.as_str(), |p| p.label());
                match stats {
                    Some(stats) => print_json(&stats),
                    None => Err(anyhow!("No verifiable {} profile for {}", label, username)),
                }
            }
            Command::Aggregate { accounts } => {
                let linked: BTreeMap<String, String> = accounts.into_iter().collect();
                let aggregator = PlatformAggregator::new(fetchers.clone(), config.sync_concurrency);
                print_json(&aggregator.aggregate_user_stats(&linked).await)
            }
            Command::Sync { user_id } => {
                let service = PlatformSyncService::new(store()?, fetchers.clone(), config.sync_concurrency);
                print_json(&service.sync_user_platforms(&user_id).await?)
            }
            Command::Link { user_id, platform, username, url } => {
                let service = PlatformSyncService::new(store()?, fetchers.clone(), config.sync_concurrency);
                print_json(&service.link_platform(&user_id, &platform, &username, url.as_deref()).await?)
            }
            Command::Unlink { user_id, platform } => {
                let service = PlatformSyncService::new(store()?, fetchers.clone(), config.sync_concurrency);
                service.unlink_platform(&user_id, &platform).await
            }
        }
    };

    tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, platforms already written keep their new state");
            Ok(())
        }
    }
}
