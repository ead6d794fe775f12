//! Swap Cache - maintenance tool for the persisted token metadata cache.
//!
//! The cache file and namespace come from the same environment variables the
//! library uses.

use anyhow::Result;
use clap::{Parser, Subcommand};
use swap_cache::observability::init_tracing;
use swap_cache::{CacheContext, Config};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "swap-cache", version)]
#[command(about = "Inspect and maintain the persisted token metadata cache", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// List every record with its age state (default)
    List,

    /// Remove stale and undecodable records
    Purge,

    /// Remove every record of this cache
    Clear,
}

impl Cli {
    fn selected(&self) -> Command {
        self.command.unwrap_or(Command::List)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    init_tracing(&config);
    info!(
        "Using cache file {} (namespace: {})",
        config.cache_file.display(),
        config.cache_namespace
    );

    let ctx = CacheContext::from_config(&config);
    let store = &ctx.token_metadata;

    match cli.selected() {
        Command::List => {
            let now = ctx.clock().now();
            let entries = store.entries();
            for entry in &entries {
                let state = if entry.is_fresh(store.ttl(), now) {
                    "fresh"
                } else {
                    "stale"
                };
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    entry.key,
                    entry.value.symbol,
                    entry.value.decimals,
                    entry.stored_at.to_rfc3339(),
                    state
                );
            }
            info!("{} token metadata records", entries.len());
        }
        Command::Purge => {
            let removed = store.purge_expired();
            info!("Purged {} stale token metadata records", removed);
            println!("purged {}", removed);
        }
        Command::Clear => {
            let removed = store.clear();
            info!("Cleared {} token metadata records", removed);
            println!("cleared {}", removed);
        }
    }

    Ok(())
}
