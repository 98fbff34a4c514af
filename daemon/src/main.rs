//! Staking indexer daemon entry point.

use anyhow::Context;
use clap::Parser;
use stakeindex_events::EventLogReader;
use stakeindex_indexer::{replay_log, EventReducer, IndexerConfig, ReplayStats, UnknownWalletBurns};
use stakeindex_rpc::{ReadState, RpcServer};
use stakeindex_store_lmdb::LmdbEnvironment;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "stakeindex-daemon", about = "Staking event indexer daemon")]
struct Cli {
    /// Data directory for derived-state storage.
    #[arg(long, default_value = "./stakeindex_data", env = "STAKEINDEX_DATA_DIR")]
    data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[arg(long, default_value_t = 1 << 30, env = "STAKEINDEX_MAP_SIZE")]
    map_size: usize,

    /// Read API port.
    #[arg(long, default_value_t = 7077, env = "STAKEINDEX_RPC_PORT")]
    rpc_port: u16,

    /// Burn policy for addresses with no wallet record: "create-empty" or "skip".
    /// Overrides the config file.
    #[arg(long, env = "STAKEINDEX_UNKNOWN_WALLET_BURNS")]
    unknown_wallet_burns: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "STAKEINDEX_LOG_LEVEL")]
    log_level: String,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay an event log into the store, then exit.
    Replay {
        /// NDJSON event log, in chain order.
        #[arg(long, env = "STAKEINDEX_EVENT_LOG")]
        event_log: PathBuf,
    },
    /// Replay an event log, then serve the read API.
    Run {
        /// NDJSON event log, in chain order.
        #[arg(long, env = "STAKEINDEX_EVENT_LOG")]
        event_log: PathBuf,
    },
}

fn parse_policy(s: &str) -> anyhow::Result<UnknownWalletBurns> {
    match s {
        "create-empty" => Ok(UnknownWalletBurns::CreateEmpty),
        "skip" => Ok(UnknownWalletBurns::Skip),
        other => anyhow::bail!("unknown burn policy '{other}' (expected 'create-empty' or 'skip')"),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<IndexerConfig> {
    let mut config = if let Some(ref config_path) = cli.config {
        match IndexerConfig::from_toml_file(config_path) {
            Ok(cfg) => {
                tracing::info!("loaded config from {}", config_path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!("failed to load config file: {e}, using defaults");
                IndexerConfig::default()
            }
        }
    } else {
        IndexerConfig::default()
    };
    if let Some(ref policy) = cli.unknown_wallet_burns {
        config.unknown_wallet_burns = parse_policy(policy)?;
    }
    Ok(config)
}

fn replay_event_log(
    env: &LmdbEnvironment,
    event_log: &Path,
    config: &IndexerConfig,
) -> anyhow::Result<ReplayStats> {
    let file = File::open(event_log)
        .with_context(|| format!("opening event log {}", event_log.display()))?;
    let reader = EventLogReader::new(BufReader::new(file));

    let wallets = env.wallet_store();
    let stakes = env.stake_store();
    let meta = env.meta_store();
    let reducer = EventReducer::with_config(&wallets, &stakes, config.clone());
    let stats = replay_log(&reducer, &meta, reader).context("replaying event log")?;
    Ok(stats)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    stakeindex_utils::init_tracing(&cli.log_level);

    let config = load_config(&cli)?;
    let env = LmdbEnvironment::open(&cli.data_dir, cli.map_size)
        .with_context(|| format!("opening store at {}", cli.data_dir.display()))?;

    match cli.command {
        Command::Replay { event_log } => {
            replay_event_log(&env, &event_log, &config)?;
        }
        Command::Run { event_log } => {
            replay_event_log(&env, &event_log, &config)?;

            let state = Arc::new(ReadState {
                wallets: Arc::new(env.wallet_store()),
                stakes: Arc::new(env.stake_store()),
            });
            RpcServer::new(cli.rpc_port, state).start().await?;
        }
    }
    Ok(())
}
