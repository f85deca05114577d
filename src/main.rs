use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast;

use sila_bot::application::context::AppContext;
use sila_bot::application::errors::BotError;
use sila_bot::application::runtime::BotRuntime;
use sila_bot::application::services::BanManager;
use sila_bot::domain::traits::Connector;
use sila_bot::infrastructure::adapters::{BridgeConnector, ConsoleConnector};
use sila_bot::infrastructure::config::Config;
use sila_bot::infrastructure::database::Database;
use sila_bot::infrastructure::http;
use sila_bot::plugins::builtin::builtin_plugins;
use sila_bot::plugins::PluginRegistry;

#[derive(Parser)]
#[command(name = "sila-bot")]
#[command(about = "A WhatsApp multi-device bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Use the stdin console instead of the bridge gateway
        #[arg(long)]
        console: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Log panics through tracing so they land next to the bot's own output
    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!("💥 Panic: {}", panic_info);
    }));

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { console } => {
            if let Err(e) = run_bot(&cli.config, console) {
                tracing::error!("Bot stopped: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("sila-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            if let Err(e) = init_config() {
                eprintln!("Failed to render default config: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// A config file that exists but fails to parse or validate stops startup
fn load_config(config_path: &str) -> Result<Config, BotError> {
    if std::path::Path::new(config_path).exists() {
        Ok(Config::load(config_path)?)
    } else {
        tracing::info!("No config file at {}, using defaults and environment", config_path);
        let config = Config::load_env();
        config.validate()?;
        Ok(config)
    }
}

fn open_bans(config: &Config) -> BanManager {
    let Some(path) = &config.bans.database else {
        return BanManager::new();
    };

    let store = match Database::new(path) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open ban database {}: {}, bans stay in memory", path.display(), e);
            return BanManager::new();
        }
    };

    match BanManager::with_store(Box::new(store)) {
        Ok(bans) => {
            tracing::info!("Database initialized with {} ban(s)", bans.len());
            bans
        }
        Err(e) => {
            tracing::error!("Failed to load bans: {}, starting with an empty list", e);
            BanManager::new()
        }
    }
}

fn select_connector(config: &Config, force_console: bool) -> Result<Arc<dyn Connector>, BotError> {
    let console_enabled = config.adapters.console.as_ref().is_some_and(|c| c.enabled);

    match config.bridge() {
        Some(bridge) if !force_console && !console_enabled => {
            Ok(Arc::new(BridgeConnector::new(bridge, &config.session)?))
        }
        _ => {
            if !force_console && !console_enabled {
                tracing::warn!("No bridge configured, falling back to the console adapter");
            }
            Ok(Arc::new(ConsoleConnector::new(config.bot.owner.clone())))
        }
    }
}

fn run_bot(config_path: &str, force_console: bool) -> Result<(), BotError> {
    let config = load_config(config_path)?;
    tracing::info!("Starting sila-bot: {}", config.bot.name);

    let bans = open_bans(&config);

    let (registry, report) = PluginRegistry::load(builtin_plugins(), &config);
    report.log();
    registry.ensure_loaded()?;

    let connector = select_connector(&config, force_console)?;
    let port = config.server.port;
    let bot_name = config.bot.name.clone();

    let app = AppContext::new(config, registry, bans);
    let mut runtime = BotRuntime::new(app, connector);

    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(e.to_string()))?;

    rt.block_on(async move {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let server = tokio::spawn(async move {
            if let Err(e) = http::serve(port, bot_name).await {
                tracing::error!("HTTP server error: {}", e);
            }
        });

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                // A dropped sender reads as shutdown to the runtime
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(());
        });

        runtime.run(shutdown_rx).await;
        server.abort();
        tracing::info!("Goodbye 👋");
    });

    Ok(())
}

fn init_config() -> Result<(), serde_yaml::Error> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
