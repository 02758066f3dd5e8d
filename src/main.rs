use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use stock_notifier::application::delivery::DeliveryEngine;
use stock_notifier::application::messaging::{CommandDispatcher, MessageParser};
use stock_notifier::application::routing::TopicRouter;
use stock_notifier::application::services::NotificationService;
use stock_notifier::domain::entities::{render_listing, Recipient};
use stock_notifier::domain::traits::{Bot, Host, Monitor, Notifier, TopicChannel};
use stock_notifier::infrastructure::adapters::telegram::types::next_offset;
use stock_notifier::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter, TopicHttpClient};
use stock_notifier::infrastructure::config::Config;
use stock_notifier::infrastructure::monitor::SnapshotMonitor;
use stock_notifier::infrastructure::storage::FileConfigStore;
use stock_notifier::infrastructure::system::{LocalNetwork, SystemHost};

/// Long-poll timeout for getUpdates
const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Parser)]
#[command(name = "stock-notifier")]
#[command(about = "Stock monitor notifications and remote control over Telegram", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bridge and listen for operator commands
    Run,
    /// Push a single monitor event to the operator
    Notify {
        #[command(subcommand)]
        event: Event,
    },
    /// Print the command listing for BotFather
    Commands,
    /// Generate default config
    InitConfig,
    /// Show version
    Version,
}

#[derive(Subcommand)]
enum Event {
    Start,
    Stop,
    StockAvailable { message: String },
    AppointmentAvailable { message: String },
    NewlyAvailable,
    Report { report: String },
    ProxyDepletion { message: String },
    LongProcessing { warning: String },
    ConnectionError { error: String },
    Error {
        error: String,
        /// Log file to attach
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

/// Everything wired together for one transport pair
struct Bridge {
    notifier: Arc<NotificationService>,
    dispatcher: CommandDispatcher,
    monitor: Arc<dyn Monitor>,
}

fn main() {
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
        Commands::Run => {
            let config = load_config(&cli.config, cli.token);
            block_on(run_bot(config, PathBuf::from(&cli.config)));
        }
        Commands::Notify { event } => {
            let config = load_config(&cli.config, cli.token);
            block_on(notify(config, PathBuf::from(&cli.config), event));
        }
        Commands::Commands => {
            print!(
                "{}",
                render_listing("Commands available (use /setcommands in the BotFather chat to set these):")
            );
        }
        Commands::InitConfig => {
            init_config(&cli.config);
        }
        Commands::Version => {
            println!("stock-notifier v{}", env!("CARGO_PKG_VERSION"));
        }
    }
}

fn block_on<F: std::future::Future<Output = ()>>(future: F) {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(future),
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Config {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        tracing::info!("No config at {}, using environment", config_path);
        Config::load_env()
    };

    config.apply_env();
    if let Some(token) = token_override {
        config.telegram.bot_token = Some(token);
    }
    config
}

fn build_bridge(
    config: &Config,
    config_path: PathBuf,
    bot: Arc<dyn Bot>,
    topics: Arc<dyn TopicChannel>,
    recipient: Option<Recipient>,
) -> Bridge {
    let host: Arc<dyn Host> = Arc::new(SystemHost::new());
    let monitor: Arc<dyn Monitor> = Arc::new(SnapshotMonitor::new(&config.app.state_dir));
    let config_store = match &config.app.home {
        Some(home) => FileConfigStore::new(&config_path, home),
        None => FileConfigStore::beside_config(&config_path),
    };

    let registry = config.topic_registry();
    tracing::info!("Loaded {} topic(s)", registry.len());

    let engine = Arc::new(
        DeliveryEngine::new(Arc::clone(&bot), Arc::clone(&host)).with_policy(config.delivery_policy()),
    );
    let router = Arc::new(
        TopicRouter::new(topics, Arc::clone(&engine), Arc::new(registry))
            .with_group(config.group())
            .with_recipient(recipient.clone()),
    );
    let notifier = Arc::new(
        NotificationService::new(Arc::clone(&engine), router, Arc::new(LocalNetwork))
            .with_recipient(recipient.clone())
            .with_topic_key(config.telegram.topic_key.clone()),
    );
    let dispatcher = CommandDispatcher::new(engine, bot, Arc::clone(&monitor), Arc::new(config_store), host)
        .with_recipient(recipient)
        .with_data_file(&config.app.data_file);

    Bridge {
        notifier,
        dispatcher,
        monitor,
    }
}

async fn run_bot(config: Config, config_path: PathBuf) {
    tracing::info!(
        "{}",
        render_listing("Commands available (use /setcommands in the BotFather chat to set these):")
    );

    if let Some(token) = config.bot_token().map(str::to_string) {
        let bot = Arc::new(TelegramAdapter::with_base_url(&token, &config.telegram.api_base));
        if let Err(e) = bot.start().await {
            tracing::error!("Failed to start Telegram session: {}", e);
            return;
        }
        if let Err(e) = bot.register_commands().await {
            tracing::warn!("Failed to register commands: {}", e);
        }

        let topics = Arc::new(
            TopicHttpClient::with_base_url(&token, &config.telegram.api_base).with_timeout(config.topic_timeout()),
        );
        let bridge = build_bridge(&config, config_path, bot.clone(), topics, config.recipient());
        run_telegram_bot(bot, bridge).await;
    } else {
        tracing::warn!("No bot token configured, running in console mode");
        let console = Arc::new(ConsoleAdapter::new());
        // Typed commands arrive from the "console" chat, so it is the operator.
        let bridge = build_bridge(&config, config_path, console.clone(), console.clone(), Recipient::parse("console"));
        run_console_bot(console, bridge).await;
    }
}

async fn start_session(bridge: &Bridge) {
    if let Err(e) = bridge.monitor.start_monitoring().await {
        tracing::error!("Failed to start monitoring: {}", e);
        bridge
            .notifier
            .on_error(&e.to_string(), bridge.monitor.log_file_path())
            .await;
    }
    bridge.notifier.on_start().await;
}

async fn end_session(bridge: &Bridge, bot: &dyn Bot) {
    if let Err(e) = bridge.monitor.stop_monitoring().await {
        tracing::error!("Failed to stop monitoring: {}", e);
    }
    bridge.notifier.on_stop().await;
    bot.stop().await;
}

async fn run_telegram_bot(bot: Arc<TelegramAdapter>, mut bridge: Bridge) {
    let parser = MessageParser::new();
    let mut offset = 0;

    let info = bot.bot_info();
    tracing::info!("Bot started: @{}", info.username);
    start_session(&bridge).await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!("Starting message loop...");
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
            result = bot.get_updates(offset, POLL_TIMEOUT_SECS) => match result {
                Ok(updates) => {
                    if updates.is_empty() {
                        continue;
                    }
                    tracing::info!("Received {} updates", updates.len());
                    offset = next_offset(&updates, offset);
                    if let Err(e) = bot.acknowledge(offset).await {
                        tracing::warn!("Failed to acknowledge updates: {}", e);
                    }

                    // One message at a time; the next waits for the handler.
                    for update in updates {
                        if let Some(message) = update.into_message(&parser) {
                            bridge.dispatcher.handle(message).await;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to get updates: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    end_session(&bridge, bot.as_ref()).await;
}

async fn run_console_bot(console: Arc<ConsoleAdapter>, mut bridge: Bridge) {
    let parser = MessageParser::new();
    if let Err(e) = console.start().await {
        tracing::error!("Failed to start console session: {}", e);
        return;
    }
    start_session(&bridge).await;

    println!("Type commands (e.g. /status), Ctrl-D to quit.");
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = console.read_line() => match line {
                Some(line) if line.is_empty() => continue,
                Some(line) => {
                    let message = parser.parse("console", line, None);
                    bridge.dispatcher.handle(message).await;
                }
                None => break,
            }
        }
    }

    end_session(&bridge, console.as_ref()).await;
}

async fn notify(config: Config, config_path: PathBuf, event: Event) {
    let bridge = match config.bot_token().map(str::to_string) {
        Some(token) => {
            let bot = Arc::new(TelegramAdapter::with_base_url(&token, &config.telegram.api_base));
            let topics = Arc::new(
                TopicHttpClient::with_base_url(&token, &config.telegram.api_base)
                    .with_timeout(config.topic_timeout()),
            );
            build_bridge(&config, config_path, bot, topics, config.recipient())
        }
        None => {
            let console = Arc::new(ConsoleAdapter::new());
            let recipient = config.recipient().or_else(|| Recipient::parse("console"));
            build_bridge(&config, config_path, console.clone(), console, recipient)
        }
    };

    let notifier = bridge.notifier.as_ref();
    match event {
        Event::Start => notifier.on_start().await,
        Event::Stop => notifier.on_stop().await,
        Event::StockAvailable { message } => notifier.on_stock_available(&message).await,
        Event::AppointmentAvailable { message } => notifier.on_appointment_available(&message).await,
        Event::NewlyAvailable => notifier.on_newly_available().await,
        Event::Report { report } => notifier.on_auto_report(&report).await,
        Event::ProxyDepletion { message } => notifier.on_proxy_depletion(&message).await,
        Event::LongProcessing { warning } => notifier.on_long_processing_warning(&warning).await,
        Event::ConnectionError { error } => notifier.on_connection_error(&error).await,
        Event::Error { error, log } => {
            let log = log.or_else(|| bridge.monitor.log_file_path());
            notifier.on_error(&error, log).await
        }
    }
}

fn init_config(config_path: &str) {
    if Path::new(config_path).exists() {
        tracing::warn!("{} already exists, not overwriting", config_path);
        return;
    }

    match Config::default().to_yaml() {
        Ok(yaml) => match std::fs::write(config_path, yaml) {
            Ok(()) => println!("Wrote default config to {}", config_path),
            Err(e) => tracing::error!("Failed to write {}: {}", config_path, e),
        },
        Err(e) => tracing::error!("Failed to render default config: {}", e),
    }
}
