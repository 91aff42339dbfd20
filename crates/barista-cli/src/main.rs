use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use barista_agent::BaristaSession;
use barista_agent::metrics::install_prometheus_recorder;
use barista_agent::prompt::build_instructions;
use barista_core::config::Config;
use barista_core::{JsonOrderStore, MemoryOrderStore, OrderStore, StoredOrder};
use barista_tools::ToolRegistry;

mod console;
mod logging;

use console::{ConsoleCommand, HELP, parse_line};

#[derive(Parser)]
#[command(
    name = "barista",
    about = "Voice order-taking barista: order state, tools, and persistence",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Take orders by typing tool calls instead of speaking
    Console {
        /// Keep orders in memory instead of writing them to disk
        #[arg(long)]
        dry_run: bool,

        /// Print Prometheus metrics when the console exits
        #[arg(long)]
        metrics: bool,
    },

    /// Print the tool definitions handed to the language model
    Tools,

    /// Print the instructions handed to the language model
    Prompt,

    /// Saved order management
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show configuration and pipeline summary
    Status,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List saved orders
    List,
    /// Show one saved order (file path or order id)
    Show { order: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a specific config value
    Get { key: String },
    /// Check the configuration for problems
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    logging::init(config.logging.as_ref(), cli.verbose);

    match cli.command {
        Commands::Console { dry_run, metrics } => {
            let handle = if metrics {
                Some(install_prometheus_recorder().context("installing metrics recorder")?)
            } else {
                None
            };
            let store: Arc<dyn OrderStore> = if dry_run {
                Arc::new(MemoryOrderStore::new())
            } else {
                Arc::new(JsonOrderStore::new(config.orders_dir()))
            };
            run_console(Arc::new(config), store).await?;
            if let Some(handle) = handle {
                println!("{}", handle.render());
            }
        }
        Commands::Tools => {
            let tools = ToolRegistry::with_order_tools();
            println!("{}", serde_json::to_string_pretty(&tools.to_llm_tools())?);
        }
        Commands::Prompt => {
            let tools = ToolRegistry::with_order_tools();
            println!("{}", build_instructions(&config, &tools));
        }
        Commands::Orders { action } => {
            let store = JsonOrderStore::new(config.orders_dir());
            match action {
                OrdersAction::List => {
                    let orders = store.list().await?;
                    if orders.is_empty() {
                        println!("No orders in {}", store.dir().display());
                    }
                    for stored in &orders {
                        println!("{}", describe(stored));
                    }
                }
                OrdersAction::Show { order } => {
                    let path = resolve_order_path(store.dir(), &order);
                    let record = JsonOrderStore::load(&path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?;
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let json = serde_json::to_string_pretty(&config)?;
                println!("{json}");
            }
            ConfigAction::Get { key } => match config.get_path(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => anyhow::bail!("No config value at '{key}'"),
            },
            ConfigAction::Validate => {
                let (warnings, errors) = config.validate();
                for w in &warnings {
                    println!("warning: {w}");
                }
                for e in &errors {
                    println!("error: {e}");
                }
                if !errors.is_empty() {
                    anyhow::bail!("{} config error(s)", errors.len());
                }
                println!("Config OK");
            }
        },
        Commands::Status => {
            let pipeline = config.pipeline();
            println!("Barista v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!("Orders: {}", config.orders_dir().display());
            println!("STT: {} ({})", pipeline.stt.provider, pipeline.stt.model);
            println!("LLM: {} ({})", pipeline.llm.provider, pipeline.llm.model);
            println!(
                "TTS: {} (voice {}, style {}, min sentence {}, pacing {})",
                pipeline.tts.provider,
                pipeline.tts.voice,
                pipeline.tts.style,
                pipeline.tts.min_sentence_len,
                if pipeline.tts.text_pacing { "on" } else { "off" }
            );
            println!(
                "Turns: {} turn detection, {} VAD, noise cancellation {:?}, preemptive generation {}",
                pipeline.turn_detection,
                pipeline.vad,
                pipeline.noise_cancellation,
                if pipeline.preemptive_generation { "on" } else { "off" }
            );
        }
    }

    Ok(())
}

async fn run_console(config: Arc<Config>, store: Arc<dyn OrderStore>) -> anyhow::Result<()> {
    let tools = Arc::new(ToolRegistry::with_order_tools());
    let mut session = BaristaSession::new(config, tools, store);

    println!("{HELP}\n");
    println!("barista> {}", session.greeting());

    loop {
        let line = tokio::task::spawn_blocking(|| {
            dialoguer::Input::<String>::new()
                .with_prompt("you")
                .allow_empty(true)
                .interact_text()
        })
        .await??;

        match parse_line(&line) {
            Ok(ConsoleCommand::Empty) => {}
            Ok(ConsoleCommand::Help) => println!("{HELP}"),
            Ok(ConsoleCommand::Status) => println!("{}", session.status().await),
            Ok(ConsoleCommand::Order) => {
                println!("{}", serde_json::to_string_pretty(&session.order().await)?)
            }
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Call { tool, params }) => {
                let output = session.handle_tool_call(&tool, params).await;
                if output.is_error {
                    println!("barista (error)> {}", output.content);
                } else {
                    println!("barista> {}", output.content);
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    let usage = session.shutdown();
    println!(
        "Orders completed: {}, tool calls: {}",
        usage.orders_completed, usage.tool_calls
    );
    Ok(())
}

/// One-line description of a saved order.
fn describe(stored: &StoredOrder) -> String {
    let order = &stored.order;
    format!(
        "{}  {} {} with {} milk, {}",
        stored.id,
        order.size,
        order.drink_type,
        order.milk,
        order.extras_phrase()
    )
}

/// Accept an existing path, a bare order id, or an id with `.json`.
fn resolve_order_path(dir: &Path, order: &str) -> PathBuf {
    let as_path = PathBuf::from(order);
    if as_path.exists() {
        return as_path;
    }
    let file = if order.ends_with(".json") {
        order.to_string()
    } else {
        format!("{order}.json")
    };
    dir.join(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use barista_core::OrderRecord;

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["barista", "console", "--dry-run"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Console {
                dry_run: true,
                metrics: false
            }
        ));

        let cli = Cli::try_parse_from(["barista", "console", "--metrics"]).unwrap();
        assert!(matches!(cli.command, Commands::Console { metrics: true, .. }));

        let cli = Cli::try_parse_from(["barista", "-v", "orders", "show", "order_x"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Orders {
                action: OrdersAction::Show { .. }
            }
        ));
    }

    #[test]
    fn test_resolve_order_path() {
        let dir = Path::new("/srv/orders");
        assert_eq!(
            resolve_order_path(dir, "order_20250101_090000_Sam"),
            PathBuf::from("/srv/orders/order_20250101_090000_Sam.json")
        );
        assert_eq!(
            resolve_order_path(dir, "order_20250101_090000_Sam.json"),
            PathBuf::from("/srv/orders/order_20250101_090000_Sam.json")
        );
    }

    #[test]
    fn test_describe() {
        let stored = StoredOrder {
            id: "order_20250101_090000_Sam".into(),
            path: None,
            order: OrderRecord {
                drink_type: "latte".into(),
                size: "medium".into(),
                milk: "oat".into(),
                extras: vec!["caramel".into()],
                name: "Sam".into(),
            },
        };
        assert_eq!(
            describe(&stored),
            "order_20250101_090000_Sam  medium latte with oat milk, caramel"
        );
    }
}
