use clap::{Parser, Subcommand};
use motif_core::{config::AppConfig, metrics::install_prometheus_recorder, BridgeRuntime};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
use commands::{
    handle_config_command, handle_query_command, utils::CliError, ConfigCommands, QueryCommands,
};

#[derive(Parser)]
#[command(name = "motif-cli")]
#[command(about = "Motif CLI - Query an Opera node through the cached bridge repository")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (defaults to $MOTIF_CONFIG or config/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Print cache statistics to stderr after the query
    #[arg(long, global = true)]
    stats: bool,

    /// Install the Prometheus recorder and print the exposition after the query
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Query(QueryCommands),

    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Initializes the logging system based on the configuration.
///
/// Logs go to stderr so that query results on stdout stay machine-readable.
fn init_logging(config: &AppConfig) {
    let filter = if let Ok(env_filter) = std::env::var("RUST_LOG") {
        if env_filter == "debug" {
            EnvFilter::new("warn,motif_core=debug,motif_cli=debug")
        } else if env_filter == "trace" {
            EnvFilter::new("warn,motif_core=trace,motif_cli=trace")
        } else {
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("warn,motif_core=debug,motif_cli=debug"))
        }
    } else {
        EnvFilter::new(format!(
            "warn,motif_core={level},motif_cli={level}",
            level = config.logging.level
        ))
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

fn load_config(path: Option<&str>) -> Result<AppConfig, CliError> {
    match path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
    .map_err(|e| CliError::Config(e.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let query = match cli.command {
        Commands::Config(config_command) => {
            handle_config_command(config_command)?;
            return Ok(());
        }
        Commands::Query(query) => query,
    };

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    let prometheus = cli.metrics.then(install_prometheus_recorder);

    let runtime = BridgeRuntime::builder().with_config(config).build().map_err(CliError::from)?;
    debug!(node_url = %runtime.config().node.url, "Runtime ready");

    let result = handle_query_command(query, &runtime.repository()).await;

    if cli.stats {
        let stats = runtime.cache_stats();
        info!(hit_rate = stats.hit_rate(), "Cache statistics");
        eprintln!("{}", serde_json::to_string_pretty(&stats)?);
    }

    if let Some(handle) = prometheus {
        print!("{}", handle.render());
    }

    runtime.shutdown().await;

    result?;
    Ok(())
}
