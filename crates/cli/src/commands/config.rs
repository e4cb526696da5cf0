use clap::Subcommand;
use motif_core::config::AppConfig;
use std::path::Path;

use super::utils::{print_error, print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to config file
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Show the effective configuration (defaults, file and MOTIF__* overrides)
    Show {
        /// Path to config file
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output path for the config file
        #[arg(short, long, default_value = "config/config.toml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Validate { file } => validate_config(&file),
        ConfigCommands::Show { file } => show_config(&file),
        ConfigCommands::Generate { output, force } => generate_config(&output, force),
    }
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        print_error(&format!("Configuration file not found: {file}"));
        return Err(CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    print_info("Validating configuration...");
    config.validate().map_err(CliError::Config)?;

    print_success("Configuration is valid!");

    eprintln!("Configuration Summary:");
    eprintln!("  Node: {} (namespace {})", config.node.url, config.node.method_namespace);
    eprintln!(
        "  Cache: ttl {}s, budget {} MiB, sweep {}",
        config.cache.ttl_seconds,
        config.cache.max_size_mb,
        if config.cache.sweep_interval_seconds == 0 {
            "disabled".to_string()
        } else {
            format!("every {}s", config.cache.sweep_interval_seconds)
        }
    );
    eprintln!("  fMint contract: {}", config.defi.fmint_contract);
    eprintln!("  Token logos: {} configured", config.tokens.logos.len());

    Ok(())
}

fn show_config(file: &str) -> CliResult<()> {
    let config = AppConfig::from_file(file).map_err(|e| CliError::Config(e.to_string()))?;

    println!("Configuration from {file}:");

    println!("\n[Node]");
    println!("  URL: {}", config.node.url);
    println!("  Timeout: {}s", config.node.timeout_seconds);
    println!("  Concurrent Limit: {}", config.node.concurrent_limit);
    println!("  Method Namespace: {}", config.node.method_namespace);

    println!("\n[Cache]");
    println!("  TTL: {}s", config.cache.ttl_seconds);
    println!("  Max Size: {} MiB", config.cache.max_size_mb);
    println!("  Sweep Interval: {}s", config.cache.sweep_interval_seconds);

    println!("\n[DeFi]");
    println!("  fMint Contract: {}", config.defi.fmint_contract);
    println!("  Address Provider: {}", config.defi.fmint_address_provider);
    println!("  Token Registry: {}", config.defi.fmint_token_registry);
    println!("  Reward Distribution: {}", config.defi.fmint_reward_distribution);
    println!("  Collateral Pool: {}", config.defi.fmint_collateral_pool);
    println!("  Debt Pool: {}", config.defi.fmint_debt_pool);
    println!("  Price Oracle: {}", config.defi.price_oracle_aggregate);

    println!("\n[Tokens]");
    println!("  Default Logo: {}", config.tokens.default_logo);
    let mut logos: Vec<_> = config.tokens.logos.iter().collect();
    logos.sort();
    for (token, logo) in logos {
        println!("  {token}: {logo}");
    }

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# Motif bridge configuration
# Every value below is optional; omitted keys fall back to compiled defaults.
# Any key can be overridden from the environment, e.g. MOTIF__NODE__URL.

[node]
url = "http://127.0.0.1:18545"
timeout_seconds = 30
concurrent_limit = 1000
method_namespace = "ftm"

[cache]
ttl_seconds = 900
max_size_mb = 4096
# 0 disables the background expiry sweeper; expired entries are still dropped on read
sweep_interval_seconds = 60

[defi]
fmint_contract = "0x4acb55fe5f0b7c487edec3862079aa36ab054358"
fmint_address_provider = "0xdeec401e448d5d9132eb79ac84eb3f212d7759fb"
fmint_token_registry = "0x60092e344c63c6628ec77926e508f9a9c80553ef"
fmint_reward_distribution = "0x0039597eb5aa5760e8db15fbe525e56aa661ef26"
fmint_collateral_pool = "0x6d5f2f2e391f47a1075df4d39a24286c63c0e70c"
fmint_debt_pool = "0xe2d1105f35649bf16deebccec1f2100dcb9aadf5"
price_oracle_aggregate = "0xa1ea42f737bb2e09b0ae4de001ee06e3bc484fe5"

[tokens]
default_logo = "https://i.ibb.co/RNLvGqm/symbol.png"

[tokens.logos]
# "0x<token address>" = "https://example.org/logo.png"

[logging]
level = "info"
format = "pretty"
"#;

fn generate_config(output: &str, force: bool) -> CliResult<()> {
    if Path::new(output).exists() && !force {
        return Err(CliError::Config(format!(
            "File {output} already exists. Use --force to overwrite."
        )));
    }

    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(output, SAMPLE_CONFIG)?;
    print_success(&format!("Sample configuration written to {output}"));
    print_info("Review the [defi] addresses before pointing the bridge at a live node.");

    Ok(())
}
