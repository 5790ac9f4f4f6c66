//! # Cluster Configuration Validator
//!
//! Command-line tool for validating a cluster registry configuration file before
//! an application loads it. Optionally connects to each cluster and pings it.

use clap::{Parser, Subcommand};
use redis_cluster_registry::{
    ClusterContainer, RedisCluster, RedisClusterModule, RegistryConfig,
};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "cluster-config-validator")]
#[command(about = "Validate Redis cluster registry configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, default_value = "config/clusters.toml")]
    config: PathBuf,

    /// Apply REDIS_CLUSTER__* environment overrides
    #[arg(long)]
    with_env: bool,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate tokens and options (default)
    Check,

    /// Validate, then connect to every cluster, ping it and close it
    Ping,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let env_prefix = cli
        .with_env
        .then_some(redis_cluster_registry::constants::CONFIG_ENV_PREFIX);

    let config = match RegistryConfig::load_from_file_with_env(&cli.config, env_prefix) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ {e}");
            process::exit(1);
        }
    };

    print_summary(&config, &cli.format);

    if let Some(Commands::Ping) = cli.command {
        if let Err(e) = ping_all(config).await {
            eprintln!("❌ {e}");
            process::exit(2);
        }
    }
}

fn print_summary(config: &RegistryConfig, format: &str) {
    match format {
        "json" => match serde_json::to_string_pretty(&redacted(config)) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("❌ failed to render JSON: {e}"),
        },
        _ => {
            println!("{:<24} {:<6} {:<9} NODES", "TOKEN", "TLS", "REPLICAS");
            for entry in &config.clusters {
                println!(
                    "{:<24} {:<6} {:<9} {}",
                    entry.token,
                    format!("{:?}", entry.options.tls).to_lowercase(),
                    entry.options.read_from_replicas,
                    entry.options.nodes.join(",")
                );
            }
            println!("✅ {} cluster(s) valid", config.clusters.len());
        }
    }
}

fn redacted(config: &RegistryConfig) -> RegistryConfig {
    let mut copy = config.clone();
    for entry in copy.clusters.iter_mut() {
        if entry.options.password.is_some() {
            entry.options.password = Some("***".to_string());
        }
    }
    copy
}

async fn ping_all(config: RegistryConfig) -> anyhow::Result<()> {
    let container = ClusterContainer::redis();
    let mut tokens = Vec::new();

    for module in config.into_modules::<RedisCluster>() {
        tokens.push(module.cluster_token.clone());
        container.install(RedisClusterModule::register(module)?)?;
    }

    let mut failures = 0usize;
    for token in &tokens {
        match container.resolve(token).await {
            Ok(cluster) => match cluster.ping().await {
                Ok(true) => {
                    info!(token = %token, "PING ok");
                    println!("✅ {token}: PONG");
                }
                Ok(false) => {
                    failures += 1;
                    println!("❌ {token}: unexpected PING reply");
                }
                Err(e) => {
                    failures += 1;
                    println!("❌ {token}: {e}");
                }
            },
            Err(e) => {
                failures += 1;
                println!("❌ {token}: {e}");
            }
        }
    }

    container.shutdown().await?;

    if failures > 0 {
        anyhow::bail!("{failures} cluster(s) failed the ping check");
    }
    Ok(())
}
